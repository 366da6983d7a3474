//! Terminal formatting of tasks

use crate::task::{group_by_stage, Command, Placeholders, Task};
use colored::Colorize;
use std::fmt::Write;

/// One-line summary used by `list`
pub fn format_task_line(task: &Task) -> String {
    let mut line = format!(
        "{} {} {}",
        format!("{:<32}", task.id()).bold(),
        format!("{:<12}", task.stage()).cyan(),
        task.short_description()
    );

    if !task.tags().is_empty() {
        let _ = write!(line, " [{}]", task.tags().join(", "));
    }
    if task.is_task_set() {
        let _ = write!(line, " {}", "(set)".dimmed());
    }
    if task.is_deprecated() {
        let _ = write!(line, " {}", "deprecated".yellow());
    }

    line
}

/// Full description used by `show`
///
/// Members are listed per stage and filtered by `tags`.
pub fn format_task(task: &Task, tags: &[String]) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "{} {}", task.id().bold(), task.version().dimmed());
    let _ = writeln!(out, "  {}", task.short_description());
    let _ = writeln!(out, "  stage: {}", task.stage());

    if !task.tags().is_empty() {
        let _ = writeln!(out, "  tags: {}", task.tags().join(", "));
    }
    if task.is_optional() {
        let _ = writeln!(out, "  optional");
    }
    if task.is_deprecated() {
        match task.successor() {
            Some(successor) => {
                let _ = writeln!(out, "  {} use {} instead", "deprecated:".yellow(), successor);
            }
            None => {
                let _ = writeln!(out, "  {}", "deprecated".yellow());
            }
        }
    }
    if let Some(help) = task.help() {
        let _ = writeln!(out, "  help: {}", help);
    }

    write_commands(&mut out, "commands", task.commands(), "  ");
    write_placeholders(&mut out, task.placeholders(), "  ");

    for (event, data) in task.lifecycle().events() {
        if data.is_empty() {
            continue;
        }
        let _ = writeln!(out, "  {}:", event.to_string().green());
        write_commands(&mut out, "commands", &data.commands, "    ");
        write_placeholders(&mut out, &data.placeholders, "    ");
        if !data.files.is_empty() {
            let _ = writeln!(out, "    files:");
            for file in &data.files {
                let _ = writeln!(out, "      - {}", file.path);
            }
        }
    }

    if task.is_task_set() {
        let _ = writeln!(out, "  stages:");
        for (stage, members) in group_by_stage(task.get_sub_tasks(tags), task.stages()) {
            let _ = writeln!(out, "    {}:", stage.cyan());
            for member in members {
                let _ = writeln!(out, "      - {} {}", member.id(), member.short_description());
            }
        }
    }

    out
}

fn write_commands(out: &mut String, title: &str, commands: &[Command], indent: &str) {
    if commands.is_empty() {
        return;
    }

    let _ = writeln!(out, "{}{}:", indent, title);
    for command in commands {
        let marker = if command.has_stop_on_error() {
            " (stop on error)"
        } else {
            ""
        };
        let _ = writeln!(out, "{}  $ {}{}", indent, command.command(), marker);
    }
}

fn write_placeholders(out: &mut String, placeholders: &Placeholders, indent: &str) {
    if placeholders.is_empty() {
        return;
    }

    let _ = writeln!(out, "{}placeholders:", indent);
    for placeholder in placeholders.values() {
        let optional = if placeholder.is_optional() {
            ", optional"
        } else {
            ""
        };
        let _ = writeln!(
            out,
            "{}  {} ({}{})",
            indent,
            placeholder.name(),
            placeholder.value_resolver(),
            optional
        );
    }
}
