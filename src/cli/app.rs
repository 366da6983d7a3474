//! Main CLI application

use crate::cli::output::{format_task, format_task_line};
use crate::error::ConfigError;
use crate::logging::{self, Verbosity};
use crate::resolver::{ConsoleReceiver, PresetReceiver, ResolverRegistry, ValueReceiver};
use crate::settings::{
    setting_values, InMemorySettings, ProjectSettingRepository, SettingRepository,
    PROJECT_SETTINGS_FILE,
};
use crate::task::{render, render_strict, LifecycleEvent, Task, TaskRepository};
use anyhow::{anyhow, bail, Result};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use clap_complete::Shell;
use directories::ProjectDirs;
use indexmap::IndexMap;
use serde_yaml::Value;
use std::io;
use std::path::PathBuf;
use tracing::{debug, info};

/// Settings repository used by the command line
type CliSettings = ProjectSettingRepository<InMemorySettings>;

/// Build the clap command
pub fn build_command() -> Command {
    Command::new("rsdk")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Assemble, inspect and resolve declarative YAML tasks")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("settings")
                .long("settings")
                .value_name("FILE")
                .value_parser(value_parser!(PathBuf))
                .help("Core settings file (defaults to the user config directory)")
                .global(true),
        )
        .arg(
            Arg::new("project-settings")
                .long("project-settings")
                .value_name("FILE")
                .value_parser(value_parser!(PathBuf))
                .help("Project settings file")
                .default_value(PROJECT_SETTINGS_FILE)
                .global(true),
        )
        .arg(
            Arg::new("quiet")
                .short('q')
                .long("quiet")
                .help("Only print warnings and errors")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .arg(
            Arg::new("silent")
                .short('s')
                .long("silent")
                .help("Only print errors")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Print debug output")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .subcommand(
            Command::new("list")
                .about("List every assembled task")
                .arg(tag_arg()),
        )
        .subcommand(
            Command::new("show")
                .about("Show a task with its lifecycle and sub-tasks")
                .arg(id_arg())
                .arg(tag_arg()),
        )
        .subcommand(
            Command::new("resolve")
                .about("Resolve placeholders and print the rendered commands")
                .arg(id_arg())
                .arg(tag_arg())
                .arg(
                    Arg::new("set")
                        .long("set")
                        .value_name("NAME=VALUE")
                        .help("Supply a placeholder value")
                        .value_parser(parse_assignment)
                        .action(ArgAction::Append),
                )
                .arg(
                    Arg::new("event")
                        .long("event")
                        .value_name("EVENT")
                        .help("Resolve a lifecycle event (initialized, updated, removed)")
                        .value_parser(parse_event),
                )
                .arg(
                    Arg::new("defaults")
                        .long("defaults")
                        .help("Accept defaults instead of prompting")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("strict")
                        .long("strict")
                        .help("Fail on placeholders left in the rendered commands")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("set")
                .about("Save a project setting")
                .arg(Arg::new("path").value_name("PATH").required(true))
                .arg(Arg::new("value").value_name("VALUE").required(true)),
        )
        .subcommand(
            Command::new("completions")
                .about("Generate shell completions")
                .arg(
                    Arg::new("shell")
                        .value_name("SHELL")
                        .required(true)
                        .value_parser(value_parser!(Shell)),
                ),
        )
}

fn id_arg() -> Arg {
    Arg::new("id").value_name("ID").help("Task id").required(true)
}

fn tag_arg() -> Arg {
    Arg::new("tag")
        .short('t')
        .long("tag")
        .value_name("TAG")
        .help("Only keep task set members sharing a tag")
        .action(ArgAction::Append)
}

/// Run the CLI application with the process arguments
pub fn run() -> Result<()> {
    dotenvy::dotenv().ok();

    let mut command = build_command();
    let matches = command.clone().get_matches();
    logging::init(get_verbosity(&matches));

    match matches.subcommand() {
        Some(("list", sub)) => list(&matches, sub),
        Some(("show", sub)) => show(&matches, sub),
        Some(("resolve", sub)) => resolve(&matches, sub),
        Some(("set", sub)) => set(&matches, sub),
        Some(("completions", sub)) => {
            completions(&mut command, sub);
            Ok(())
        }
        _ => {
            command.print_help()?;
            println!();
            Ok(())
        }
    }
}

fn list(global: &ArgMatches, matches: &ArgMatches) -> Result<()> {
    let settings = open_settings(global)?;
    let tags = get_tags(matches);
    let graph = TaskRepository::new(&settings).find_all(&tags)?;

    if graph.is_empty() {
        info!("no tasks found");
        return Ok(());
    }

    // the graph itself is never filtered; tags only prune set members
    for task in graph.values() {
        println!("{}", format_task_line(task));
    }

    Ok(())
}

fn show(global: &ArgMatches, matches: &ArgMatches) -> Result<()> {
    let settings = open_settings(global)?;
    let tags = get_tags(matches);
    let task = find_task(&settings, matches, &tags)?;

    print!("{}", format_task(&task, &tags));
    Ok(())
}

fn resolve(global: &ArgMatches, matches: &ArgMatches) -> Result<()> {
    let settings = open_settings(global)?;
    let tags = get_tags(matches);
    let task = find_task(&settings, matches, &tags)?;

    let (commands, placeholders) = match matches.get_one::<LifecycleEvent>("event") {
        Some(event) => {
            let data = task.lifecycle().event(*event);
            (data.commands.clone(), data.placeholders.clone())
        }
        None => (task.commands().to_vec(), task.placeholders().clone()),
    };

    let supplied: IndexMap<String, Value> = matches
        .get_many::<(String, String)>("set")
        .into_iter()
        .flatten()
        .map(|(name, value)| (name.clone(), parse_value(value)))
        .collect();

    let mut receiver: Box<dyn ValueReceiver> = if matches.get_flag("defaults") {
        let mut preset = PresetReceiver::new();
        for (name, value) in supplied {
            preset = preset.with_value(name, value);
        }
        Box::new(preset)
    } else {
        Box::new(ConsoleReceiver::new(io::stdin().lock(), io::stderr()).with_values(supplied))
    };

    let values = ResolverRegistry::default().resolve_all(
        &placeholders,
        &setting_values(&settings),
        receiver.as_mut(),
    )?;
    info!(task = task.id(), placeholders = values.len(), "resolved placeholders");

    for command in &commands {
        let line = if matches.get_flag("strict") {
            render_strict(command.command(), &values)?
        } else {
            render(command.command(), &values)
        };
        println!("{}", line);
    }

    Ok(())
}

fn set(global: &ArgMatches, matches: &ArgMatches) -> Result<()> {
    let settings = open_settings(global)?;
    let path = required_arg(matches, "path")?;
    let value = required_arg(matches, "value")?;

    let mut setting = settings
        .find_one_by_path(path)
        .ok_or_else(|| anyhow!("setting '{}' is not defined", path))?;
    if !setting.is_project {
        bail!("setting '{}' is not a project setting", path);
    }

    setting.values = parse_value(value);
    settings.save(setting)?;
    info!(setting = path, file = %settings.project_file().display(), "saved project setting");

    Ok(())
}

fn completions(command: &mut Command, matches: &ArgMatches) {
    if let Some(shell) = matches.get_one::<Shell>("shell") {
        let name = command.get_name().to_string();
        clap_complete::generate(*shell, command, name, &mut io::stdout());
    }
}

/// Open core settings and layer the project file over them
///
/// An explicit `--settings` file must exist; the default one is optional.
fn open_settings(matches: &ArgMatches) -> Result<CliSettings> {
    let core = match matches.get_one::<PathBuf>("settings") {
        Some(path) => InMemorySettings::load(path)?,
        None => match default_settings_file() {
            Some(path) if path.is_file() => InMemorySettings::load(&path)?,
            Some(path) => {
                debug!(file = %path.display(), "no settings file");
                InMemorySettings::new()
            }
            None => InMemorySettings::new(),
        },
    };

    let project_file = matches
        .get_one::<PathBuf>("project-settings")
        .cloned()
        .unwrap_or_else(|| PathBuf::from(PROJECT_SETTINGS_FILE));

    Ok(ProjectSettingRepository::new(core, project_file))
}

/// `settings.yml` in the per-user config directory
fn default_settings_file() -> Option<PathBuf> {
    ProjectDirs::from("", "", "rsdk").map(|dirs| dirs.config_dir().join("settings.yml"))
}

fn find_task(settings: &CliSettings, matches: &ArgMatches, tags: &[String]) -> Result<Task> {
    let id = required_arg(matches, "id")?;
    TaskRepository::new(settings)
        .find_by_id(id, tags)?
        .ok_or_else(|| ConfigError::TaskNotFound(id.to_string()).into())
}

fn required_arg<'a>(matches: &'a ArgMatches, name: &str) -> Result<&'a str> {
    matches
        .get_one::<String>(name)
        .map(String::as_str)
        .ok_or_else(|| anyhow!("missing argument '{}'", name))
}

fn get_tags(matches: &ArgMatches) -> Vec<String> {
    matches
        .get_many::<String>("tag")
        .map(|tags| tags.cloned().collect())
        .unwrap_or_default()
}

/// Get verbosity level from matches
fn get_verbosity(matches: &ArgMatches) -> Verbosity {
    if matches.get_flag("silent") {
        Verbosity::Silent
    } else if matches.get_flag("quiet") {
        Verbosity::Quiet
    } else if matches.get_flag("verbose") {
        Verbosity::Verbose
    } else {
        Verbosity::Normal
    }
}

/// Split a `NAME=VALUE` option
fn parse_assignment(s: &str) -> std::result::Result<(String, String), String> {
    match s.split_once('=') {
        Some((name, value)) if !name.trim().is_empty() => {
            Ok((name.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected NAME=VALUE, got '{}'", s)),
    }
}

fn parse_event(s: &str) -> std::result::Result<LifecycleEvent, String> {
    LifecycleEvent::parse(s).ok_or_else(|| format!("unknown lifecycle event '{}'", s))
}

/// Read a command line value as YAML, falling back to a plain string
fn parse_value(raw: &str) -> Value {
    match serde_yaml::from_str::<Value>(raw) {
        Ok(value @ (Value::Bool(_) | Value::Number(_) | Value::Null | Value::Sequence(_)))
            if !raw.trim().is_empty() =>
        {
            value
        }
        _ => Value::String(raw.to_string()),
    }
}
