//! Placeholder substitution for command lines
//!
//! Placeholder names carry their own delimiters (`%project_dir%`), so a
//! resolved value replaces every literal occurrence of the name.

use crate::error::{ResolveError, ResolveResult};
use crate::resolver::ResolvedValues;
use crate::task::model::Command;
use regex::Regex;
use serde_yaml::Value;
use std::sync::OnceLock;

fn leftover_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"%[A-Za-z0-9_.\-]+%").ok())
        .as_ref()
}

/// Render a value the way it is inserted into a command line
///
/// Missing values and nulls render as an empty string; sequences are joined
/// with commas.
pub fn value_to_string(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Bool(b)) => b.to_string(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Sequence(items)) => items
            .iter()
            .map(|item| value_to_string(Some(item)))
            .collect::<Vec<_>>()
            .join(","),
        Some(other) => serde_yaml::to_string(other)
            .map(|s| s.trim_end().to_string())
            .unwrap_or_default(),
    }
}

/// Substitute resolved values into a template
///
/// Unknown `%tokens%` are left as-is.
pub fn render(template: &str, values: &ResolvedValues) -> String {
    let mut result = template.to_string();

    // Longest names first so `%dir%` never eats into `%dir_name%`.
    let mut names: Vec<&String> = values.keys().collect();
    names.sort_by_key(|name| std::cmp::Reverse(name.len()));

    for name in names {
        if result.contains(name.as_str()) {
            let value = value_to_string(values.get(name).and_then(Option::as_ref));
            result = result.replace(name.as_str(), &value);
        }
    }

    result
}

/// Substitute resolved values, failing on any leftover `%token%`
pub fn render_strict(template: &str, values: &ResolvedValues) -> ResolveResult<String> {
    let result = render(template, values);

    if let Some(token) = leftover_pattern().and_then(|pattern| pattern.find(&result)) {
        return Err(ResolveError::MissingValue(token.as_str().to_string()));
    }

    Ok(result)
}

/// Render a list of commands
pub fn render_commands(commands: &[Command], values: &ResolvedValues) -> Vec<String> {
    commands
        .iter()
        .map(|command| render(command.command(), values))
        .collect()
}
