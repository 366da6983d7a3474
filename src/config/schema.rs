//! Record validation
//!
//! This module checks a deserialized task record for the fields the
//! assembler relies on, so a broken record fails with its id and the
//! offending key instead of producing a half-built task.

use crate::config::types::{EventRecord, PlaceholderRecord, TaskRecord};
use crate::error::{ConfigError, ConfigResult};
use std::collections::HashSet;

/// Validate a single task record
pub fn validate_record(record: &TaskRecord) -> ConfigResult<()> {
    if record.id.trim().is_empty() {
        return Err(ConfigError::MissingField {
            record: "<unknown>".to_string(),
            field: "id",
        });
    }

    if record.kind.trim().is_empty() {
        return Err(missing(record, "type"));
    }

    if is_blank(&record.short_description) {
        return Err(missing(record, "short_description"));
    }

    if is_blank(&record.version) {
        return Err(missing(record, "version"));
    }

    if record.is_local_cli() && is_blank(&record.command) {
        return Err(missing(record, "command"));
    }

    validate_placeholders(record, &record.placeholders)?;

    for event in [
        &record.lifecycle.initialized,
        &record.lifecycle.updated,
        &record.lifecycle.removed,
    ]
    .into_iter()
    .flatten()
    {
        validate_event(record, event)?;
    }

    for member in &record.tasks {
        if member.id.trim().is_empty() {
            return Err(ConfigError::InvalidField {
                record: record.id.clone(),
                field: "tasks",
                error: "member id must not be empty".to_string(),
            });
        }
    }

    Ok(())
}

/// Validate one lifecycle block
fn validate_event(record: &TaskRecord, event: &EventRecord) -> ConfigResult<()> {
    validate_placeholders(record, &event.placeholders)?;

    for file in &event.files {
        if file.path.trim().is_empty() {
            return Err(ConfigError::InvalidField {
                record: record.id.clone(),
                field: "files",
                error: "file path must not be empty".to_string(),
            });
        }
    }

    Ok(())
}

/// Placeholder names must be present and unique within one list
fn validate_placeholders(record: &TaskRecord, placeholders: &[PlaceholderRecord]) -> ConfigResult<()> {
    let mut seen = HashSet::new();

    for placeholder in placeholders {
        if placeholder.name.trim().is_empty() {
            return Err(ConfigError::InvalidField {
                record: record.id.clone(),
                field: "placeholders",
                error: "placeholder name must not be empty".to_string(),
            });
        }

        if placeholder.value_resolver.trim().is_empty() {
            return Err(ConfigError::InvalidField {
                record: record.id.clone(),
                field: "placeholders",
                error: format!("placeholder '{}' has no value_resolver", placeholder.name),
            });
        }

        if !seen.insert(placeholder.name.as_str()) {
            return Err(ConfigError::InvalidField {
                record: record.id.clone(),
                field: "placeholders",
                error: format!("placeholder '{}' is declared more than once", placeholder.name),
            });
        }
    }

    Ok(())
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().map_or(true, |v| v.trim().is_empty())
}

fn missing(record: &TaskRecord, field: &'static str) -> ConfigError {
    ConfigError::MissingField {
        record: record.id.clone(),
        field,
    }
}
