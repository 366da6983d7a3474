//! Task record discovery and parsing

use crate::config::schema::validate_record;
use crate::config::types::TaskRecord;
use crate::error::{ConfigError, ConfigResult, SdkError};
use serde_yaml::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Task files are searched at `<extension dir>/<extension>/Tasks/<file>.yaml`
const TASK_FILE_PATTERN: &str = "*/Tasks/*.yaml";

/// Find every task file below the given extension directories
///
/// Files are returned sorted per directory so repeated discovery yields the
/// same record order.
pub fn find_task_files(extension_dirs: &[PathBuf]) -> ConfigResult<Vec<PathBuf>> {
    let mut files = Vec::new();

    for dir in extension_dirs {
        let pattern = dir.join(TASK_FILE_PATTERN);
        let pattern = pattern.to_string_lossy();

        let paths = glob::glob(&pattern).map_err(|e| {
            ConfigError::MissingSetting(format!("extension_dirs ({}): {}", dir.display(), e))
        })?;

        let mut found = Vec::new();
        for entry in paths {
            let path = entry.map_err(|e| ConfigError::ReadFile {
                path: e.path().to_path_buf(),
                error: e.error().to_string(),
            })?;
            if path.is_file() {
                found.push(path);
            }
        }
        found.sort();

        debug!(dir = %dir.display(), count = found.len(), "discovered task files");
        files.extend(found);
    }

    Ok(files)
}

/// Parse a task record from a file
pub fn parse_record_file(path: &Path) -> Result<TaskRecord, SdkError> {
    let contents = fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
        path: path.to_path_buf(),
        error: e.to_string(),
    })?;

    parse_record_str(&contents)
}

/// Parse a task record from a YAML string
pub fn parse_record_str(yaml: &str) -> Result<TaskRecord, SdkError> {
    let value: Value = serde_yaml::from_str(yaml)?;
    Ok(parse_record(value)?)
}

/// Turn an already-parsed mapping into a validated task record
///
/// The id is read first so every later failure names the record it came from.
pub fn parse_record(value: Value) -> ConfigResult<TaskRecord> {
    let id = match value.get("id") {
        Some(Value::String(id)) if !id.trim().is_empty() => id.clone(),
        _ => {
            return Err(ConfigError::MissingField {
                record: "<unknown>".to_string(),
                field: "id",
            })
        }
    };

    if value.get("type").is_none() {
        return Err(ConfigError::MissingField { record: id, field: "type" });
    }

    let record: TaskRecord = serde_yaml::from_value(value).map_err(|e| ConfigError::InvalidRecord {
        record: id,
        error: e.to_string(),
    })?;

    validate_record(&record)?;

    Ok(record)
}

/// Load and validate every record from a list of task files
pub fn load_records(files: &[PathBuf]) -> Result<Vec<TaskRecord>, SdkError> {
    files.iter().map(|path| parse_record_file(path)).collect()
}

/// Discover and load every record below the given extension directories
pub fn load_records_from_dirs(extension_dirs: &[PathBuf]) -> Result<Vec<TaskRecord>, SdkError> {
    let files = find_task_files(extension_dirs)?;
    load_records(&files)
}
