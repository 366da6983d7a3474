//! Settings-driven task lookup
//!
//! Reads the configured extension directories, loads every task record below
//! them and assembles a fresh graph on each query.

use crate::config::load_records_from_dirs;
use crate::error::{ConfigError, ConfigResult, Result};
use crate::settings::SettingRepository;
use crate::task::assemble::{assemble, TaskGraph};
use crate::task::model::Task;
use serde_yaml::Value;
use std::path::PathBuf;

/// Setting listing the directories searched for task files
pub const EXTENSION_DIRS_SETTING: &str = "extension_dirs";

/// Task lookup backed by YAML files and natively defined tasks
pub struct TaskRepository<'a, S: SettingRepository + ?Sized> {
    settings: &'a S,
    external_tasks: Vec<Task>,
}

impl<'a, S: SettingRepository + ?Sized> TaskRepository<'a, S> {
    pub fn new(settings: &'a S) -> Self {
        TaskRepository {
            settings,
            external_tasks: Vec::new(),
        }
    }

    /// Add natively defined tasks; they win over configured tasks with the same id
    pub fn with_external_tasks(mut self, tasks: Vec<Task>) -> Self {
        self.external_tasks.extend(tasks);
        self
    }

    /// Directories to search, from the `extension_dirs` setting
    pub fn extension_dirs(&self) -> ConfigResult<Vec<PathBuf>> {
        let setting = self
            .settings
            .find_one_by_path(EXTENSION_DIRS_SETTING)
            .ok_or_else(|| ConfigError::MissingSetting(EXTENSION_DIRS_SETTING.to_string()))?;

        let Value::Sequence(dirs) = setting.values else {
            return Err(ConfigError::MissingSetting(EXTENSION_DIRS_SETTING.to_string()));
        };

        dirs.iter()
            .map(|dir| {
                dir.as_str()
                    .map(PathBuf::from)
                    .ok_or_else(|| ConfigError::MissingSetting(EXTENSION_DIRS_SETTING.to_string()))
            })
            .collect()
    }

    /// Load and assemble every task
    ///
    /// `tags` prunes task set members only; see [`assemble`].
    pub fn find_all(&self, tags: &[String]) -> Result<TaskGraph> {
        let dirs = self.extension_dirs()?;
        let records = load_records_from_dirs(&dirs)?;

        Ok(assemble(records, self.external_tasks.iter().cloned(), tags))
    }

    /// Find one task by id
    pub fn find_by_id(&self, id: &str, tags: &[String]) -> Result<Option<Task>> {
        Ok(self.find_all(tags)?.swap_remove(id))
    }
}
