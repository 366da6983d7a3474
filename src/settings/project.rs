//! Project-level setting overrides
//!
//! Settings flagged `is_project` can be overridden by a YAML file in the
//! project directory. The file maps setting paths to values and is written
//! back when project settings are saved.

use crate::error::{ConfigError, SdkError};
use crate::settings::{Setting, SettingRepository};
use indexmap::IndexMap;
use serde_yaml::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Default project settings file, relative to the working directory
pub const PROJECT_SETTINGS_FILE: &str = ".rsdk/settings.yml";

/// Layers project file values over a core settings repository
#[derive(Debug, Clone)]
pub struct ProjectSettingRepository<R> {
    core: R,
    project_file: PathBuf,
}

impl<R: SettingRepository> ProjectSettingRepository<R> {
    pub fn new(core: R, project_file: impl Into<PathBuf>) -> Self {
        ProjectSettingRepository {
            core,
            project_file: project_file.into(),
        }
    }

    /// Path of the project settings file
    pub fn project_file(&self) -> &Path {
        &self.project_file
    }

    /// Save a single project setting
    pub fn save(&self, setting: Setting) -> Result<Setting, SdkError> {
        let mut saved = self.save_multiple(vec![setting])?;
        Ok(saved.remove(0))
    }

    /// Save several project settings in one write
    pub fn save_multiple(&self, settings: Vec<Setting>) -> Result<Vec<Setting>, SdkError> {
        let mut values = self.project_values()?;

        for setting in &settings {
            values.insert(setting.path.clone(), setting.values.clone());
        }

        if let Some(parent) = self.project_file.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        fs::write(&self.project_file, serde_yaml::to_string(&values)?)?;
        debug!(file = %self.project_file.display(), count = settings.len(), "saved project settings");

        Ok(settings)
    }

    /// Read the project file; a missing file means no overrides
    fn project_values(&self) -> Result<IndexMap<String, Value>, SdkError> {
        if !self.project_file.is_file() {
            return Ok(IndexMap::new());
        }

        let contents = fs::read_to_string(&self.project_file).map_err(|e| ConfigError::ReadFile {
            path: self.project_file.clone(),
            error: e.to_string(),
        })?;

        if contents.trim().is_empty() {
            return Ok(IndexMap::new());
        }

        Ok(serde_yaml::from_str(&contents)?)
    }

    fn fill_project_values(&self, mut settings: Vec<Setting>) -> Vec<Setting> {
        // An unreadable project file is treated as absent: core values still apply.
        let values = match self.project_values() {
            Ok(values) => values,
            Err(e) => {
                debug!(file = %self.project_file.display(), error = %e, "ignoring project settings");
                return settings;
            }
        };

        for setting in settings.iter_mut().filter(|s| s.is_project) {
            if let Some(value) = values.get(&setting.path) {
                setting.values = value.clone();
            }
        }

        settings
    }
}

impl<R: SettingRepository> SettingRepository for ProjectSettingRepository<R> {
    fn find_one_by_path(&self, path: &str) -> Option<Setting> {
        let setting = self.core.find_one_by_path(path)?;
        self.fill_project_values(vec![setting]).pop()
    }

    fn find(&self) -> Vec<Setting> {
        self.fill_project_values(self.core.find())
    }
}
