//! In-memory settings store, loadable from YAML

use crate::error::{ConfigError, SdkError};
use crate::settings::{Setting, SettingRepository};
use indexmap::IndexMap;
use serde::Deserialize;
use serde_yaml::Value;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
struct SettingDetail {
    values: Value,

    #[serde(default)]
    is_project: bool,

    #[serde(rename = "type", default = "default_setting_type")]
    setting_type: String,
}

fn default_setting_type() -> String {
    "string".to_string()
}

/// Build a setting from one entry of a settings file
///
/// Only a mapping with a `values` key is a detailed entry; anything else,
/// sequences included, is the bare value.
fn setting_from_entry(path: String, entry: Value) -> Result<Setting, SdkError> {
    match entry {
        Value::Mapping(mapping) if mapping.contains_key("values") => {
            let detail: SettingDetail = serde_yaml::from_value(Value::Mapping(mapping))?;
            Ok(Setting {
                path,
                values: detail.values,
                is_project: detail.is_project,
                setting_type: detail.setting_type,
            })
        }
        values => Ok(Setting::new(path, values)),
    }
}

/// Settings held in memory, in insertion order
#[derive(Debug, Clone, Default)]
pub struct InMemorySettings {
    settings: IndexMap<String, Setting>,
}

impl InMemorySettings {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a setting
    pub fn with_setting(mut self, setting: Setting) -> Self {
        self.insert(setting);
        self
    }

    /// Insert or replace a setting
    pub fn insert(&mut self, setting: Setting) {
        self.settings.insert(setting.path.clone(), setting);
    }

    /// Number of stored settings
    pub fn len(&self) -> usize {
        self.settings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.settings.is_empty()
    }

    /// Parse settings from YAML
    ///
    /// ```yaml
    /// extension_dirs: [extension]
    /// project_dir:
    ///   values: /srv/app
    ///   is_project: true
    /// ```
    pub fn from_yaml(yaml: &str) -> Result<Self, SdkError> {
        if yaml.trim().is_empty() {
            return Ok(InMemorySettings::new());
        }

        let entries: Option<IndexMap<String, Value>> = serde_yaml::from_str(yaml)?;
        let mut store = InMemorySettings::new();

        for (path, entry) in entries.unwrap_or_default() {
            store.insert(setting_from_entry(path, entry)?);
        }

        Ok(store)
    }

    /// Load settings from a YAML file
    pub fn load(path: &Path) -> Result<Self, SdkError> {
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Self::from_yaml(&contents)
    }
}

impl SettingRepository for InMemorySettings {
    fn find_one_by_path(&self, path: &str) -> Option<Setting> {
        self.settings.get(path).cloned()
    }

    fn find(&self) -> Vec<Setting> {
        self.settings.values().cloned().collect()
    }
}
