//! Settings collaborator
//!
//! Settings are path-addressed values (`extension_dirs`, `project_dir`, ...).
//! The engine only reads them through [`SettingRepository`]; resolution code
//! receives them as an explicit [`SettingValues`] map.

pub mod project;
pub mod store;

pub use project::*;
pub use store::*;

use indexmap::IndexMap;
use serde_yaml::Value;

/// Setting values keyed by path, as handed to value resolvers
pub type SettingValues = IndexMap<String, Value>;

/// A single setting
#[derive(Debug, Clone, PartialEq)]
pub struct Setting {
    /// Lookup path
    pub path: String,

    /// Current value
    pub values: Value,

    /// Whether the value may be overridden per project
    pub is_project: bool,

    /// Value type (`string`, `boolean`, `array`, ...)
    pub setting_type: String,
}

impl Setting {
    /// Create a non-project setting of type `string`
    pub fn new(path: impl Into<String>, values: Value) -> Self {
        Setting {
            path: path.into(),
            values,
            is_project: false,
            setting_type: "string".to_string(),
        }
    }

    /// Mark the setting as overridable per project
    pub fn project(mut self) -> Self {
        self.is_project = true;
        self
    }

    /// Set the value type
    pub fn with_type(mut self, setting_type: impl Into<String>) -> Self {
        self.setting_type = setting_type.into();
        self
    }

    /// Get the values of this setting
    pub fn values(&self) -> &Value {
        &self.values
    }
}

/// Read access to stored settings
pub trait SettingRepository {
    /// Find a setting by its path
    fn find_one_by_path(&self, path: &str) -> Option<Setting>;

    /// List all settings
    fn find(&self) -> Vec<Setting>;
}

/// Collect every setting into a path-keyed value map
pub fn setting_values<R: SettingRepository + ?Sized>(repository: &R) -> SettingValues {
    repository
        .find()
        .into_iter()
        .map(|setting| (setting.path, setting.values))
        .collect()
}
