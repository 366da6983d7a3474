//! Core configuration types
//!
//! This module defines the data structures that represent one task record as
//! it appears in a `Tasks/*.yaml` file.

use serde::{Deserialize, Serialize};
use serde_yaml::Mapping;

/// Record type of a task executed as a local command line
pub const LOCAL_CLI_TYPE: &str = "local_cli";

/// Record type of a task set
pub const TASK_SET_TYPE: &str = "task_set";

/// A task or task set record
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TaskRecord {
    /// Record type discriminator (`local_cli`, `task_set`, ...)
    #[serde(rename = "type")]
    pub kind: String,

    /// Globally unique task id
    pub id: String,

    /// One-line description shown in listings
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short_description: Option<String>,

    /// Task version
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    /// Command line to run (required for `local_cli`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,

    /// Whether a failure of the command stops the run
    #[serde(default)]
    pub stop_on_error: bool,

    /// Tags used for selection
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,

    /// Stage the task belongs to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stage: Option<String>,

    /// Longer help text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub help: Option<String>,

    /// Id of the task replacing this one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub successor: Option<String>,

    #[serde(default)]
    pub deprecated: bool,

    #[serde(default)]
    pub optional: bool,

    /// Placeholders used by the command
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub placeholders: Vec<PlaceholderRecord>,

    /// Report converter to run after the command
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report_converter: Option<ConverterRecord>,

    /// Lifecycle hooks
    #[serde(default)]
    pub lifecycle: LifecycleRecord,

    /// Member tasks (task sets only)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tasks: Vec<MemberRecord>,

    /// Declared stages (task sets only)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub stages: Vec<String>,
}

impl TaskRecord {
    /// Check if this record describes a task set
    pub fn is_task_set(&self) -> bool {
        self.kind == TASK_SET_TYPE
    }

    /// Check if this record describes a local command line task
    pub fn is_local_cli(&self) -> bool {
        self.kind == LOCAL_CLI_TYPE
    }
}

/// A placeholder declaration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PlaceholderRecord {
    /// Placeholder name as it appears in commands (e.g. `%project_dir%`)
    pub name: String,

    /// Id of the value resolver strategy
    pub value_resolver: String,

    /// Resolver configuration
    #[serde(default, skip_serializing_if = "Mapping::is_empty")]
    pub configuration: Mapping,

    #[serde(default)]
    pub optional: bool,
}

/// A report converter reference
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ConverterRecord {
    pub name: String,

    #[serde(default, skip_serializing_if = "Mapping::is_empty")]
    pub configuration: Mapping,
}

/// Lifecycle hooks, one optional block per transition
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct LifecycleRecord {
    #[serde(rename = "INITIALIZED", default, skip_serializing_if = "Option::is_none")]
    pub initialized: Option<EventRecord>,

    #[serde(rename = "UPDATED", default, skip_serializing_if = "Option::is_none")]
    pub updated: Option<EventRecord>,

    #[serde(rename = "REMOVED", default, skip_serializing_if = "Option::is_none")]
    pub removed: Option<EventRecord>,
}

/// Commands, placeholders and files attached to one lifecycle transition
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct EventRecord {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub commands: Vec<LifecycleCommandRecord>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub placeholders: Vec<PlaceholderRecord>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub files: Vec<FileRecord>,
}

/// A lifecycle command
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LifecycleCommandRecord {
    pub command: String,

    #[serde(rename = "type", default = "default_command_type")]
    pub kind: String,
}

fn default_command_type() -> String {
    LOCAL_CLI_TYPE.to_string()
}

/// A file generated during a lifecycle transition
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FileRecord {
    pub path: String,

    #[serde(default)]
    pub content: String,
}

/// A member reference inside a task set
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MemberRecord {
    /// Id of the referenced task
    pub id: String,

    /// Tags stamped onto the member
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,

    #[serde(default)]
    pub stop_on_error: bool,
}
