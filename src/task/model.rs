//! Runtime task model
//!
//! This differs from [`config::TaskRecord`](crate::config::TaskRecord) in that
//! every optional block has been normalized: lifecycle transitions are always
//! present, placeholders are keyed by name and task sets carry their members.

use crate::config;
use crate::task::filter::{filter_by_tags, matches_stage};
use indexmap::IndexMap;
use serde_yaml::Mapping;
use std::fmt;

/// Stage of tasks that do not declare one
pub const DEFAULT_STAGE: &str = "default";

/// Placeholders keyed by name
pub type Placeholders = IndexMap<String, Placeholder>;

/// A named variable slot bound to a value resolver
#[derive(Debug, Clone, PartialEq)]
pub struct Placeholder {
    name: String,
    value_resolver: String,
    configuration: Mapping,
    optional: bool,
}

impl Placeholder {
    pub fn new(
        name: impl Into<String>,
        value_resolver: impl Into<String>,
        configuration: Mapping,
        optional: bool,
    ) -> Self {
        Placeholder {
            name: name.into(),
            value_resolver: value_resolver.into(),
            configuration,
            optional,
        }
    }

    /// Create from config
    pub fn from_config(config: &config::PlaceholderRecord) -> Self {
        Placeholder::new(
            config.name.clone(),
            config.value_resolver.clone(),
            config.configuration.clone(),
            config.optional,
        )
    }

    /// Name as it appears in command lines
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Id of the value resolver strategy
    pub fn value_resolver(&self) -> &str {
        &self.value_resolver
    }

    pub fn configuration(&self) -> &Mapping {
        &self.configuration
    }

    pub fn is_optional(&self) -> bool {
        self.optional
    }
}

/// Build a name-keyed placeholder map; a later name replaces an earlier one
pub fn placeholders_from_config(records: &[config::PlaceholderRecord]) -> Placeholders {
    records
        .iter()
        .map(|record| (record.name.clone(), Placeholder::from_config(record)))
        .collect()
}

/// Identifies the report converter to run after a command
#[derive(Debug, Clone, PartialEq)]
pub struct Converter {
    pub name: String,
    pub configuration: Mapping,
}

impl Converter {
    pub fn from_config(config: &config::ConverterRecord) -> Self {
        Converter {
            name: config.name.clone(),
            configuration: config.configuration.clone(),
        }
    }
}

/// Runtime representation of a command
#[derive(Debug, Clone, PartialEq)]
pub struct Command {
    command: String,
    kind: String,
    stop_on_error: bool,
    tags: Vec<String>,
    converter: Option<Converter>,
}

impl Command {
    pub fn new(command: impl Into<String>, kind: impl Into<String>) -> Self {
        Command {
            command: command.into(),
            kind: kind.into(),
            stop_on_error: false,
            tags: Vec::new(),
            converter: None,
        }
    }

    pub fn with_stop_on_error(mut self, stop_on_error: bool) -> Self {
        self.stop_on_error = stop_on_error;
        self
    }

    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }

    pub fn with_converter(mut self, converter: Option<Converter>) -> Self {
        self.converter = converter;
        self
    }

    /// Lifecycle commands are best-effort and never stop on error
    pub fn from_lifecycle_config(config: &config::LifecycleCommandRecord) -> Self {
        Command::new(config.command.clone(), config.kind.clone())
    }

    /// Invocation string, placeholders not yet substituted
    pub fn command(&self) -> &str {
        &self.command
    }

    /// Command kind (`local_cli`, ...)
    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn has_stop_on_error(&self) -> bool {
        self.stop_on_error
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    pub fn converter(&self) -> Option<&Converter> {
        self.converter.as_ref()
    }
}

/// A file to materialize during a lifecycle transition
#[derive(Debug, Clone, PartialEq)]
pub struct File {
    pub path: String,
    pub content: String,
}

impl File {
    pub fn from_config(config: &config::FileRecord) -> Self {
        File {
            path: config.path.clone(),
            content: config.content.clone(),
        }
    }
}

/// The three lifecycle transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LifecycleEvent {
    Initialized,
    Updated,
    Removed,
}

impl LifecycleEvent {
    /// All transitions in lifecycle order
    pub const ALL: [LifecycleEvent; 3] = [
        LifecycleEvent::Initialized,
        LifecycleEvent::Updated,
        LifecycleEvent::Removed,
    ];

    /// Key used in task records
    pub fn as_str(&self) -> &'static str {
        match self {
            LifecycleEvent::Initialized => "INITIALIZED",
            LifecycleEvent::Updated => "UPDATED",
            LifecycleEvent::Removed => "REMOVED",
        }
    }

    /// Parse a record key, case-insensitively
    pub fn parse(name: &str) -> Option<Self> {
        LifecycleEvent::ALL
            .into_iter()
            .find(|event| event.as_str().eq_ignore_ascii_case(name))
    }
}

impl fmt::Display for LifecycleEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Commands, placeholders and files of one lifecycle transition
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventData {
    pub commands: Vec<Command>,
    pub placeholders: Placeholders,
    pub files: Vec<File>,
}

impl EventData {
    /// Build from an optional record block; absence yields an empty bundle
    pub fn from_config(config: Option<&config::EventRecord>) -> Self {
        let Some(config) = config else {
            return EventData::default();
        };

        EventData {
            commands: config
                .commands
                .iter()
                .map(Command::from_lifecycle_config)
                .collect(),
            placeholders: placeholders_from_config(&config.placeholders),
            files: config.files.iter().map(File::from_config).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty() && self.placeholders.is_empty() && self.files.is_empty()
    }
}

/// Lifecycle hooks of a task
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Lifecycle {
    pub initialized: EventData,
    pub updated: EventData,
    pub removed: EventData,
}

impl Lifecycle {
    pub fn from_config(config: &config::LifecycleRecord) -> Self {
        Lifecycle {
            initialized: EventData::from_config(config.initialized.as_ref()),
            updated: EventData::from_config(config.updated.as_ref()),
            removed: EventData::from_config(config.removed.as_ref()),
        }
    }

    /// Get the bundle of one transition
    pub fn event(&self, event: LifecycleEvent) -> &EventData {
        match event {
            LifecycleEvent::Initialized => &self.initialized,
            LifecycleEvent::Updated => &self.updated,
            LifecycleEvent::Removed => &self.removed,
        }
    }

    /// Iterate over all transitions in lifecycle order
    pub fn events(&self) -> impl Iterator<Item = (LifecycleEvent, &EventData)> {
        LifecycleEvent::ALL
            .into_iter()
            .map(move |event| (event, self.event(event)))
    }
}

/// Members and stages of a task set
#[derive(Debug, Clone, Default, PartialEq)]
struct TaskSetData {
    stages: Vec<String>,
    members: Vec<Task>,
}

/// An identified, versioned unit of automation
///
/// A task set is a task that additionally carries member tasks; both share
/// this one shape. Fields are read-only once the task leaves the assembler.
#[derive(Debug, Clone, PartialEq)]
pub struct Task {
    id: String,
    short_description: String,
    commands: Vec<Command>,
    lifecycle: Lifecycle,
    version: String,
    placeholders: Placeholders,
    help: Option<String>,
    successor: Option<String>,
    deprecated: bool,
    stage: String,
    tags: Vec<String>,
    optional: bool,
    set: Option<TaskSetData>,
}

impl Task {
    /// Create a task with empty commands, placeholders and lifecycle
    pub fn new(
        id: impl Into<String>,
        short_description: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Task {
            id: id.into(),
            short_description: short_description.into(),
            commands: Vec::new(),
            lifecycle: Lifecycle::default(),
            version: version.into(),
            placeholders: Placeholders::new(),
            help: None,
            successor: None,
            deprecated: false,
            stage: DEFAULT_STAGE.to_string(),
            tags: Vec::new(),
            optional: false,
            set: None,
        }
    }

    /// Create the task facet of a record
    ///
    /// Task set aggregation is done by the assembler, which knows the other
    /// tasks; this only copies what the record itself declares.
    pub fn from_config(config: &config::TaskRecord) -> Self {
        let mut commands = Vec::new();

        if config.is_local_cli() {
            if let Some(command) = &config.command {
                commands.push(
                    Command::new(command.clone(), config.kind.clone())
                        .with_stop_on_error(config.stop_on_error)
                        .with_converter(config.report_converter.as_ref().map(Converter::from_config)),
                );
            }
        }

        Task {
            id: config.id.clone(),
            short_description: config.short_description.clone().unwrap_or_default(),
            commands,
            lifecycle: Lifecycle::from_config(&config.lifecycle),
            version: config.version.clone().unwrap_or_default(),
            placeholders: placeholders_from_config(&config.placeholders),
            help: config.help.clone(),
            successor: config.successor.clone(),
            deprecated: config.deprecated,
            stage: config
                .stage
                .clone()
                .unwrap_or_else(|| DEFAULT_STAGE.to_string()),
            tags: config.tags.clone(),
            optional: config.optional,
            set: None,
        }
    }

    pub fn with_commands(mut self, commands: Vec<Command>) -> Self {
        self.commands = commands;
        self
    }

    pub fn with_lifecycle(mut self, lifecycle: Lifecycle) -> Self {
        self.lifecycle = lifecycle;
        self
    }

    pub fn with_placeholders(mut self, placeholders: Vec<Placeholder>) -> Self {
        self.placeholders = placeholders
            .into_iter()
            .map(|p| (p.name().to_string(), p))
            .collect();
        self
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    pub fn with_successor(mut self, successor: impl Into<String>) -> Self {
        self.successor = Some(successor.into());
        self
    }

    pub fn with_deprecated(mut self, deprecated: bool) -> Self {
        self.deprecated = deprecated;
        self
    }

    pub fn with_stage(mut self, stage: impl Into<String>) -> Self {
        self.stage = stage.into();
        self
    }

    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }

    pub fn with_optional(mut self, optional: bool) -> Self {
        self.optional = optional;
        self
    }

    /// Turn this task into a task set with the given stages and members
    ///
    /// The default stage is always part of the stage list.
    pub fn with_sub_tasks(mut self, stages: Vec<String>, members: Vec<Task>) -> Self {
        let mut stages = stages;
        if !stages.iter().any(|s| s == DEFAULT_STAGE) {
            stages.push(DEFAULT_STAGE.to_string());
        }
        self.set = Some(TaskSetData { stages, members });
        self
    }

    /// Stamp a task set's tag override onto this task
    pub(crate) fn stamp_tags(&mut self, tags: &[String]) {
        self.tags = tags.to_vec();
    }

    /// Append aggregated commands and placeholders of a task set member
    pub(crate) fn absorb_member(&mut self, commands: Vec<Command>, placeholders: &Placeholders) {
        self.commands.extend(commands);
        for (name, placeholder) in placeholders {
            self.placeholders.insert(name.clone(), placeholder.clone());
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn short_description(&self) -> &str {
        &self.short_description
    }

    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    pub fn lifecycle(&self) -> &Lifecycle {
        &self.lifecycle
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn placeholders(&self) -> &Placeholders {
        &self.placeholders
    }

    pub fn help(&self) -> Option<&str> {
        self.help.as_deref()
    }

    pub fn successor(&self) -> Option<&str> {
        self.successor.as_deref()
    }

    pub fn is_deprecated(&self) -> bool {
        self.deprecated
    }

    pub fn stage(&self) -> &str {
        &self.stage
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    pub fn is_optional(&self) -> bool {
        self.optional
    }

    /// Check if this task aggregates other tasks
    pub fn is_task_set(&self) -> bool {
        self.set.is_some()
    }

    /// Declared stages of a task set; empty for plain tasks
    pub fn stages(&self) -> &[String] {
        self.set
            .as_ref()
            .map(|set| set.stages.as_slice())
            .unwrap_or(&[])
    }

    /// Member tasks whose tags intersect `tags`, in declared order
    ///
    /// An empty filter returns every member. Plain tasks have no members.
    pub fn get_sub_tasks(&self, tags: &[String]) -> Vec<&Task> {
        self.set
            .as_ref()
            .map(|set| filter_by_tags(&set.members, tags))
            .unwrap_or_default()
    }

    /// Member tasks of one stage, filtered by tags
    pub fn get_sub_tasks_for_stage(&self, stage: &str, tags: &[String]) -> Vec<&Task> {
        self.get_sub_tasks(tags)
            .into_iter()
            .filter(|member| matches_stage(member, stage))
            .collect()
    }
}
