//! Task graph assembly
//!
//! Turns task records into the id-keyed task graph: plain tasks first, then
//! task sets (which reference plain tasks by id), then externally supplied
//! tasks, each overriding earlier entries with the same id.

use crate::config::{parse_record, TaskRecord};
use crate::error::ConfigResult;
use crate::task::filter::matches_tags;
use crate::task::model::{Task, DEFAULT_STAGE};
use indexmap::IndexMap;
use serde_yaml::Value;
use tracing::{debug, warn};

/// Tasks keyed by id, in assembly order
pub type TaskGraph = IndexMap<String, Task>;

/// Assemble the task graph
///
/// `tags` prunes task set members (and what the sets aggregate from them);
/// the top-level graph always contains every task.
pub fn assemble<I>(records: Vec<TaskRecord>, external_tasks: I, tags: &[String]) -> TaskGraph
where
    I: IntoIterator<Item = Task>,
{
    let (task_records, set_records) = partition(records);

    let mut tasks = TaskGraph::new();

    for record in task_records.values() {
        let task = Task::from_config(record);
        debug!(id = task.id(), "built task");
        tasks.insert(task.id().to_string(), task);
    }

    for record in set_records.values() {
        let set = build_task_set(record, &mut tasks, tags);
        debug!(id = set.id(), members = set.get_sub_tasks(&[]).len(), "built task set");
        tasks.insert(set.id().to_string(), set);
    }

    for task in external_tasks {
        if tasks.contains_key(task.id()) {
            warn!(id = task.id(), "external task replaces configured task");
        }
        tasks.insert(task.id().to_string(), task);
    }

    tasks
}

/// Parse raw record mappings, then assemble
///
/// The first malformed record aborts assembly.
pub fn assemble_values<I>(values: Vec<Value>, external_tasks: I, tags: &[String]) -> ConfigResult<TaskGraph>
where
    I: IntoIterator<Item = Task>,
{
    let records = values
        .into_iter()
        .map(parse_record)
        .collect::<ConfigResult<Vec<_>>>()?;

    Ok(assemble(records, external_tasks, tags))
}

/// Split records into plain tasks and task sets, keyed by id
///
/// A later record with the same id replaces an earlier one.
fn partition(records: Vec<TaskRecord>) -> (IndexMap<String, TaskRecord>, IndexMap<String, TaskRecord>) {
    let mut task_records = IndexMap::new();
    let mut set_records = IndexMap::new();

    for record in records {
        let target = if record.is_task_set() {
            &mut set_records
        } else {
            &mut task_records
        };

        if let Some(previous) = target.insert(record.id.clone(), record) {
            warn!(id = previous.id.as_str(), "duplicate task record, keeping the last one");
        }
    }

    (task_records, set_records)
}

/// Build a task set from its record and the already-built plain tasks
///
/// Members whose tags miss the filter are ignored. Members that reference an
/// unknown id, or another task set, are skipped without error.
fn build_task_set(record: &TaskRecord, tasks: &mut TaskGraph, tags: &[String]) -> Task {
    let mut set = Task::from_config(record);
    let mut members = Vec::new();

    for member in &record.tasks {
        if !matches_tags(&member.tags, tags) {
            continue;
        }

        let Some(task) = tasks.get_mut(&member.id).filter(|task| !task.is_task_set()) else {
            debug!(set = record.id.as_str(), member = member.id.as_str(), "skipping unresolved member");
            continue;
        };

        task.stamp_tags(&member.tags);

        let commands = task
            .commands()
            .iter()
            .cloned()
            .map(|command| {
                command
                    .with_stop_on_error(member.stop_on_error)
                    .with_tags(member.tags.clone())
            })
            .collect();
        set.absorb_member(commands, task.placeholders());

        members.push(task.clone());
    }

    let stages = if record.stages.is_empty() {
        member_stages(&members)
    } else {
        record.stages.clone()
    };

    set.with_sub_tasks(stages, members)
}

/// Distinct member stages in first-seen order
fn member_stages(members: &[Task]) -> Vec<String> {
    let mut stages: Vec<String> = Vec::new();

    for member in members {
        if member.stage() != DEFAULT_STAGE && !stages.iter().any(|s| s == member.stage()) {
            stages.push(member.stage().to_string());
        }
    }

    stages
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::parse_record_str;
    use crate::task::model::{Command, LifecycleEvent};

    fn record(yaml: &str) -> TaskRecord {
        parse_record_str(yaml).unwrap()
    }

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    fn plain(id: &str, tags: &[&str], placeholder: &str) -> TaskRecord {
        record(&format!(
            r#"
id: {id}
type: local_cli
short_description: {id}
version: 0.1.0
command: echo {placeholder}
tags: [{tags}]
placeholders:
  - name: "{placeholder}"
    value_resolver: STATIC
    configuration:
      defaultValue: {id}
"#,
            tags = tags.join(", ")
        ))
    }

    fn staged_set() -> TaskRecord {
        record(
            r#"
id: hello:set
type: task_set
short_description: Greets stages
version: 0.1.0
placeholders:
  - name: "%own%"
    value_resolver: FLAG
tasks:
  - id: stage_a
    tags: [tagA]
    stop_on_error: true
  - id: stage_b
    tags: [tagB]
  - id: missing
    tags: [tagA]
"#,
        )
    }

    fn ids(tasks: Vec<&Task>) -> Vec<&str> {
        tasks.into_iter().map(Task::id).collect()
    }

    #[test]
    fn test_plain_tasks_keyed_by_id() {
        let graph = assemble(
            vec![plain("one", &[], "%a%"), plain("two", &[], "%b%")],
            Vec::new(),
            &[],
        );
        let keys: Vec<&String> = graph.keys().collect();
        assert_eq!(keys, vec!["one", "two"]);
        assert_eq!(graph["two"].commands()[0].command(), "echo %b%");
    }

    #[test]
    fn test_task_set_members_and_aggregation() {
        let graph = assemble(
            vec![staged_set(), plain("stage_a", &["x"], "%a%"), plain("stage_b", &[], "%b%")],
            Vec::new(),
            &[],
        );

        let set = &graph["hello:set"];
        assert!(set.is_task_set());
        assert_eq!(ids(set.get_sub_tasks(&[])), vec!["stage_a", "stage_b"]);
        assert_eq!(ids(set.get_sub_tasks(&strings(&["tagA"]))), vec!["stage_a"]);

        let placeholders: Vec<&String> = set.placeholders().keys().collect();
        assert_eq!(placeholders, vec!["%own%", "%a%", "%b%"]);

        assert_eq!(set.commands().len(), 2);
        assert!(set.commands()[0].has_stop_on_error());
        assert_eq!(set.commands()[0].tags(), &strings(&["tagA"])[..]);
        assert!(!set.commands()[1].has_stop_on_error());

        // the member tag override is stamped onto the graph entry too
        assert_eq!(graph["stage_a"].tags(), &strings(&["tagA"])[..]);
        assert_eq!(set.stages(), &strings(&[DEFAULT_STAGE])[..]);
    }

    #[test]
    fn test_later_member_placeholder_overwrites_earlier() {
        let stage_b = record(
            r#"
id: stage_b
type: local_cli
short_description: stage_b
version: 0.1.0
command: echo %shared%
placeholders:
  - name: "%shared%"
    value_resolver: SETTING
    optional: true
    configuration:
      setting: project_dir
  - name: "%b%"
    value_resolver: FLAG
"#,
        );
        let graph = assemble(
            vec![staged_set(), plain("stage_a", &[], "%shared%"), stage_b],
            Vec::new(),
            &[],
        );

        let set = &graph["hello:set"];
        let names: Vec<&String> = set.placeholders().keys().collect();
        assert_eq!(names, vec!["%own%", "%shared%", "%b%"]);

        let shared = &set.placeholders()["%shared%"];
        assert_eq!(shared.value_resolver(), "SETTING");
        assert!(shared.is_optional());
        assert_eq!(
            shared.configuration().get("setting").and_then(Value::as_str),
            Some("project_dir")
        );
        assert!(shared.configuration().get("defaultValue").is_none());

        // members keep their own declarations
        assert_eq!(graph["stage_a"].placeholders()["%shared%"].value_resolver(), "STATIC");
    }

    #[test]
    fn test_tag_filter_prunes_members_not_graph() {
        let graph = assemble(
            vec![plain("stage_a", &[], "%a%"), plain("stage_b", &[], "%b%"), staged_set()],
            Vec::new(),
            &strings(&["tagB"]),
        );

        assert_eq!(graph.len(), 3);
        let set = &graph["hello:set"];
        assert_eq!(ids(set.get_sub_tasks(&[])), vec!["stage_b"]);
        assert_eq!(set.commands().len(), 1);
        assert!(!set.placeholders().contains_key("%a%"));
        assert!(set.get_sub_tasks(&strings(&["tagA"])).is_empty());
    }

    #[test]
    fn test_unresolved_members_are_skipped_repeatedly() {
        for _ in 0..2 {
            let graph = assemble(vec![staged_set()], Vec::new(), &[]);
            let set = &graph["hello:set"];
            assert!(set.get_sub_tasks(&[]).is_empty());
            assert!(set.commands().is_empty());
        }
    }

    #[test]
    fn test_task_set_cannot_be_a_member() {
        let nested = record(
            r#"
id: outer
type: task_set
short_description: outer
version: 0.1.0
tasks:
  - id: hello:set
"#,
        );
        let graph = assemble(vec![staged_set(), nested], Vec::new(), &[]);
        assert!(graph["outer"].get_sub_tasks(&[]).is_empty());
    }

    #[test]
    fn test_declared_stages_and_member_stages() {
        let mut a = plain("stage_a", &[], "%a%");
        a.stage = Some("stageA".to_string());
        let mut set = staged_set();

        let graph = assemble(vec![a.clone(), set.clone()], Vec::new(), &[]);
        assert_eq!(graph["hello:set"].stages(), &strings(&["stageA", DEFAULT_STAGE])[..]);

        set.stages = strings(&["stageB", "stageA"]);
        let graph = assemble(vec![a, set], Vec::new(), &[]);
        assert_eq!(
            graph["hello:set"].stages(),
            &strings(&["stageB", "stageA", DEFAULT_STAGE])[..]
        );
    }

    #[test]
    fn test_external_task_replaces_configured_task() {
        let external = Task::new("one", "native", "9.9.9")
            .with_commands(vec![Command::new("native", "php")]);

        let graph = assemble(vec![plain("one", &[], "%a%")], vec![external.clone()], &[]);
        assert_eq!(graph.len(), 1);
        assert_eq!(graph["one"], external);
        assert!(graph["one"].placeholders().is_empty());
    }

    #[test]
    fn test_duplicate_record_last_wins() {
        let first = plain("one", &[], "%a%");
        let second = plain("one", &[], "%b%");
        let graph = assemble(vec![first, second], Vec::new(), &[]);
        assert_eq!(graph["one"].commands()[0].command(), "echo %b%");
    }

    #[test]
    fn test_lifecycle_commands_never_stop_on_error() {
        let task = record(
            r#"
id: with_hooks
type: local_cli
short_description: hooks
version: 0.1.0
command: echo run
stop_on_error: true
lifecycle:
  UPDATED:
    commands:
      - command: echo update
    placeholders:
      - name: "%version%"
        value_resolver: STATIC
"#,
        );
        let graph = assemble(vec![task], Vec::new(), &[]);
        let lifecycle = graph["with_hooks"].lifecycle();
        let updated = lifecycle.event(LifecycleEvent::Updated);
        assert_eq!(updated.commands.len(), 1);
        assert!(!updated.commands[0].has_stop_on_error());
        assert!(updated.placeholders.contains_key("%version%"));
        assert!(lifecycle.event(LifecycleEvent::Initialized).is_empty());
        assert!(graph["with_hooks"].commands()[0].has_stop_on_error());
    }

    #[test]
    fn test_assemble_values_fails_fast() {
        let good: Value = serde_yaml::from_str(
            "id: ok\ntype: local_cli\nshort_description: d\nversion: '1'\ncommand: x\n",
        )
        .unwrap();
        let bad: Value = serde_yaml::from_str("id: broken\ntype: local_cli\n").unwrap();

        let result = assemble_values(vec![good.clone(), bad], Vec::new(), &[]);
        assert!(result.is_err());

        let graph = assemble_values(vec![good], Vec::new(), &[]).unwrap();
        assert!(graph.contains_key("ok"));
    }
}
