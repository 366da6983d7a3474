//! Tag and stage filtering
//!
//! The same predicate decides which task set members the assembler keeps and
//! which members [`Task::get_sub_tasks`] returns, so both always agree.

use crate::task::model::Task;
use indexmap::IndexMap;

/// Check if a tag list passes a filter
///
/// An empty filter matches everything; otherwise at least one tag must be
/// shared (set intersection, not subset).
pub fn matches_tags(tags: &[String], filter: &[String]) -> bool {
    filter.is_empty() || tags.iter().any(|tag| filter.contains(tag))
}

/// Check if a task belongs to a stage
pub fn matches_stage(task: &Task, stage: &str) -> bool {
    task.stage() == stage
}

/// Keep the tasks whose tags pass the filter, preserving order
pub fn filter_by_tags<'a, I>(tasks: I, filter: &[String]) -> Vec<&'a Task>
where
    I: IntoIterator<Item = &'a Task>,
{
    tasks
        .into_iter()
        .filter(|task| matches_tags(task.tags(), filter))
        .collect()
}

/// Group tasks by stage, following the declared stage order
///
/// Stages that are declared but empty are kept with no tasks; tasks whose
/// stage is not declared are appended under their own stage name.
pub fn group_by_stage<'a, I>(tasks: I, stages: &[String]) -> IndexMap<String, Vec<&'a Task>>
where
    I: IntoIterator<Item = &'a Task>,
{
    let mut groups: IndexMap<String, Vec<&'a Task>> = stages
        .iter()
        .map(|stage| (stage.clone(), Vec::new()))
        .collect();

    for task in tasks {
        groups.entry(task.stage().to_string()).or_default().push(task);
    }

    groups
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    fn task(id: &str, stage: &str, tags: &[&str]) -> Task {
        Task::new(id, "", "1").with_stage(stage).with_tags(strings(tags))
    }

    #[test]
    fn test_empty_filter_matches_everything() {
        assert!(matches_tags(&[], &[]));
        assert!(matches_tags(&strings(&["a"]), &[]));
    }

    #[test]
    fn test_intersection_semantics() {
        let tags = strings(&["a", "b"]);
        assert!(matches_tags(&tags, &strings(&["b", "z"])));
        assert!(!matches_tags(&tags, &strings(&["z"])));
        assert!(!matches_tags(&[], &strings(&["a"])));
    }

    #[test]
    fn test_filter_by_tags_keeps_order() {
        let tasks = vec![
            task("one", "default", &["x"]),
            task("two", "default", &["y"]),
            task("three", "default", &["x", "y"]),
        ];
        let ids: Vec<&str> = filter_by_tags(&tasks, &strings(&["x"]))
            .into_iter()
            .map(Task::id)
            .collect();
        assert_eq!(ids, vec!["one", "three"]);
    }

    #[test]
    fn test_group_by_stage() {
        let tasks = vec![
            task("b1", "stageB", &[]),
            task("a1", "stageA", &[]),
            task("x1", "extra", &[]),
            task("b2", "stageB", &[]),
        ];
        let groups = group_by_stage(&tasks, &strings(&["stageA", "stageB", "default"]));

        let stages: Vec<&String> = groups.keys().collect();
        assert_eq!(stages, vec!["stageA", "stageB", "default", "extra"]);
        assert_eq!(groups["stageB"].len(), 2);
        assert!(groups["default"].is_empty());
        assert_eq!(groups["extra"][0].id(), "x1");
    }
}
