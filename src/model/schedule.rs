use std::collections::HashSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::task::Task;

/// A named collection of root tasks. This is the input the timeline core is
/// handed on every recompute; nothing in the core holds onto it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schedule {
    pub name: String,
    pub tasks: Vec<Task>,
}

impl Default for Schedule {
    fn default() -> Self {
        Self {
            name: "Untitled Schedule".to_string(),
            tasks: Vec::new(),
        }
    }
}

/// One renderable row: a root task or a subtask of an expanded parent.
#[derive(Debug, Clone, Copy)]
pub struct Row<'a> {
    pub task: &'a Task,
    /// 0 for root tasks, 1 for subtasks. Nothing nests deeper.
    pub depth: u8,
}

impl Schedule {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tasks: Vec::new(),
        }
    }

    /// Union of all planned date ranges across tasks and subtasks, used to
    /// bound the axis. `None` when the schedule has no tasks.
    pub fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        let mut range: Option<(NaiveDate, NaiveDate)> = None;
        for task in self.iter_all() {
            let (start, end) = (task.planned.start, task.planned.end);
            range = Some(match range {
                Some((min, max)) => (min.min(start), max.max(end)),
                None => (start, end),
            });
        }
        range
    }

    /// Flatten the tree into the rows the chart and table will draw.
    /// Subtasks appear only when their parent id is in `expanded`; the
    /// expand set never touches the task data itself.
    pub fn visible_rows<'a>(&'a self, expanded: &HashSet<String>) -> Vec<Row<'a>> {
        let mut rows = Vec::new();
        for task in &self.tasks {
            rows.push(Row { task, depth: 0 });
            if expanded.contains(&task.id) {
                for sub in &task.subtasks {
                    rows.push(Row { task: sub, depth: 1 });
                }
            }
        }
        rows
    }

    /// Depth-first iterator over every task and subtask.
    pub fn iter_all(&self) -> impl Iterator<Item = &Task> {
        self.tasks
            .iter()
            .flat_map(|t| std::iter::once(t).chain(t.subtasks.iter()))
    }

    pub fn find(&self, id: &str) -> Option<&Task> {
        self.iter_all().find(|t| t.id == id)
    }

    pub fn find_mut(&mut self, id: &str) -> Option<&mut Task> {
        for task in &mut self.tasks {
            if task.id == id {
                return Some(task);
            }
            for sub in &mut task.subtasks {
                if sub.id == id {
                    return Some(sub);
                }
            }
        }
        None
    }

    /// Remove the task (or subtask) with the given id, along with any
    /// dependency references pointing at it or its children.
    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|t| t.id != id);
        let mut removed = self.tasks.len() != before;
        if !removed {
            for task in &mut self.tasks {
                let n = task.subtasks.len();
                task.subtasks.retain(|s| s.id != id);
                if task.subtasks.len() != n {
                    removed = true;
                    break;
                }
            }
        }
        if removed {
            let dangling = |dep: &mut Option<String>| {
                if dep.as_deref().is_some_and(|d| d == id || d.starts_with(&format!("{id}."))) {
                    *dep = None;
                }
            };
            for task in &mut self.tasks {
                dangling(&mut task.depends_on);
                for sub in &mut task.subtasks {
                    dangling(&mut sub.depends_on);
                }
            }
        }
        removed
    }

    /// Next free ordinal id at the root level ("1", "2", ...).
    pub fn next_root_id(&self) -> String {
        (Self::max_ordinal(self.tasks.iter().map(|t| t.id.as_str())) + 1).to_string()
    }

    /// Next free dotted id under the given parent ("2.1", "2.2", ...).
    pub fn next_child_id(&self, parent_id: &str) -> Option<String> {
        let parent = self.tasks.iter().find(|t| t.id == parent_id)?;
        let prefix = format!("{parent_id}.");
        let next = Self::max_ordinal(
            parent
                .subtasks
                .iter()
                .filter_map(|s| s.id.strip_prefix(&prefix)),
        ) + 1;
        Some(format!("{parent_id}.{next}"))
    }

    fn max_ordinal<'a>(ids: impl Iterator<Item = &'a str>) -> u32 {
        ids.filter_map(|id| id.parse::<u32>().ok()).max().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::task::DateInterval;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sample() -> Schedule {
        let mut schedule = Schedule::new("Test");
        let mut t1 = Task::new(
            "1",
            "Phase 1",
            DateInterval::new(date(2024, 11, 3), date(2024, 11, 20)),
        );
        t1.subtasks.push(Task::new(
            "1.1",
            "Kickoff",
            DateInterval::new(date(2024, 11, 1), date(2024, 11, 6)),
        ));
        t1.subtasks.push(Task::new(
            "1.2",
            "Build",
            DateInterval::new(date(2024, 11, 7), date(2024, 11, 20)),
        ));
        schedule.tasks.push(t1);
        schedule.tasks.push(Task::new(
            "2",
            "Phase 2",
            DateInterval::new(date(2024, 11, 18), date(2024, 12, 24)),
        ));
        schedule
    }

    #[test]
    fn date_range_unions_tasks_and_subtasks() {
        // Subtask 1.1 starts before its parent; the union must include it.
        let (min, max) = sample().date_range().unwrap();
        assert_eq!(min, date(2024, 11, 1));
        assert_eq!(max, date(2024, 12, 24));
    }

    #[test]
    fn date_range_is_none_for_empty_schedule() {
        assert_eq!(Schedule::default().date_range(), None);
    }

    #[test]
    fn visible_rows_respect_the_expand_set() {
        let schedule = sample();

        let collapsed = schedule.visible_rows(&HashSet::new());
        assert_eq!(collapsed.len(), 2);
        assert!(collapsed.iter().all(|r| r.depth == 0));

        let mut expanded = HashSet::new();
        expanded.insert("1".to_string());
        let rows = schedule.visible_rows(&expanded);
        let ids: Vec<&str> = rows.iter().map(|r| r.task.id.as_str()).collect();
        assert_eq!(ids, ["1", "1.1", "1.2", "2"]);
        assert_eq!(rows[1].depth, 1);
    }

    #[test]
    fn ordinal_ids_extend_the_existing_numbering() {
        let schedule = sample();
        assert_eq!(schedule.next_root_id(), "3");
        assert_eq!(schedule.next_child_id("1").as_deref(), Some("1.3"));
        assert_eq!(schedule.next_child_id("2").as_deref(), Some("2.1"));
        assert_eq!(schedule.next_child_id("9"), None);
    }

    #[test]
    fn remove_clears_dangling_dependency_references() {
        let mut schedule = sample();
        schedule.tasks[1].depends_on = Some("1.2".to_string());
        assert!(schedule.remove("1.2"));
        assert_eq!(schedule.find("1.2"), None);
        assert_eq!(schedule.tasks[1].depends_on, None);

        // Removing a root also clears references to its subtasks.
        let mut schedule = sample();
        schedule.tasks[1].depends_on = Some("1.1".to_string());
        assert!(schedule.remove("1"));
        assert_eq!(schedule.tasks.len(), 1);
        assert_eq!(schedule.tasks[0].depends_on, None);
    }

    #[test]
    fn find_reaches_nested_subtasks() {
        let schedule = sample();
        assert_eq!(schedule.find("1.2").map(|t| t.name.as_str()), Some("Build"));
        assert_eq!(schedule.find("7"), None);
    }
}
