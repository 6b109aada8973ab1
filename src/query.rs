/// Task query engine
///
/// Pure filtering and sorting over a principal's tasks. Predicates are
/// conjunctive; an empty filter returns every task under the default
/// ordering. The result is a plain `Vec`, finite and restartable.
///
/// # Default ordering
///
/// Incomplete tasks before completed; within each group ascending by due
/// date with undated tasks last; ties broken by creation time ascending.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use uuid::Uuid;

use crate::models::{Priority, Task};

/// Priority predicate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriorityFilter {
    /// Priority must match exactly
    Exact(Priority),

    /// Priority must be at least this urgent
    AtLeast(Priority),
}

impl PriorityFilter {
    fn matches(&self, priority: Priority) -> bool {
        match self {
            PriorityFilter::Exact(p) => priority == *p,
            PriorityFilter::AtLeast(p) => priority >= *p,
        }
    }
}

/// Conjunctive task filter; every field is optional
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskFilter {
    /// Only tasks filed under this project
    pub project_id: Option<Uuid>,

    /// Only tasks matching this priority predicate
    pub priority: Option<PriorityFilter>,

    /// Only tasks with this completion state
    pub completed: Option<bool>,

    /// Only tasks carrying at least one of these tags
    pub any_tags: Option<Vec<Uuid>>,
}

impl TaskFilter {
    /// True if the task satisfies every set predicate
    pub fn matches(&self, task: &Task) -> bool {
        if let Some(project_id) = self.project_id {
            if task.project_id != Some(project_id) {
                return false;
            }
        }
        if let Some(priority) = self.priority {
            if !priority.matches(task.priority) {
                return false;
            }
        }
        if let Some(completed) = self.completed {
            if task.completed != completed {
                return false;
            }
        }
        if let Some(tags) = &self.any_tags {
            if !tags.iter().any(|id| task.tag_ids.contains(id)) {
                return false;
            }
        }
        true
    }
}

/// Filters and sorts tasks under the default ordering
pub fn select(filter: &TaskFilter, tasks: Vec<Task>) -> Vec<Task> {
    let mut out: Vec<Task> = tasks.into_iter().filter(|t| filter.matches(t)).collect();
    out.sort_by(default_order);
    out
}

/// Incomplete first, then due date ascending (undated last), then created_at
fn default_order(a: &Task, b: &Task) -> Ordering {
    a.completed
        .cmp(&b.completed)
        .then_with(|| match (a.due_date, b.due_date) {
            (Some(x), Some(y)) => x.cmp(&y),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        })
        .then_with(|| a.created_at.cmp(&b.created_at))
}
