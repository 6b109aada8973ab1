/// Task model
///
/// Tasks are the core entity. Every task belongs to exactly one user and
/// optionally one project; it carries a set of tag references that must
/// belong to the same user (the store enforces this).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::Error;

/// Task priority, totally ordered: Low < Medium < High
///
/// # Example
///
/// ```
/// use taskdeck::models::Priority;
///
/// assert!(Priority::Low < Priority::High);
/// assert_eq!(Priority::default(), Priority::Medium);
/// assert_eq!("HIGH".parse::<Priority>().unwrap(), Priority::High);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    /// Lowest urgency
    Low,

    /// Default urgency
    Medium,

    /// Highest urgency
    High,
}

impl Priority {
    /// Priority as its wire string
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }
}

impl Default for Priority {
    fn default() -> Self {
        Priority::Medium
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "low" => Ok(Priority::Low),
            "medium" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            other => Err(Error::validation(
                "priority",
                format!("unknown priority '{}', expected low, medium, or high", other),
            )),
        }
    }
}

/// A task owned by exactly one user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    /// Unique task ID (UUID v4)
    pub id: Uuid,

    /// Owning user
    pub user_id: Uuid,

    /// Optional project; None means the task is unfiled
    pub project_id: Option<Uuid>,

    /// Title (required, non-empty after trim)
    pub title: String,

    /// Optional free-form description
    pub description: Option<String>,

    /// Optional due instant
    pub due_date: Option<DateTime<Utc>>,

    /// Priority, defaults to Medium
    pub priority: Priority,

    /// Completion flag, defaults to false
    pub completed: bool,

    /// Tags attached to this task
    ///
    /// Every referenced tag belongs to the same user as the task.
    pub tag_ids: BTreeSet<Uuid>,

    /// When the task was created
    pub created_at: DateTime<Utc>,

    /// When the task was last updated
    pub updated_at: DateTime<Utc>,

    /// Optimistic-concurrency version, bumped on every successful update
    pub version: i64,
}

/// Input for creating a task
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateTask {
    /// Title (required)
    pub title: String,

    /// Optional description
    pub description: Option<String>,

    /// Optional project to file the task under
    pub project_id: Option<Uuid>,

    /// Optional due instant
    pub due_date: Option<DateTime<Utc>>,

    /// Priority; None means Medium
    pub priority: Option<Priority>,

    /// Tag names; missing tags are created for the owner on the fly
    pub tags: Vec<String>,
}

/// Input for a partial task update
///
/// Only non-None fields change. Nullable fields use a nested Option so
/// `Some(None)` clears them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateTask {
    /// New title
    pub title: Option<String>,

    /// New description (use `Some(None)` to clear)
    pub description: Option<Option<String>>,

    /// Move to a project or unfile (use `Some(None)` to clear)
    pub project_id: Option<Option<Uuid>>,

    /// New due instant (use `Some(None)` to clear)
    pub due_date: Option<Option<DateTime<Utc>>>,

    /// New priority
    pub priority: Option<Priority>,

    /// Mark complete or incomplete
    pub completed: Option<bool>,

    /// Replace the full tag set by name; missing tags are created
    pub tags: Option<Vec<String>>,

    /// If set, the update only applies when the stored version matches
    pub expected_version: Option<i64>,
}
