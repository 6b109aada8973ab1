/// Project model
///
/// A project groups tasks for one user. Deleting a project never deletes its
/// tasks; the store clears their project reference instead, since a task may
/// exist without a project.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Palette entry applied when a project is created without a color
pub const DEFAULT_PROJECT_COLOR: &str = "#3B82F6";

/// A task grouping owned by exactly one user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    /// Unique project ID (UUID v4)
    pub id: Uuid,

    /// Owning user
    pub user_id: Uuid,

    /// Display name (required, non-empty after trim)
    pub name: String,

    /// Optional free-form description
    pub description: Option<String>,

    /// Display color (hex string)
    pub color: String,

    /// Whether the project is archived
    pub archived: bool,

    /// When the project was created
    pub created_at: DateTime<Utc>,

    /// When the project was last updated
    pub updated_at: DateTime<Utc>,

    /// Optimistic-concurrency version, bumped on every successful update
    pub version: i64,
}

/// Input for creating a project
///
/// Omitted fields get defaults: color falls back to
/// [`DEFAULT_PROJECT_COLOR`], archived starts false.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateProject {
    /// Display name (required)
    pub name: String,

    /// Optional description
    pub description: Option<String>,

    /// Optional color override
    pub color: Option<String>,
}

/// Input for a partial project update
///
/// Only non-None fields change. `description` uses a nested Option so
/// `Some(None)` clears it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateProject {
    /// New name
    pub name: Option<String>,

    /// New description (use `Some(None)` to clear)
    pub description: Option<Option<String>>,

    /// New color
    pub color: Option<String>,

    /// Archive or unarchive
    pub archived: Option<bool>,

    /// If set, the update only applies when the stored version matches
    pub expected_version: Option<i64>,
}
