/// Tag model
///
/// Tags label tasks, many-to-many. Tag names are unique per user,
/// case-insensitively; the casing of the first writer is kept for display.
/// Deleting a tag removes only the associations, never the tasks.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Palette entry applied when a tag is created without a color
pub const DEFAULT_TAG_COLOR: &str = "#6B7280";

/// A label owned by exactly one user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tag {
    /// Unique tag ID (UUID v4)
    pub id: Uuid,

    /// Owning user
    pub user_id: Uuid,

    /// Display name (required, unique per user case-insensitively)
    pub name: String,

    /// Display color (hex string)
    pub color: String,

    /// When the tag was created
    pub created_at: DateTime<Utc>,
}

/// Input for creating a tag
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateTag {
    /// Display name (required)
    pub name: String,

    /// Optional color override, defaults to [`DEFAULT_TAG_COLOR`]
    pub color: Option<String>,
}

/// Input for a partial tag update
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateTag {
    /// New name (must stay unique for the owner)
    pub name: Option<String>,

    /// New color
    pub color: Option<String>,
}
