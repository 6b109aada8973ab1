/// User model
///
/// Users own all other entities. The password is stored only as an Argon2id
/// hash; the raw secret never appears in a model, a log line, or a response.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A registered account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Unique user ID (UUID v4)
    pub id: Uuid,

    /// Unique username (exact-match uniqueness)
    pub username: String,

    /// Email address, stored lowercase (case-insensitive uniqueness)
    pub email: String,

    /// Argon2id password hash
    ///
    /// Never store plaintext passwords!
    #[serde(skip_serializing, default)]
    pub password_hash: String,

    /// When the account was created
    pub created_at: DateTime<Utc>,
}
