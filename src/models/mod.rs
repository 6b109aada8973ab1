/// Domain models for taskdeck
///
/// Every entity belongs to exactly one user; nothing is ever shared across
/// users. The structs here are plain data — scoping, uniqueness, and cascade
/// rules are enforced by the store.
///
/// # Models
///
/// - `user`: Accounts; passwords stored only as Argon2id hashes
/// - `project`: Optional grouping for tasks, owned by one user
/// - `tag`: Labels, unique per user (case-insensitive), many-to-many with tasks
/// - `task`: The core entity; optional project, optional due date, tag set

pub mod project;
pub mod tag;
pub mod task;
pub mod user;

pub use project::{CreateProject, Project, UpdateProject, DEFAULT_PROJECT_COLOR};
pub use tag::{CreateTag, Tag, UpdateTag, DEFAULT_TAG_COLOR};
pub use task::{CreateTask, Priority, Task, UpdateTask};
pub use user::User;
