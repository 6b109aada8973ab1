//! # taskdeck
//!
//! Multi-tenant task-management domain core: authenticated, per-user-scoped
//! CRUD over projects, tags, and tasks, a natural-language quick-add parser,
//! and a task query engine. Transport, persistence engines, and signing-key
//! management are collaborators that sit outside this crate.
//!
//! ## Module Organization
//!
//! - `models`: Domain entities and their create/update inputs
//! - `store`: Principal-scoped entity store with cascade semantics
//! - `auth`: Password hashing, session tokens, principal resolution
//! - `quickadd`: Free text -> task draft parser
//! - `query`: Task filtering and default ordering
//! - `facade`: The composed operation surface a transport layer calls
//! - `clock`: Injected time source
//! - `config`: Environment configuration
//! - `error`: Common error taxonomy
//!
//! ## Isolation
//!
//! Every store operation takes an explicit principal; an entity another user
//! owns is indistinguishable from one that does not exist.

pub mod auth;
pub mod clock;
pub mod config;
pub mod error;
pub mod facade;
pub mod models;
pub mod query;
pub mod quickadd;
pub mod store;

pub use error::{Error, FieldError, Result};
pub use facade::Taskdeck;

/// Current version of the taskdeck library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
