/// Authentication and authorization
///
/// This module turns a presented credential into a principal and guarantees
/// that every downstream store operation is scoped to that principal.
///
/// # Modules
///
/// - `password`: Argon2id hashing, verification, and strength policy
/// - `jwt`: Session token creation and validation (HS256)
/// - `service`: Registration, login, and the principal-resolution choke point

pub mod jwt;
pub mod password;
pub mod service;

pub use service::{AuthService, RegisterInput};
