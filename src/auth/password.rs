/// Password hashing module using Argon2id
///
/// Passwords are stored only as salted Argon2id hashes in PHC string format.
/// Verification is constant-time; the raw secret is never logged or returned.
///
/// # Security
///
/// - **Algorithm**: Argon2id (hybrid of Argon2i and Argon2d)
/// - **Memory**: 64 MB (65536 KB)
/// - **Iterations**: 3 passes
/// - **Parallelism**: 4 lanes
/// - **Output**: 32-byte hash
///
/// # Example
///
/// ```
/// use taskdeck::auth::password::{hash_password, verify_password};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let hash = hash_password("super_secret_password_123")?;
/// assert!(verify_password("super_secret_password_123", &hash)?);
/// assert!(!verify_password("wrong_password", &hash)?);
/// # Ok(())
/// # }
/// ```

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2, ParamsBuilder, Version,
};

use crate::error::FieldError;

/// Error type for password hashing operations
#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    /// Failed to hash password
    #[error("Failed to hash password: {0}")]
    HashError(String),

    /// Failed to verify password
    #[error("Failed to verify password: {0}")]
    VerifyError(String),

    /// Invalid password hash format
    #[error("Invalid password hash format: {0}")]
    InvalidHash(String),
}

/// Hashes a password using Argon2id with secure parameters
///
/// # Returns
///
/// PHC string format hash (includes algorithm, parameters, salt, and hash),
/// e.g. `$argon2id$v=19$m=65536,t=3,p=4$...`
///
/// # Errors
///
/// Returns `PasswordError::HashError` if hashing fails
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    // Random salt from the OS RNG
    let salt = SaltString::generate(&mut OsRng);

    let params = ParamsBuilder::new()
        .m_cost(65536) // 64 MB
        .t_cost(3) // 3 iterations
        .p_cost(4) // 4 parallelism
        .output_len(32)
        .build()
        .map_err(|e| PasswordError::HashError(format!("Invalid parameters: {}", e)))?;

    let argon2 = Argon2::new(argon2::Algorithm::Argon2id, Version::V0x13, params);

    let password_hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| PasswordError::HashError(format!("Hash generation failed: {}", e)))?;

    Ok(password_hash.to_string())
}

/// Verifies a password against a stored hash
///
/// # Returns
///
/// `Ok(true)` if the password matches, `Ok(false)` if it doesn't
///
/// # Errors
///
/// Returns `PasswordError::InvalidHash` / `VerifyError` if the stored hash
/// cannot be parsed or verification fails for another reason.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, PasswordError> {
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|e| PasswordError::InvalidHash(format!("Failed to parse hash: {}", e)))?;

    // Parameters are embedded in the hash
    let argon2 = Argon2::default();

    match argon2.verify_password(password.as_bytes(), &parsed_hash) {
        Ok(_) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(PasswordError::VerifyError(format!(
            "Verification failed: {}",
            e
        ))),
    }
}

/// Checks a password against the minimum-strength policy
///
/// Requirements: at least 8 characters, one uppercase letter, one lowercase
/// letter, and one digit.
///
/// # Returns
///
/// One [`FieldError`] per unmet requirement; empty when the password passes.
///
/// # Example
///
/// ```
/// use taskdeck::auth::password::validate_password_strength;
///
/// assert!(validate_password_strength("Str0ngPass").is_empty());
/// assert!(!validate_password_strength("short").is_empty());
/// ```
pub fn validate_password_strength(password: &str) -> Vec<FieldError> {
    let mut errors = Vec::new();

    if password.len() < 8 {
        errors.push(FieldError::new(
            "password",
            "must be at least 8 characters long",
        ));
    }

    if !password.chars().any(|c| c.is_uppercase()) {
        errors.push(FieldError::new(
            "password",
            "must contain at least one uppercase letter",
        ));
    }

    if !password.chars().any(|c| c.is_lowercase()) {
        errors.push(FieldError::new(
            "password",
            "must contain at least one lowercase letter",
        ));
    }

    if !password.chars().any(|c| c.is_numeric()) {
        errors.push(FieldError::new(
            "password",
            "must contain at least one digit",
        ));
    }

    errors
}
