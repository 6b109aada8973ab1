/// Session token generation and validation
///
/// Session tokens are JWTs signed with HS256 (HMAC-SHA256). A token binds a
/// user's identity and an expiry; it carries enough identity to resolve the
/// principal without a store round trip, and it cannot be forged without the
/// signing secret.
///
/// # Security
///
/// - **Algorithm**: HS256 (HMAC with SHA-256)
/// - **Validation**: Signature, expiration, not-before, and issuer checks
/// - **Secret Management**: Secrets should be at least 32 bytes (256 bits)
///
/// # Example
///
/// ```
/// use taskdeck::auth::jwt::{create_token, validate_token, Claims};
/// use chrono::{Duration, Utc};
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let user_id = Uuid::new_v4();
/// let claims = Claims::new(user_id, "alice", Utc::now(), Duration::days(7));
/// let secret = "your-secret-key-at-least-32-bytes!!";
///
/// let token = create_token(&claims, secret)?;
/// let validated = validate_token(&token, secret)?;
/// assert_eq!(validated.sub, user_id);
/// assert_eq!(validated.username, "alice");
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Issuer claim stamped into every token
pub const ISSUER: &str = "taskdeck";

/// Error type for token operations
#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    /// Failed to create token
    #[error("Failed to create token: {0}")]
    CreateError(String),

    /// Token failed validation (bad signature, issuer, or format)
    #[error("Invalid token: {0}")]
    Invalid(String),

    /// Token has expired
    #[error("Token has expired")]
    Expired,
}

/// Session token claims
///
/// # Standard Claims
///
/// - `sub`: Subject (user ID)
/// - `iss`: Issuer (always "taskdeck")
/// - `iat` / `exp` / `nbf`: Issued-at, expiry, not-before timestamps
///
/// # Custom Claims
///
/// - `username`: Display identity, so callers can label the principal
///   without a store lookup
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject - User ID
    pub sub: Uuid,

    /// Username at issue time
    pub username: String,

    /// Issuer - Always "taskdeck"
    pub iss: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,

    /// Not before (Unix timestamp)
    pub nbf: i64,
}

impl Claims {
    /// Creates claims for a user, valid from `issued_at` for `ttl`
    pub fn new(user_id: Uuid, username: &str, issued_at: DateTime<Utc>, ttl: Duration) -> Self {
        let expiration = issued_at + ttl;

        Self {
            sub: user_id,
            username: username.to_string(),
            iss: ISSUER.to_string(),
            iat: issued_at.timestamp(),
            exp: expiration.timestamp(),
            nbf: issued_at.timestamp(),
        }
    }

    /// Checks if the token has expired as of `now`
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now.timestamp() >= self.exp
    }
}

/// Creates a signed token from claims
///
/// # Errors
///
/// Returns `JwtError::CreateError` if encoding fails
pub fn create_token(claims: &Claims, secret: &str) -> Result<String, JwtError> {
    let header = Header::new(Algorithm::HS256);
    let key = EncodingKey::from_secret(secret.as_bytes());

    encode(&header, claims, &key)
        .map_err(|e| JwtError::CreateError(format!("Token encoding failed: {}", e)))
}

/// Validates a token and extracts its claims
///
/// Verifies the signature, expiry, not-before time, and issuer.
///
/// # Errors
///
/// - `JwtError::Expired` once the expiry has passed
/// - `JwtError::Invalid` for a bad signature, wrong issuer, or garbage input
pub fn validate_token(token: &str, secret: &str) -> Result<Claims, JwtError> {
    let key = DecodingKey::from_secret(secret.as_bytes());

    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[ISSUER]);
    validation.validate_exp = true;
    validation.validate_nbf = true;

    let token_data = decode::<Claims>(token, &key, &validation).map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtError::Expired,
        _ => JwtError::Invalid(format!("Token validation failed: {}", e)),
    })?;

    Ok(token_data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-key-at-least-32-bytes-long";

    #[test]
    fn test_claims_creation() {
        let user_id = Uuid::new_v4();
        let now = Utc::now();
        let claims = Claims::new(user_id, "alice", now, Duration::days(7));

        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.username, "alice");
        assert_eq!(claims.iss, ISSUER);
        assert_eq!(claims.exp - claims.iat, 7 * 24 * 3600);
        assert!(!claims.is_expired(now));
        assert!(claims.is_expired(now + Duration::days(8)));
    }

    #[test]
    fn test_create_and_validate_token() {
        let user_id = Uuid::new_v4();
        let claims = Claims::new(user_id, "bob", Utc::now(), Duration::hours(1));
        let token = create_token(&claims, SECRET).expect("Should create token");

        let validated = validate_token(&token, SECRET).expect("Should validate token");
        assert_eq!(validated.sub, user_id);
        assert_eq!(validated.username, "bob");
        assert_eq!(validated.iss, ISSUER);
    }

    #[test]
    fn test_validate_with_wrong_secret() {
        let claims = Claims::new(Uuid::new_v4(), "eve", Utc::now(), Duration::hours(1));
        let token = create_token(&claims, SECRET).expect("Should create token");

        assert!(validate_token(&token, "a-completely-different-signing-key").is_err());
    }

    #[test]
    fn test_validate_expired_token() {
        // Issued two days ago with a one-day ttl, well outside leeway
        let issued = Utc::now() - Duration::days(2);
        let claims = Claims::new(Uuid::new_v4(), "old", issued, Duration::days(1));
        let token = create_token(&claims, SECRET).expect("Should create token");

        let result = validate_token(&token, SECRET);
        assert!(matches!(result, Err(JwtError::Expired)));
    }

    #[test]
    fn test_validate_garbage_token() {
        assert!(matches!(
            validate_token("not-a-token", SECRET),
            Err(JwtError::Invalid(_))
        ));
        assert!(matches!(
            validate_token("", SECRET),
            Err(JwtError::Invalid(_))
        ));
    }

    #[test]
    fn test_wrong_issuer_rejected() {
        // Token signed with our key but a foreign issuer claim
        let mut claims = Claims::new(Uuid::new_v4(), "mallory", Utc::now(), Duration::hours(1));
        claims.iss = "someone-else".to_string();
        let token = create_token(&claims, SECRET).expect("Should create token");

        assert!(validate_token(&token, SECRET).is_err());
    }
}
