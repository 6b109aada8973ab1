/// Registration, login, and principal resolution
///
/// `AuthService` is the single choke point between credentials and the
/// store: no store operation runs without a principal resolved here first.
/// Unknown identities and wrong passwords produce the same error, so the
/// login path cannot be used to enumerate accounts.

use chrono::Duration;
use serde::Deserialize;
use std::sync::Arc;
use validator::Validate;

use super::jwt::{self, Claims};
use super::password;
use crate::clock::Clock;
use crate::config::JwtConfig;
use crate::error::{Error, FieldError, Result};
use crate::models::User;
use crate::store::Store;

/// Registration request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RegisterInput {
    /// Desired username, unique exact-match
    #[validate(length(min = 3, max = 64, message = "must be 3 to 64 characters"))]
    pub username: String,

    /// Email address, unique case-insensitively
    #[validate(email(message = "must be a valid email address"))]
    pub email: String,

    /// Raw password; hashed immediately, never stored or logged
    pub password: String,
}

/// Authentication and principal-resolution service
pub struct AuthService {
    store: Arc<Store>,
    jwt: JwtConfig,
    clock: Arc<dyn Clock>,
}

impl AuthService {
    /// Creates a service over the given store
    pub fn new(store: Arc<Store>, jwt: JwtConfig, clock: Arc<dyn Clock>) -> Self {
        Self { store, jwt, clock }
    }

    /// Registers a new account and issues a session token
    ///
    /// Field validation, the password policy, and uniqueness all surface as
    /// one `Error::Validation` with per-field detail. Only the Argon2id
    /// hash of the password is stored.
    pub async fn register(&self, input: RegisterInput) -> Result<(User, String)> {
        // Validate the values that will actually be stored; otherwise
        // padding lets a too-short identity slip past the length check.
        let input = RegisterInput {
            username: input.username.trim().to_string(),
            email: input.email.trim().to_string(),
            password: input.password,
        };

        let mut errors = match input.validate() {
            Ok(()) => Vec::new(),
            Err(errors) => collect_field_errors(errors),
        };
        errors.extend(password::validate_password_strength(&input.password));
        if !errors.is_empty() {
            return Err(Error::Validation(errors));
        }

        let hash =
            password::hash_password(&input.password).map_err(|e| Error::Internal(e.to_string()))?;

        let user = self
            .store
            .insert_user(&input.username, &input.email, hash)
            .await?;
        let token = self.issue_token(&user)?;

        tracing::info!(user_id = %user.id, username = %user.username, "registered account");
        Ok((user, token))
    }

    /// Verifies a credential and issues a session token
    ///
    /// `identity` matches the username exactly or the email
    /// case-insensitively.
    ///
    /// # Errors
    ///
    /// `Error::Authentication` on an unknown identity or a wrong password;
    /// the two are indistinguishable.
    pub async fn authenticate(&self, identity: &str, password: &str) -> Result<String> {
        let user = self
            .store
            .find_user_by_identity(identity.trim())
            .await
            .ok_or_else(invalid_credentials)?;

        let verified = password::verify_password(password, &user.password_hash)
            .map_err(|e| Error::Internal(e.to_string()))?;
        if !verified {
            return Err(invalid_credentials());
        }

        tracing::info!(user_id = %user.id, "authenticated");
        self.issue_token(&user)
    }

    /// Resolves a session token to its user
    ///
    /// # Errors
    ///
    /// `Error::Authentication` when the token is missing, malformed,
    /// expired, signed with an unexpected key, or names a deleted user.
    pub async fn resolve_principal(&self, token: &str) -> Result<User> {
        let token = token.trim();
        if token.is_empty() {
            return Err(Error::Authentication("missing token".to_string()));
        }

        let claims = jwt::validate_token(token, &self.jwt.secret)
            .map_err(|e| Error::Authentication(e.to_string()))?;

        self.store
            .find_user(claims.sub)
            .await
            .ok_or_else(|| Error::Authentication("unknown principal".to_string()))
    }

    fn issue_token(&self, user: &User) -> Result<String> {
        let claims = Claims::new(
            user.id,
            &user.username,
            self.clock.now(),
            Duration::hours(self.jwt.token_ttl_hours),
        );
        jwt::create_token(&claims, &self.jwt.secret).map_err(|e| Error::Internal(e.to_string()))
    }
}

fn invalid_credentials() -> Error {
    Error::Authentication("invalid username or password".to_string())
}

fn collect_field_errors(errors: validator::ValidationErrors) -> Vec<FieldError> {
    errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, errors)| {
            errors.iter().map(move |e| {
                let message = e
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| e.code.to_string());
                FieldError::new(field.to_string(), message)
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::SystemClock;
    use crate::config::Config;

    fn service() -> AuthService {
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let store = Arc::new(Store::new(clock.clone()));
        AuthService::new(store, Config::default().jwt, clock)
    }

    fn input(username: &str) -> RegisterInput {
        RegisterInput {
            username: username.to_string(),
            email: format!("{}@example.com", username),
            password: "Sup3rSecret".to_string(),
        }
    }

    #[tokio::test]
    async fn test_register_then_authenticate() {
        let service = service();

        let (user, token) = service.register(input("alice")).await.unwrap();
        assert_eq!(user.username, "alice");
        assert_ne!(user.password_hash, "Sup3rSecret");

        // The registration token already resolves.
        let principal = service.resolve_principal(&token).await.unwrap();
        assert_eq!(principal.id, user.id);

        // Username and email both work as the login identity.
        let token = service.authenticate("alice", "Sup3rSecret").await.unwrap();
        assert_eq!(service.resolve_principal(&token).await.unwrap().id, user.id);

        let token = service
            .authenticate("ALICE@example.com", "Sup3rSecret")
            .await
            .unwrap();
        assert_eq!(service.resolve_principal(&token).await.unwrap().id, user.id);
    }

    #[tokio::test]
    async fn test_register_rejects_weak_password() {
        let service = service();

        let mut weak = input("alice");
        weak.password = "short".to_string();

        let err = service.register(weak).await.unwrap_err();
        assert!(err.touches_field("password"));
    }

    #[tokio::test]
    async fn test_register_rejects_bad_email_and_short_username() {
        let service = service();

        let bad = RegisterInput {
            username: "al".to_string(),
            email: "not-an-email".to_string(),
            password: "Sup3rSecret".to_string(),
        };

        let err = service.register(bad).await.unwrap_err();
        assert!(err.touches_field("username"));
        assert!(err.touches_field("email"));
    }

    #[tokio::test]
    async fn test_register_validates_trimmed_username() {
        let service = service();

        // Padding must not carry a too-short name past the length check.
        let mut padded = input("alice");
        padded.username = "  a ".to_string();
        let err = service.register(padded).await.unwrap_err();
        assert!(err.touches_field("username"));

        // Surrounding whitespace is not part of the identity.
        let mut ok = input("bob");
        ok.username = "  bob  ".to_string();
        let (user, _) = service.register(ok).await.unwrap();
        assert_eq!(user.username, "bob");
    }

    #[tokio::test]
    async fn test_register_rejects_duplicates() {
        let service = service();
        service.register(input("alice")).await.unwrap();

        let err = service.register(input("alice")).await.unwrap_err();
        assert!(err.touches_field("username"));
    }

    #[tokio::test]
    async fn test_unknown_user_and_wrong_password_look_alike() {
        let service = service();
        service.register(input("alice")).await.unwrap();

        let unknown = service
            .authenticate("nobody", "Sup3rSecret")
            .await
            .unwrap_err();
        let wrong = service.authenticate("alice", "WrongPass1").await.unwrap_err();

        assert_eq!(unknown.to_string(), wrong.to_string());
    }

    #[tokio::test]
    async fn test_resolve_rejects_garbage_tokens() {
        let service = service();

        assert!(matches!(
            service.resolve_principal("").await,
            Err(Error::Authentication(_))
        ));
        assert!(matches!(
            service.resolve_principal("not.a.token").await,
            Err(Error::Authentication(_))
        ));
    }

    #[tokio::test]
    async fn test_resolve_rejects_foreign_signature() {
        let service = service();
        let (user, _) = service.register(input("alice")).await.unwrap();

        // Token for the same user but signed with a different secret.
        let claims = Claims::new(user.id, &user.username, chrono::Utc::now(), Duration::days(1));
        let forged = jwt::create_token(&claims, "attacker-controlled-signing-key!!").unwrap();

        assert!(matches!(
            service.resolve_principal(&forged).await,
            Err(Error::Authentication(_))
        ));
    }
}
