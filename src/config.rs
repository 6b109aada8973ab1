/// Configuration management
///
/// This module loads configuration from environment variables and provides
/// a type-safe configuration struct.
///
/// # Environment Variables
///
/// - `TASKDECK_JWT_SECRET`: Secret key for token signing (required, >= 32 bytes)
/// - `TASKDECK_TOKEN_TTL_HOURS`: Session token lifetime (default: 168 = 7 days)
/// - `TASKDECK_OP_TIMEOUT_MS`: Optional per-operation deadline in milliseconds
///
/// # Example
///
/// ```no_run
/// use taskdeck::config::Config;
///
/// # fn example() -> Result<(), taskdeck::config::ConfigError> {
/// let config = Config::from_env()?;
/// println!("tokens live for {} hours", config.jwt.token_ttl_hours);
/// # Ok(())
/// # }
/// ```

use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

/// Error type for configuration loading
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A required environment variable is not set
    #[error("{0} environment variable is required")]
    MissingVar(&'static str),

    /// An environment variable has an unusable value
    #[error("invalid value for {0}: {1}")]
    InvalidVar(&'static str, String),
}

/// Complete domain-core configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Token signing configuration
    pub jwt: JwtConfig,

    /// Optional deadline applied to each store-touching operation
    ///
    /// `None` means operations are unbounded.
    pub op_timeout: Option<Duration>,
}

/// JWT configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtConfig {
    /// Secret key for token signing
    ///
    /// IMPORTANT: This must be kept secret and should be at least 32 bytes.
    /// Generate with: `openssl rand -hex 32`
    pub secret: String,

    /// Session token lifetime in hours
    pub token_ttl_hours: i64,
}

impl Config {
    /// Loads configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if `TASKDECK_JWT_SECRET` is missing or shorter than
    /// 32 bytes, or if a numeric variable does not parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (for development)
        dotenvy::dotenv().ok();

        let secret = env::var("TASKDECK_JWT_SECRET")
            .map_err(|_| ConfigError::MissingVar("TASKDECK_JWT_SECRET"))?;

        if secret.len() < 32 {
            return Err(ConfigError::InvalidVar(
                "TASKDECK_JWT_SECRET",
                "must be at least 32 bytes".to_string(),
            ));
        }

        let token_ttl_hours = env::var("TASKDECK_TOKEN_TTL_HOURS")
            .unwrap_or_else(|_| "168".to_string())
            .parse::<i64>()
            .map_err(|e| ConfigError::InvalidVar("TASKDECK_TOKEN_TTL_HOURS", e.to_string()))?;

        let op_timeout = match env::var("TASKDECK_OP_TIMEOUT_MS") {
            Ok(raw) => {
                let ms = raw
                    .parse::<u64>()
                    .map_err(|e| ConfigError::InvalidVar("TASKDECK_OP_TIMEOUT_MS", e.to_string()))?;
                Some(Duration::from_millis(ms))
            }
            Err(_) => None,
        };

        Ok(Self {
            jwt: JwtConfig {
                secret,
                token_ttl_hours,
            },
            op_timeout,
        })
    }
}

impl Default for Config {
    /// Configuration suitable for tests and local experiments
    fn default() -> Self {
        Self {
            jwt: JwtConfig {
                secret: "taskdeck-development-secret-0123456789abcdef".to_string(),
                token_ttl_hours: 168,
            },
            op_timeout: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.jwt.secret.len() >= 32);
        assert_eq!(config.jwt.token_ttl_hours, 168);
        assert!(config.op_timeout.is_none());
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::MissingVar("TASKDECK_JWT_SECRET");
        assert_eq!(
            err.to_string(),
            "TASKDECK_JWT_SECRET environment variable is required"
        );
    }
}
