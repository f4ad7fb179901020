//! JWT configuration loaded through `core_config::FromEnv`.

use core_config::{ConfigError, FromEnv, env_parse_or, env_required};

/// Minimum accepted length of the HS256 signing secret.
pub const MIN_SECRET_LEN: usize = 32;

/// Default token lifetime: 5 days.
pub const DEFAULT_EXPIRES_IN_SECS: i64 = 5 * 24 * 60 * 60;

/// JWT authentication configuration.
///
/// - `JWT_SECRET` (required): at least 32 characters
/// - `JWT_EXPIRES_IN_SECS`: token lifetime, defaults to 432000 (5 days)
#[derive(Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub expires_in_secs: i64,
}

impl std::fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"***")
            .field("expires_in_secs", &self.expires_in_secs)
            .finish()
    }
}

impl JwtConfig {
    /// Build a config with the default lifetime.
    pub fn new(secret: impl Into<String>) -> Result<Self, ConfigError> {
        let secret = secret.into();
        check_secret(&secret)?;
        Ok(Self {
            secret,
            expires_in_secs: DEFAULT_EXPIRES_IN_SECS,
        })
    }

    pub fn with_expires_in(mut self, secs: i64) -> Self {
        self.expires_in_secs = secs;
        self
    }
}

fn check_secret(secret: &str) -> Result<(), ConfigError> {
    if secret.len() < MIN_SECRET_LEN {
        return Err(ConfigError::ParseError {
            key: "JWT_SECRET".to_string(),
            details: format!(
                "must be at least {} characters (got {}). Generate one with: openssl rand -base64 32",
                MIN_SECRET_LEN,
                secret.len()
            ),
        });
    }
    Ok(())
}

impl FromEnv for JwtConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let secret = env_required("JWT_SECRET")?;
        check_secret(&secret)?;

        let expires_in_secs = env_parse_or("JWT_EXPIRES_IN_SECS", DEFAULT_EXPIRES_IN_SECS)?;
        if expires_in_secs <= 0 {
            return Err(ConfigError::ParseError {
                key: "JWT_EXPIRES_IN_SECS".to_string(),
                details: "must be positive".to_string(),
            });
        }

        Ok(Self {
            secret,
            expires_in_secs,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "this-is-a-valid-secret-with-32-chars!";

    #[test]
    fn test_jwt_config_new_valid() {
        let config = JwtConfig::new(SECRET).unwrap();
        assert_eq!(config.secret, SECRET);
        assert_eq!(config.expires_in_secs, 432_000);
    }

    #[test]
    fn test_jwt_config_new_too_short() {
        let err = JwtConfig::new("short").unwrap_err();
        assert!(err.to_string().contains("32 characters"));
    }

    #[test]
    fn test_jwt_config_from_env_valid() {
        temp_env::with_vars(
            [
                ("JWT_SECRET", Some(SECRET)),
                ("JWT_EXPIRES_IN_SECS", Some("3600")),
            ],
            || {
                let config = JwtConfig::from_env().unwrap();
                assert_eq!(config.secret, SECRET);
                assert_eq!(config.expires_in_secs, 3600);
            },
        );
    }

    #[test]
    fn test_jwt_config_from_env_missing() {
        temp_env::with_var_unset("JWT_SECRET", || {
            let err = JwtConfig::from_env().unwrap_err();
            assert!(err.to_string().contains("JWT_SECRET"));
        });
    }

    #[test]
    fn test_jwt_config_from_env_rejects_non_positive_ttl() {
        temp_env::with_vars(
            [
                ("JWT_SECRET", Some(SECRET)),
                ("JWT_EXPIRES_IN_SECS", Some("0")),
            ],
            || {
                assert!(JwtConfig::from_env().is_err());
            },
        );
    }
}
