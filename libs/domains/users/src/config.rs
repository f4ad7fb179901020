//! Registration and OTP settings.

use core_config::{ConfigError, FromEnv, env_flag, env_parse_or};

pub const DEFAULT_OTP_TTL_SECS: u64 = 3600;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthConfig {
    /// Lifetime of an issued OTP code
    pub otp_ttl_secs: u64,
    /// Whether `role: admin` is accepted on self-registration
    pub allow_admin_registration: bool,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            otp_ttl_secs: DEFAULT_OTP_TTL_SECS,
            allow_admin_registration: false,
        }
    }
}

impl FromEnv for AuthConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let otp_ttl_secs = env_parse_or("OTP_TTL_SECS", DEFAULT_OTP_TTL_SECS)?;
        if otp_ttl_secs == 0 {
            return Err(ConfigError::ParseError {
                key: "OTP_TTL_SECS".to_string(),
                details: "must be greater than zero".to_string(),
            });
        }

        Ok(Self {
            otp_ttl_secs,
            allow_admin_registration: env_flag("AUTH_ALLOW_ADMIN_REGISTRATION", false)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        temp_env::with_vars_unset(["OTP_TTL_SECS", "AUTH_ALLOW_ADMIN_REGISTRATION"], || {
            assert_eq!(AuthConfig::from_env().unwrap(), AuthConfig::default());
        });
    }

    #[test]
    fn test_custom_values() {
        temp_env::with_vars(
            [
                ("OTP_TTL_SECS", Some("600")),
                ("AUTH_ALLOW_ADMIN_REGISTRATION", Some("true")),
            ],
            || {
                let config = AuthConfig::from_env().unwrap();
                assert_eq!(config.otp_ttl_secs, 600);
                assert!(config.allow_admin_registration);
            },
        );
    }

    #[test]
    fn test_zero_ttl_rejected() {
        temp_env::with_var("OTP_TTL_SECS", Some("0"), || {
            assert!(AuthConfig::from_env().is_err());
        });
    }
}
