//! Configuration for Sweets API

use axum_helpers::JwtConfig;
use core_config::{app_info, env_or_default, server::ServerConfig, AppInfo, FromEnv};
use database::mongodb::MongoConfig;
use domain_users::AuthConfig;
use email::SmtpConfig;

pub use core_config::Environment;

/// Application configuration
#[derive(Clone, Debug)]
pub struct Config {
    pub app: AppInfo,
    pub mongodb: MongoConfig,
    pub server: ServerConfig,
    pub environment: Environment,
    pub jwt: JwtConfig,
    pub auth: AuthConfig,
    /// `None` when `SMTP_HOST` is unset; mail is then logged, not sent
    pub smtp: Option<SmtpConfig>,
    /// Product name shown in OTP emails
    pub mail_app_name: String,
}

impl Config {
    pub fn from_env() -> eyre::Result<Self> {
        let environment = Environment::from_env();
        let mongodb = MongoConfig::from_env()?;
        let server = ServerConfig::from_env()?;
        let jwt = JwtConfig::from_env()?;
        let auth = AuthConfig::from_env()?;

        let smtp = match SmtpConfig::host_from_env() {
            Some(_) => Some(SmtpConfig::from_env()?),
            None if environment.is_production() => {
                eyre::bail!("SMTP_HOST must be set in production");
            }
            None => None,
        };

        Ok(Self {
            app: app_info!(),
            mongodb,
            server,
            environment,
            jwt,
            auth,
            smtp,
            mail_app_name: env_or_default("EMAIL_FROM_NAME", "Bloom Sweets"),
        })
    }
}
