//! SMTP email provider using lettre

use super::{EmailProvider, SendResult};
use crate::models::Email;
use async_trait::async_trait;
use core_config::{env_flag, env_parse_or, env_required, ConfigError, FromEnv};
use eyre::{Result, WrapErr};
use lettre::{
    message::{header::ContentType, Mailbox, MultiPart, SinglePart},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use std::sync::Arc;

/// SMTP relay settings.
#[derive(Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub from_email: String,
    pub from_name: String,
    /// STARTTLS/implicit TLS via `relay`. Off for local catchers like Mailpit.
    pub use_tls: bool,
}

impl std::fmt::Debug for SmtpConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"***")
            .field("from_email", &self.from_email)
            .field("from_name", &self.from_name)
            .field("use_tls", &self.use_tls)
            .finish()
    }
}

impl SmtpConfig {
    /// Local Mailpit/Mailhog on `localhost:1025`, no auth.
    pub fn local() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 1025,
            username: String::new(),
            password: String::new(),
            from_email: "noreply@localhost".to_string(),
            from_name: "Bloom Sweets".to_string(),
            use_tls: false,
        }
    }

    /// `SMTP_HOST` if set. Used to decide between SMTP and the logging mock.
    pub fn host_from_env() -> Option<String> {
        std::env::var("SMTP_HOST")
            .ok()
            .filter(|h| !h.trim().is_empty())
    }
}

/// Environment variables:
/// - `SMTP_HOST` (required), `SMTP_PORT` (default 587)
/// - `SMTP_USERNAME`, `SMTP_PASSWORD` (default empty)
/// - `SMTP_USE_TLS` (default true)
/// - `EMAIL_FROM_ADDRESS` (required), `EMAIL_FROM_NAME` (default "Bloom Sweets")
impl FromEnv for SmtpConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            host: env_required("SMTP_HOST")?,
            port: env_parse_or("SMTP_PORT", 587u16)?,
            username: std::env::var("SMTP_USERNAME").unwrap_or_default(),
            password: std::env::var("SMTP_PASSWORD").unwrap_or_default(),
            from_email: env_required("EMAIL_FROM_ADDRESS")?,
            from_name: std::env::var("EMAIL_FROM_NAME")
                .unwrap_or_else(|_| "Bloom Sweets".to_string()),
            use_tls: env_flag("SMTP_USE_TLS", true)?,
        })
    }
}

/// SMTP email provider
pub struct SmtpProvider {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    config: Arc<SmtpConfig>,
}

impl SmtpProvider {
    pub fn new(config: SmtpConfig) -> Result<Self> {
        let builder = if config.use_tls {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)
                .wrap_err("Failed to create SMTP relay")?
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.host)
        };

        let builder = if config.username.is_empty() {
            builder
        } else {
            builder.credentials(Credentials::new(
                config.username.clone(),
                config.password.clone(),
            ))
        };

        let transport = builder.port(config.port).build();

        tracing::info!(host = %config.host, port = config.port, tls = config.use_tls, "SMTP provider configured");
        Ok(Self {
            transport,
            config: Arc::new(config),
        })
    }

    fn build_message(&self, email: &Email) -> Result<Message> {
        let from: Mailbox = format!("{} <{}>", self.config.from_name, self.config.from_email)
            .parse()
            .wrap_err("Invalid from address")?;

        let to: Mailbox = email.to.parse().wrap_err("Invalid to address")?;

        let mut builder = Message::builder().from(from).to(to).subject(&email.subject);

        if let Some(reply_to) = &email.reply_to {
            let mailbox: Mailbox = reply_to.parse().wrap_err("Invalid reply-to address")?;
            builder = builder.reply_to(mailbox);
        }

        let message = match (&email.body_text, &email.body_html) {
            (Some(text), Some(html)) => builder
                .multipart(
                    MultiPart::alternative()
                        .singlepart(
                            SinglePart::builder()
                                .header(ContentType::TEXT_PLAIN)
                                .body(text.clone()),
                        )
                        .singlepart(
                            SinglePart::builder()
                                .header(ContentType::TEXT_HTML)
                                .body(html.clone()),
                        ),
                )
                .wrap_err("Failed to build multipart message")?,
            (Some(text), None) => builder
                .header(ContentType::TEXT_PLAIN)
                .body(text.clone())
                .wrap_err("Failed to build text message")?,
            (None, Some(html)) => builder
                .header(ContentType::TEXT_HTML)
                .body(html.clone())
                .wrap_err("Failed to build HTML message")?,
            (None, None) => {
                return Err(eyre::eyre!("Email must have either text or HTML body"));
            }
        };

        Ok(message)
    }
}

#[async_trait]
impl EmailProvider for SmtpProvider {
    async fn send(&self, email: &Email) -> Result<SendResult> {
        let message = self.build_message(email)?;

        let response = self
            .transport
            .send(message)
            .await
            .wrap_err("Failed to send email via SMTP")?;

        let message_id = response
            .message()
            .next()
            .map(|s| s.to_string())
            .unwrap_or_else(|| email.id.clone());

        tracing::info!(
            email_id = %email.id,
            to = %email.to,
            subject = %email.subject,
            "Email sent"
        );

        Ok(SendResult { message_id })
    }

    async fn health_check(&self) -> Result<()> {
        let ok = self
            .transport
            .test_connection()
            .await
            .wrap_err("SMTP health check failed")?;
        if !ok {
            return Err(eyre::eyre!("SMTP server rejected NOOP"));
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "smtp"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider() -> SmtpProvider {
        SmtpProvider::new(SmtpConfig::local()).unwrap()
    }

    #[test]
    fn test_build_multipart_message() {
        let email = Email::new("ada@example.com", "Your OTP Code")
            .with_text("Code: 123456")
            .with_html("<p>123456</p>");
        let message = provider().build_message(&email).unwrap();
        let raw = String::from_utf8(message.formatted()).unwrap();
        assert!(raw.contains("Subject: Your OTP Code"));
        assert!(raw.contains("multipart/alternative"));
    }

    #[test]
    fn test_build_message_requires_body() {
        let email = Email::new("ada@example.com", "Empty");
        assert!(provider().build_message(&email).is_err());
    }

    #[test]
    fn test_build_message_rejects_bad_recipient() {
        let email = Email::new("not an address", "Hi").with_text("x");
        assert!(provider().build_message(&email).is_err());
    }

    #[test]
    fn test_smtp_config_from_env() {
        temp_env::with_vars(
            [
                ("SMTP_HOST", Some("smtp.example.com")),
                ("SMTP_PORT", Some("2525")),
                ("SMTP_USE_TLS", Some("false")),
                ("EMAIL_FROM_ADDRESS", Some("shop@example.com")),
                ("EMAIL_FROM_NAME", None),
            ],
            || {
                let config = SmtpConfig::from_env().unwrap();
                assert_eq!(config.host, "smtp.example.com");
                assert_eq!(config.port, 2525);
                assert!(!config.use_tls);
                assert_eq!(config.from_name, "Bloom Sweets");
            },
        );
    }

    #[test]
    fn test_smtp_config_requires_host() {
        temp_env::with_var_unset("SMTP_HOST", || {
            assert!(SmtpConfig::from_env().is_err());
            assert!(SmtpConfig::host_from_env().is_none());
        });
    }

    #[test]
    fn test_debug_hides_password() {
        let mut config = SmtpConfig::local();
        config.password = "s3cret".into();
        assert!(!format!("{:?}", config).contains("s3cret"));
    }
}
