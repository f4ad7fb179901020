//! Transactional email for the sweets shop.
//!
//! ## Components
//!
//! - **Models**: `Email`, `EmailPriority`
//! - **Providers**: `SmtpProvider` (lettre), `LogEmailProvider` for development and
//!   `MockEmailProvider` for tests, behind the `EmailProvider` trait
//! - **Templates**: Handlebars `TemplateEngine` with the `otp_verification` template
//! - **OTP delivery**: `OtpMailer` renders and sends verification codes
//!
//! ```ignore
//! use email::{OtpMailer, SmtpConfig, SmtpProvider, TemplateEngine};
//! use core_config::FromEnv;
//!
//! let provider = SmtpProvider::new(SmtpConfig::from_env()?)?;
//! let mailer = OtpMailer::new(Arc::new(provider), Arc::new(TemplateEngine::new()?), "Bloom Sweets");
//! mailer.send_otp("ada@example.com", "493027", 3600).await?;
//! ```

pub mod error;
pub mod models;
pub mod otp;
pub mod provider;
pub mod templates;

pub use error::{NotificationError, NotificationResult};
pub use models::{Email, EmailPriority};
pub use otp::{OTP_TEMPLATE, OtpMailer};
pub use provider::{
    EmailProvider, LogEmailProvider, MockEmailProvider, SendResult, SmtpConfig, SmtpProvider,
};
pub use templates::{EmailTemplate, RenderedTemplate, TemplateEngine};
