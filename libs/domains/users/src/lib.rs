//! Users Domain
//!
//! Accounts with email-OTP verification and JWT login.
//!
//! - Argon2 password hashing
//! - Six digit codes, stored as SHA-256 digests with a TTL
//! - OTP email through [`email::OtpMailer`]
//! - [`middleware::require_active_user`] to resolve token subjects
//!
//! # Usage
//!
//! ```rust,ignore
//! let users = MongoUserRepository::new(&db);
//! let otps = MongoOtpRepository::new(&db);
//! users.init_indexes().await?;
//! otps.init_indexes().await?;
//!
//! let service = UserService::new(users, otps, jwt, mailer, AuthConfig::from_env()?);
//! let auth_routes = handlers::router(service.clone());
//! ```

pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod mongodb;
pub mod otp;
pub mod repository;
pub mod service;

pub use self::mongodb::{MongoOtpRepository, MongoUserRepository};
pub use config::AuthConfig;
pub use error::{UserError, UserResult};
pub use handlers::ApiDoc;
pub use middleware::require_active_user;
pub use models::{
    AuthResponse, LoginRequest, MessageResponse, OtpVerification, RegisterRequest,
    RegisterResponse, ResendOtpRequest, Role, User, UserResponse, VerifyOtpRequest,
};
pub use repository::{
    InMemoryOtpRepository, InMemoryUserRepository, OtpRepository, UserRepository,
};
pub use service::UserService;
