//! Stateless JWT authentication and role checks.
//!
//! ```ignore
//! use axum_helpers::auth::{JwtAuth, JwtConfig, jwt_auth_middleware, require_role};
//! use core_config::FromEnv;
//!
//! let auth = JwtAuth::new(&JwtConfig::from_env()?);
//!
//! let admin = Router::new()
//!     .route("/", post(create))
//!     .route_layer(axum::middleware::from_fn_with_state("admin", require_role))
//!     .route_layer(axum::middleware::from_fn_with_state(auth, jwt_auth_middleware));
//! ```

pub mod config;
pub mod jwt;
pub mod middleware;

pub use config::JwtConfig;
pub use jwt::{JwtAuth, JwtClaims, TokenSubject};
pub use middleware::{jwt_auth_middleware, require_role};
