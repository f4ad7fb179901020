//! Type-safe error codes for API responses.
//!
//! Each code has three faces:
//! - a string identifier for clients (e.g. `"VALIDATION_ERROR"`)
//! - an integer for logs and dashboards (e.g. `1001`)
//! - a default human-readable message
//!
//! ```rust
//! use axum_helpers::errors::ErrorCode;
//!
//! let code = ErrorCode::ValidationError;
//! assert_eq!(code.as_str(), "VALIDATION_ERROR");
//! assert_eq!(code.code(), 1001);
//! ```

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Standardized error codes for API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Client errors (1000-1999)
    /// Request validation failed
    ValidationError,

    /// Invalid UUID format in path parameter
    InvalidUuid,

    /// Request body could not be read as JSON
    InvalidJson,

    /// Generic bad request raised by a handler or service
    BadRequest,

    /// Requested resource was not found
    NotFound,

    /// Authentication credentials are missing or invalid
    Unauthorized,

    /// Authenticated user lacks sufficient permissions
    Forbidden,

    /// Request conflicts with current resource state
    Conflict,

    /// HTTP method not supported on this route
    MethodNotAllowed,

    // Server errors (1500s)
    /// An unexpected internal server error occurred
    InternalError,

    /// Service is temporarily unavailable
    ServiceUnavailable,

    // Database errors (2000s)
    /// MongoDB driver or server error
    DatabaseError,

    /// BSON (de)serialization failed
    DatabaseSerialization,

    // Serialization errors (5000s)
    /// JSON serialization/deserialization error
    SerdeJsonError,
}

impl ErrorCode {
    /// String identifier for client consumption.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ValidationError => "VALIDATION_ERROR",
            Self::InvalidUuid => "INVALID_UUID",
            Self::InvalidJson => "INVALID_JSON",
            Self::BadRequest => "BAD_REQUEST",
            Self::NotFound => "NOT_FOUND",
            Self::Unauthorized => "UNAUTHORIZED",
            Self::Forbidden => "FORBIDDEN",
            Self::Conflict => "CONFLICT",
            Self::MethodNotAllowed => "METHOD_NOT_ALLOWED",
            Self::InternalError => "INTERNAL_ERROR",
            Self::ServiceUnavailable => "SERVICE_UNAVAILABLE",
            Self::DatabaseError => "DATABASE_ERROR",
            Self::DatabaseSerialization => "DATABASE_SERIALIZATION",
            Self::SerdeJsonError => "SERDE_JSON_ERROR",
        }
    }

    /// Integer code used in structured logs.
    ///
    /// - 1000-1499: client errors
    /// - 1500-1999: server errors
    /// - 2000-2999: database errors
    /// - 5000-5999: serialization errors
    pub fn code(&self) -> i32 {
        match self {
            Self::ValidationError => 1001,
            Self::InvalidUuid => 1002,
            Self::InvalidJson => 1003,
            Self::NotFound => 1004,
            Self::BadRequest => 1005,
            Self::Unauthorized => 1006,
            Self::Forbidden => 1007,
            Self::Conflict => 1008,
            Self::MethodNotAllowed => 1009,

            Self::InternalError => 1500,
            Self::ServiceUnavailable => 1503,

            Self::DatabaseError => 2001,
            Self::DatabaseSerialization => 2002,

            Self::SerdeJsonError => 5001,
        }
    }

    /// Default user-facing message. Handlers usually override it.
    pub fn default_message(&self) -> &'static str {
        match self {
            Self::ValidationError => "Request validation failed",
            Self::InvalidUuid => "Invalid UUID format",
            Self::InvalidJson => "Invalid JSON body",
            Self::BadRequest => "Bad request",
            Self::NotFound => "Resource not found",
            Self::Unauthorized => "Authentication required",
            Self::Forbidden => "Access forbidden",
            Self::Conflict => "Resource already exists",
            Self::MethodNotAllowed => "The HTTP method is not allowed for this resource",
            Self::InternalError
            | Self::DatabaseError
            | Self::DatabaseSerialization
            | Self::SerdeJsonError => GENERIC_INTERNAL_MESSAGE,
            Self::ServiceUnavailable => "Service is temporarily unavailable",
        }
    }

    /// Whether the failure is on the server side and must not leak details.
    pub fn is_internal(&self) -> bool {
        matches!(
            self,
            Self::InternalError
                | Self::DatabaseError
                | Self::DatabaseSerialization
                | Self::SerdeJsonError
        )
    }
}

/// Message returned for every internal failure.
pub const GENERIC_INTERNAL_MESSAGE: &str = "An unexpected error occurred";

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
