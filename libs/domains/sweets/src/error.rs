use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use thiserror::Error;
use uuid::Uuid;

pub const MSG_SWEET_NOT_FOUND: &str = "Sweet not found";
pub const MSG_SWEET_EXISTS: &str = "Sweet already exists";
pub const MSG_NOT_ENOUGH_STOCK: &str = "Not enough stock";
pub const MSG_NOTHING_TO_UPDATE: &str = "No fields to update";

#[derive(Debug, Error)]
pub enum SweetError {
    #[error("Sweet not found: {0}")]
    NotFound(Uuid),

    #[error("Sweet with name '{0}' already exists")]
    DuplicateName(String),

    #[error("Insufficient stock: available {available}, requested {requested}")]
    InsufficientStock { available: i64, requested: i64 },

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type SweetResult<T> = Result<T, SweetError>;

impl From<SweetError> for AppError {
    fn from(err: SweetError) -> Self {
        match err {
            SweetError::NotFound(_) => AppError::NotFound(MSG_SWEET_NOT_FOUND.to_string()),
            SweetError::DuplicateName(_) => AppError::BadRequest(MSG_SWEET_EXISTS.to_string()),
            SweetError::InsufficientStock { .. } => {
                AppError::BadRequest(MSG_NOT_ENOUGH_STOCK.to_string())
            }
            SweetError::Validation(msg) => AppError::BadRequest(msg),
            SweetError::Database(msg) => AppError::InternalServerError(msg),
            SweetError::Internal(msg) => AppError::InternalServerError(msg),
        }
    }
}

impl IntoResponse for SweetError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}

impl From<mongodb::error::Error> for SweetError {
    fn from(err: mongodb::error::Error) -> Self {
        SweetError::Database(err.to_string())
    }
}
