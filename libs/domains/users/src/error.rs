use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_helpers::{AppError, ErrorCode, ErrorResponse};
use thiserror::Error;
use uuid::Uuid;

pub const MSG_USER_NOT_FOUND: &str = "User not found";
pub const MSG_USER_EXISTS: &str = "User already exists";
pub const MSG_ADMIN_REGISTRATION_DISABLED: &str = "Admin registration is disabled";
pub const MSG_INVALID_CREDENTIALS: &str = "Invalid email or password";
pub const MSG_ALREADY_VERIFIED: &str = "User is already verified";
pub const MSG_OTP_NOT_FOUND: &str = "OTP not found or expired. Please request a new OTP.";
pub const MSG_OTP_EXPIRED: &str = "OTP has expired. Please request a new OTP.";
pub const MSG_INVALID_OTP: &str = "Invalid OTP. Please try again.";
pub const MSG_EMAIL_MISMATCH: &str = "Email does not match this account";
pub const MSG_EMAIL_DELIVERY: &str = "Error sending OTP email";

#[derive(Debug, Error)]
pub enum UserError {
    #[error("User not found: {0}")]
    NotFound(Uuid),

    #[error("User with email '{0}' already exists")]
    DuplicateEmail(String),

    #[error("Admin self-registration is disabled")]
    AdminRegistrationDisabled,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("User already verified")]
    AlreadyVerified,

    #[error("No OTP on record")]
    OtpNotFound,

    #[error("OTP expired")]
    OtpExpired,

    #[error("OTP mismatch")]
    InvalidOtp,

    #[error("Email does not match the account")]
    EmailMismatch,

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Email delivery failed: {0}")]
    EmailDelivery(String),

    #[error("Password hashing error: {0}")]
    PasswordHash(String),

    #[error("Token error: {0}")]
    Token(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type UserResult<T> = Result<T, UserError>;

impl From<UserError> for AppError {
    fn from(err: UserError) -> Self {
        match err {
            UserError::NotFound(_) => AppError::NotFound(MSG_USER_NOT_FOUND.to_string()),
            UserError::DuplicateEmail(_) => AppError::BadRequest(MSG_USER_EXISTS.to_string()),
            UserError::AdminRegistrationDisabled => {
                AppError::Forbidden(MSG_ADMIN_REGISTRATION_DISABLED.to_string())
            }
            UserError::InvalidCredentials => {
                AppError::Unauthorized(MSG_INVALID_CREDENTIALS.to_string())
            }
            UserError::AlreadyVerified => AppError::BadRequest(MSG_ALREADY_VERIFIED.to_string()),
            UserError::OtpNotFound => AppError::BadRequest(MSG_OTP_NOT_FOUND.to_string()),
            UserError::OtpExpired => AppError::BadRequest(MSG_OTP_EXPIRED.to_string()),
            UserError::InvalidOtp => AppError::BadRequest(MSG_INVALID_OTP.to_string()),
            UserError::EmailMismatch => AppError::BadRequest(MSG_EMAIL_MISMATCH.to_string()),
            UserError::Validation(msg) => AppError::BadRequest(msg),
            UserError::EmailDelivery(msg)
            | UserError::PasswordHash(msg)
            | UserError::Token(msg)
            | UserError::Database(msg)
            | UserError::Internal(msg) => AppError::InternalServerError(msg),
        }
    }
}

impl IntoResponse for UserError {
    fn into_response(self) -> Response {
        // Delivery failures carry their own message, not the generic internal one.
        if let UserError::EmailDelivery(cause) = &self {
            tracing::error!(error = %cause, "OTP email delivery failed");
            let body = ErrorResponse::new(ErrorCode::InternalError, MSG_EMAIL_DELIVERY);
            return (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response();
        }

        let app_error: AppError = self.into();
        app_error.into_response()
    }
}

impl From<mongodb::error::Error> for UserError {
    fn from(err: mongodb::error::Error) -> Self {
        UserError::Database(err.to_string())
    }
}

impl From<email::NotificationError> for UserError {
    fn from(err: email::NotificationError) -> Self {
        UserError::EmailDelivery(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (UserError::NotFound(Uuid::nil()), StatusCode::NOT_FOUND),
            (UserError::DuplicateEmail("a@b.co".into()), StatusCode::BAD_REQUEST),
            (UserError::AdminRegistrationDisabled, StatusCode::FORBIDDEN),
            (UserError::InvalidCredentials, StatusCode::UNAUTHORIZED),
            (UserError::OtpExpired, StatusCode::BAD_REQUEST),
            (UserError::Database("down".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (err, status) in cases {
            assert_eq!(err.into_response().status(), status);
        }
    }

    #[test]
    fn test_email_delivery_keeps_message() {
        let response = UserError::EmailDelivery("smtp timeout".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
