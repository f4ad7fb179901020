use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_helpers::{AppError, JwtClaims, auth::middleware::MSG_NOT_AUTHENTICATED};

use crate::error::UserError;
use crate::repository::{OtpRepository, UserRepository};
use crate::service::UserService;

pub const MSG_USER_GONE: &str = "Invalid token. User not found.";

/// Resolve the token's subject against the user store.
///
/// Runs after `jwt_auth_middleware`. Rejects tokens whose user no longer
/// exists and overwrites the role and email claims with stored values, so
/// a later `require_role` sees the current role.
pub async fn require_active_user<R, O>(
    State(service): State<UserService<R, O>>,
    mut request: Request,
    next: Next,
) -> Response
where
    R: UserRepository + 'static,
    O: OtpRepository + 'static,
{
    let Some(claims) = request.extensions_mut().get_mut::<JwtClaims>() else {
        return AppError::Unauthorized(MSG_NOT_AUTHENTICATED.to_string()).into_response();
    };

    let Some(user_id) = claims.user_id() else {
        return AppError::Unauthorized(MSG_USER_GONE.to_string()).into_response();
    };

    match service.get_user(user_id).await {
        Ok(user) => {
            claims.role = user.role.as_str().to_string();
            claims.email = user.email;
        }
        Err(UserError::NotFound(_)) => {
            tracing::info!(%user_id, "Token subject no longer exists");
            return AppError::Unauthorized(MSG_USER_GONE.to_string()).into_response();
        }
        Err(e) => return e.into_response(),
    }

    next.run(request).await
}
