use super::jwt::{JwtAuth, JwtClaims};
use crate::errors::AppError;
use axum::{
    extract::{Request, State},
    http::{HeaderMap, header},
    middleware::Next,
    response::{IntoResponse, Response},
};

pub const MSG_NO_TOKEN: &str = "Access denied. No token provided.";
pub const MSG_INVALID_TOKEN: &str = "Invalid token.";
pub const MSG_NOT_AUTHENTICATED: &str = "Not authenticated";
pub const MSG_FORBIDDEN: &str = "Forbidden: Access denied";

/// Token from `Authorization: Bearer <token>`.
fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|auth| auth.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// JWT authentication middleware.
///
/// Verifies the bearer token and inserts [`JwtClaims`] into request
/// extensions. Rejects with 401 when the header is missing or the token
/// fails signature or expiry checks.
///
/// ```ignore
/// let protected = Router::new()
///     .route("/{id}/purchase", post(purchase))
///     .route_layer(axum::middleware::from_fn_with_state(jwt_auth, jwt_auth_middleware));
/// ```
pub async fn jwt_auth_middleware(
    State(auth): State<JwtAuth>,
    mut request: Request,
    next: Next,
) -> Response {
    let Some(token) = bearer_token(request.headers()) else {
        tracing::debug!("No bearer token in Authorization header");
        return AppError::Unauthorized(MSG_NO_TOKEN.to_string()).into_response();
    };

    let claims = match auth.verify_token(token) {
        Ok(claims) => claims,
        Err(e) => {
            tracing::debug!("JWT verification failed: {}", e);
            return AppError::Unauthorized(MSG_INVALID_TOKEN.to_string()).into_response();
        }
    };

    request.extensions_mut().insert(claims);
    next.run(request).await
}

/// Role guard. Run it after [`jwt_auth_middleware`].
///
/// ```ignore
/// router.route_layer(axum::middleware::from_fn_with_state("admin", require_role))
/// ```
pub async fn require_role(
    State(role): State<&'static str>,
    request: Request,
    next: Next,
) -> Response {
    let Some(claims) = request.extensions().get::<JwtClaims>() else {
        return AppError::Unauthorized(MSG_NOT_AUTHENTICATED.to_string()).into_response();
    };

    if claims.role != role {
        tracing::info!(
            user_id = %claims.sub,
            role = %claims.role,
            required = role,
            "Role check failed"
        );
        return AppError::Forbidden(MSG_FORBIDDEN.to_string()).into_response();
    }

    next.run(request).await
}
