//! Sweets routes with per-group authentication layers

use axum::{middleware::from_fn_with_state, Router};
use axum_helpers::{jwt_auth_middleware, require_role, JwtAuth};
use domain_sweets::{handlers, MongoSweetRepository, SweetRepository, SweetService};
use domain_users::{require_active_user, OtpRepository, UserRepository, UserService};

use crate::state::AppState;

pub const ADMIN_ROLE: &str = "admin";

pub fn router(state: &AppState) -> Router {
    guarded_router(state.sweets.clone(), state.users.clone(), state.jwt.clone())
}

/// Public reads, purchase for any signed-in user, everything else admin only.
///
/// Layers run bottom-up: token check, then user lookup, then role check.
pub fn guarded_router<S, U, O>(
    sweets: SweetService<S>,
    users: UserService<U, O>,
    jwt: JwtAuth,
) -> Router
where
    S: SweetRepository + 'static,
    U: UserRepository + 'static,
    O: OtpRepository + 'static,
{
    let customer = handlers::customer_router(sweets.clone())
        .route_layer(from_fn_with_state(users.clone(), require_active_user::<U, O>))
        .route_layer(from_fn_with_state(jwt.clone(), jwt_auth_middleware));

    let admin = handlers::admin_router(sweets.clone())
        .route_layer(from_fn_with_state(ADMIN_ROLE, require_role))
        .route_layer(from_fn_with_state(users, require_active_user::<U, O>))
        .route_layer(from_fn_with_state(jwt, jwt_auth_middleware));

    handlers::public_router(sweets).merge(customer).merge(admin)
}

pub async fn init_indexes(state: &AppState) -> eyre::Result<()> {
    MongoSweetRepository::new(&state.db).init_indexes().await?;
    Ok(())
}
