//! Auth routes

use axum::Router;
use domain_users::{handlers, MongoOtpRepository, MongoUserRepository};

use crate::state::AppState;

pub fn router(state: &AppState) -> Router {
    handlers::router(state.users.clone())
}

pub async fn init_indexes(state: &AppState) -> eyre::Result<()> {
    MongoUserRepository::new(&state.db).init_indexes().await?;
    MongoOtpRepository::new(&state.db).init_indexes().await?;
    Ok(())
}
