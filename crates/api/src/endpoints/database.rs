//! Database administration endpoints.

use axum::{
    Router,
    extract::State,
    routing::{get, post},
};
use resolveit_common::AppResult;
use resolveit_core::services::admin::DatabaseStats;

use crate::{extractors::AuthUser, middleware::AppState, response::ApiResponse};

use super::auth::UserResponse;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/reset", post(reset))
        .route("/create-admin", post(create_admin))
        .route("/stats", get(stats))
}

async fn reset(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> AppResult<ApiResponse<()>> {
    state.admin.reset(&user).await?;
    Ok(ApiResponse::ok(()))
}

async fn create_admin(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> AppResult<ApiResponse<UserResponse>> {
    let admin = state.admin.seed_admin(&user).await?;
    Ok(ApiResponse::ok(admin.into()))
}

async fn stats(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> AppResult<ApiResponse<DatabaseStats>> {
    Ok(ApiResponse::ok(state.admin.stats(&user).await?))
}
