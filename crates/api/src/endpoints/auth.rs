//! Authentication endpoints.

use axum::{Json, Router, extract::State, routing::post};
use resolveit_common::AppResult;
use resolveit_core::services::user::{LoginInput, RegisterInput};
use resolveit_db::entities::user::{self, Role};
use serde::Serialize;

use crate::{middleware::AppState, response::ApiResponse};

/// User as exposed in responses. The password hash never leaves the server.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    /// User ID.
    pub id: String,
    /// Full display name.
    pub full_name: String,
    /// Login email.
    pub email: String,
    /// Role name, uppercase.
    pub role: String,
    /// Account creation time.
    pub created_at: chrono::DateTime<chrono::FixedOffset>,
}

impl From<user::Model> for UserResponse {
    fn from(u: user::Model) -> Self {
        Self {
            id: u.id,
            full_name: u.full_name,
            email: u.email,
            role: role_name(u.role).to_string(),
            created_at: u.created_at,
        }
    }
}

/// Uppercase wire name for a role.
pub(crate) const fn role_name(role: Role) -> &'static str {
    match role {
        Role::User => "USER",
        Role::Staff => "STAFF",
        Role::Manager => "MANAGER",
        Role::Admin => "ADMIN",
        Role::SuperAdmin => "SUPERADMIN",
    }
}

/// Successful login payload.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    /// Bearer token for subsequent requests.
    pub token: String,
    /// The authenticated user.
    pub user: UserResponse,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/create-admin", post(create_admin))
        .route("/create-staff", post(create_staff))
}

async fn register(
    State(state): State<AppState>,
    Json(input): Json<RegisterInput>,
) -> AppResult<ApiResponse<UserResponse>> {
    let user = state.users.register(input).await?;
    Ok(ApiResponse::ok(user.into()))
}

async fn login(
    State(state): State<AppState>,
    Json(input): Json<LoginInput>,
) -> AppResult<ApiResponse<LoginResponse>> {
    let (user, token) = state.users.login(input).await?;
    Ok(ApiResponse::ok(LoginResponse {
        token,
        user: user.into(),
    }))
}

async fn create_admin(
    State(state): State<AppState>,
    Json(input): Json<RegisterInput>,
) -> AppResult<ApiResponse<UserResponse>> {
    let user = state.users.create_admin(input).await?;
    Ok(ApiResponse::ok(user.into()))
}

async fn create_staff(
    State(state): State<AppState>,
    Json(input): Json<RegisterInput>,
) -> AppResult<ApiResponse<UserResponse>> {
    let user = state.users.create_staff(input).await?;
    Ok(ApiResponse::ok(user.into()))
}
