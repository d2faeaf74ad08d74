//! Staff application endpoints.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post, put},
};
use resolveit_common::{AppError, AppResult};
use resolveit_core::{
    Action, RolePermissions,
    services::staff_application::{ApplyInput, ReviewInput},
};
use resolveit_db::entities::staff_application::{self, ApplicationStatus};
use serde::Serialize;

use crate::{extractors::AuthUser, middleware::AppState, response::ApiResponse};

/// Staff application as exposed in responses.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationResponse {
    /// Application ID.
    pub id: String,
    /// Applicant user ID.
    pub user_id: String,
    /// Categories the applicant wants to handle.
    pub categories: String,
    /// Relevant experience.
    pub experience: String,
    /// Relevant skills.
    pub skills: String,
    /// Weekly availability.
    pub availability: String,
    /// Why the applicant wants to join.
    pub motivation: String,
    /// Prior staff or support roles, if any.
    pub previous_experience: Option<String>,
    /// PENDING, APPROVED, or REJECTED.
    pub status: String,
    /// Reviewing admin, once reviewed.
    pub reviewed_by_id: Option<String>,
    /// Review time, once reviewed.
    pub reviewed_at: Option<chrono::DateTime<chrono::FixedOffset>>,
    /// Notes from the reviewing admin.
    pub admin_notes: Option<String>,
    /// Submission time.
    pub created_at: chrono::DateTime<chrono::FixedOffset>,
}

impl From<staff_application::Model> for ApplicationResponse {
    fn from(a: staff_application::Model) -> Self {
        let status = match a.status {
            ApplicationStatus::Pending => "PENDING",
            ApplicationStatus::Approved => "APPROVED",
            ApplicationStatus::Rejected => "REJECTED",
        };
        Self {
            id: a.id,
            user_id: a.user_id,
            categories: a.categories,
            experience: a.experience,
            skills: a.skills,
            availability: a.availability,
            motivation: a.motivation,
            previous_experience: a.previous_experience,
            status: status.to_string(),
            reviewed_by_id: a.reviewed_by_id,
            reviewed_at: a.reviewed_at,
            admin_notes: a.admin_notes,
            created_at: a.created_at,
        }
    }
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/apply", post(apply))
        .route("/my-applications", get(my_applications))
        .route("/pending", get(pending))
        .route("/all", get(all))
        .route("/{id}/approve", put(approve))
        .route("/{id}/reject", put(reject))
}

async fn apply(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(input): Json<ApplyInput>,
) -> AppResult<ApiResponse<ApplicationResponse>> {
    let application = state.applications.apply(&user, input).await?;
    Ok(ApiResponse::ok(application.into()))
}

async fn my_applications(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> AppResult<ApiResponse<Vec<ApplicationResponse>>> {
    let applications = state.applications.my_applications(&user.id).await?;
    Ok(ApiResponse::ok(
        applications.into_iter().map(ApplicationResponse::from).collect(),
    ))
}

async fn pending(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> AppResult<ApiResponse<Vec<ApplicationResponse>>> {
    require_reviewer(user.role)?;
    let applications = state.applications.pending().await?;
    Ok(ApiResponse::ok(
        applications.into_iter().map(ApplicationResponse::from).collect(),
    ))
}

async fn all(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> AppResult<ApiResponse<Vec<ApplicationResponse>>> {
    require_reviewer(user.role)?;
    let applications = state.applications.all().await?;
    Ok(ApiResponse::ok(
        applications.into_iter().map(ApplicationResponse::from).collect(),
    ))
}

async fn approve(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
    input: Option<Json<ReviewInput>>,
) -> AppResult<ApiResponse<ApplicationResponse>> {
    let input = input.map(|Json(i)| i).unwrap_or_default();
    let application = state.applications.approve(&id, &user, input).await?;
    Ok(ApiResponse::ok(application.into()))
}

async fn reject(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
    input: Option<Json<ReviewInput>>,
) -> AppResult<ApiResponse<ApplicationResponse>> {
    let input = input.map(|Json(i)| i).unwrap_or_default();
    let application = state.applications.reject(&id, &user, input).await?;
    Ok(ApiResponse::ok(application.into()))
}

fn require_reviewer(role: resolveit_db::entities::user::Role) -> AppResult<()> {
    if !role.allows(Action::ReviewApplications) {
        return Err(AppError::Forbidden(
            "Only admins can view staff applications".to_string(),
        ));
    }
    Ok(())
}
