//! Escalation endpoints.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post, put},
};
use resolveit_common::{AppError, AppResult};
use resolveit_core::{Action, RolePermissions, services::escalation::EscalateInput};
use resolveit_db::entities::escalation::{self, EscalationType};
use serde::{Deserialize, Serialize};

use crate::{extractors::AuthUser, middleware::AppState, response::ApiResponse};

use super::auth::UserResponse;

/// Escalation as exposed in responses.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EscalationResponse {
    /// Escalation ID.
    pub id: String,
    /// Escalated complaint ID.
    pub complaint_id: String,
    /// Who escalated, absent for automatic escalations.
    pub escalated_by_id: Option<String>,
    /// Who the complaint was escalated to.
    pub escalated_to_id: String,
    /// Why the complaint was escalated.
    pub reason: String,
    /// MANUAL, AUTOMATIC, or PRIORITY.
    pub escalation_type: String,
    /// Whether the escalation is still pending.
    pub is_active: bool,
    /// Creation time.
    pub created_at: chrono::DateTime<chrono::FixedOffset>,
    /// Resolution time, if resolved.
    pub resolved_at: Option<chrono::DateTime<chrono::FixedOffset>>,
}

impl From<escalation::Model> for EscalationResponse {
    fn from(e: escalation::Model) -> Self {
        let escalation_type = match e.escalation_type {
            EscalationType::Manual => "MANUAL",
            EscalationType::Automatic => "AUTOMATIC",
            EscalationType::Priority => "PRIORITY",
        };
        Self {
            id: e.id,
            complaint_id: e.complaint_id,
            escalated_by_id: e.escalated_by_id,
            escalated_to_id: e.escalated_to_id,
            reason: e.reason,
            escalation_type: escalation_type.to_string(),
            is_active: e.is_active,
            created_at: e.created_at,
            resolved_at: e.resolved_at,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EscalateRequest {
    complaint_id: String,
    escalated_to_id: String,
    reason: String,
}

/// Outcome of an admin-triggered sweep.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SweepResult {
    /// Number of complaints or reminders processed.
    pub count: u64,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/escalate", post(escalate))
        .route("/auto-escalate", post(auto_escalate))
        .route("/send-reminders", post(send_reminders))
        .route("/authorities", get(authorities))
        .route("/my-escalations", get(my_escalations))
        .route("/complaint/{id}/history", get(history))
        .route("/{id}/resolve", put(resolve))
}

async fn escalate(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(req): Json<EscalateRequest>,
) -> AppResult<ApiResponse<EscalationResponse>> {
    let input = EscalateInput {
        escalated_to_id: req.escalated_to_id,
        reason: req.reason,
    };
    let escalation = state
        .escalations
        .escalate(&req.complaint_id, &user, input)
        .await?;
    Ok(ApiResponse::ok(escalation.into()))
}

async fn auto_escalate(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> AppResult<ApiResponse<SweepResult>> {
    if !user.role.allows(Action::TriggerSweeps) {
        return Err(AppError::Forbidden(
            "Only admins can trigger the escalation sweep".to_string(),
        ));
    }
    let count = state.escalations.auto_escalate_overdue().await?;
    Ok(ApiResponse::ok(SweepResult { count }))
}

async fn send_reminders(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> AppResult<ApiResponse<SweepResult>> {
    if !user.role.allows(Action::TriggerSweeps) {
        return Err(AppError::Forbidden(
            "Only admins can trigger the reminder sweep".to_string(),
        ));
    }
    let count = state.escalations.send_reminders().await?;
    Ok(ApiResponse::ok(SweepResult { count }))
}

async fn authorities(
    State(state): State<AppState>,
    AuthUser(_user): AuthUser,
) -> AppResult<ApiResponse<Vec<UserResponse>>> {
    let users = state.users.list_authorities().await?;
    Ok(ApiResponse::ok(
        users.into_iter().map(UserResponse::from).collect(),
    ))
}

async fn my_escalations(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> AppResult<ApiResponse<Vec<EscalationResponse>>> {
    let escalations = state.escalations.my_escalations(&user.id).await?;
    Ok(ApiResponse::ok(
        escalations.into_iter().map(EscalationResponse::from).collect(),
    ))
}

async fn history(
    State(state): State<AppState>,
    AuthUser(_user): AuthUser,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<Vec<EscalationResponse>>> {
    let escalations = state.escalations.history(&id).await?;
    Ok(ApiResponse::ok(
        escalations.into_iter().map(EscalationResponse::from).collect(),
    ))
}

async fn resolve(
    State(state): State<AppState>,
    AuthUser(_user): AuthUser,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<EscalationResponse>> {
    let escalation = state.escalations.resolve(&id).await?;
    Ok(ApiResponse::ok(escalation.into()))
}
