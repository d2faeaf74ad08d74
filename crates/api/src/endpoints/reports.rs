//! Report endpoints.

use axum::{
    Json, Router,
    extract::{Query, State},
    http::header,
    response::{IntoResponse, Response},
    routing::post,
};
use resolveit_common::{AppError, AppResult};
use resolveit_core::{
    Action, RolePermissions,
    services::report::{ExportFormat, ReportSummary},
};
use serde::Deserialize;

use crate::{extractors::AuthUser, middleware::AppState, response::ApiResponse};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReportRequest {
    category: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ExportQuery {
    format: ExportFormat,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/generate", post(generate))
        .route("/export", post(export))
}

async fn generate(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    body: Option<Json<ReportRequest>>,
) -> AppResult<ApiResponse<ReportSummary>> {
    require_reporter(user.role)?;

    let req = body.map(|Json(r)| r).unwrap_or_default();
    let summary = state.reports.generate(req.category.as_deref()).await?;
    Ok(ApiResponse::ok(summary))
}

async fn export(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Query(query): Query<ExportQuery>,
    body: Option<Json<ReportRequest>>,
) -> AppResult<Response> {
    require_reporter(user.role)?;

    let req = body.map(|Json(r)| r).unwrap_or_default();
    let export = state
        .reports
        .export(req.category.as_deref(), query.format)
        .await?;

    let headers = [
        (header::CONTENT_TYPE, export.content_type.to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", export.file_name),
        ),
    ];
    Ok((headers, export.bytes).into_response())
}

fn require_reporter(role: resolveit_db::entities::user::Role) -> AppResult<()> {
    if !role.allows(Action::GenerateReports) {
        return Err(AppError::Forbidden(
            "Only admins can generate reports".to_string(),
        ));
    }
    Ok(())
}
