//! Complaint endpoints: submission, workflow, files, notifications.

use axum::{
    Json, Router,
    extract::{Multipart, Path, State, multipart::Field},
    http::header,
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
};
use resolveit_common::{AppError, AppResult};
use resolveit_core::{
    Action, RolePermissions,
    services::{
        complaint::{ComplaintStats, ComplaintView, SubmitComplaintInput},
        notification::NotificationEntry,
    },
};
use resolveit_db::entities::{
    complaint_file::{self, FileCategory},
    user::Role,
};
use serde::{Deserialize, Serialize};

use crate::{
    extractors::{AuthUser, MaybeAuthUser},
    middleware::AppState,
    response::ApiResponse,
};

use super::auth::UserResponse;

/// Attachment as exposed in responses. The on-disk path stays server-side.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileResponse {
    /// File ID.
    pub id: String,
    /// Owning complaint ID.
    pub complaint_id: String,
    /// Stored file name.
    pub file_name: String,
    /// Name the file was uploaded under.
    pub original_file_name: String,
    /// MIME type.
    pub file_type: String,
    /// Category, uppercase.
    pub file_category: String,
    /// Size in bytes.
    pub file_size: i64,
    /// Whether only admins may see the file.
    pub admin_only: bool,
    /// Upload time.
    pub uploaded_at: chrono::DateTime<chrono::FixedOffset>,
}

impl From<complaint_file::Model> for FileResponse {
    fn from(f: complaint_file::Model) -> Self {
        let category = match f.file_category {
            FileCategory::Image => "IMAGE",
            FileCategory::Document => "DOCUMENT",
            FileCategory::Video => "VIDEO",
        };
        Self {
            id: f.id,
            complaint_id: f.complaint_id,
            file_name: f.file_name,
            original_file_name: f.original_file_name,
            file_type: f.file_type,
            file_category: category.to_string(),
            file_size: f.file_size,
            admin_only: f.admin_only,
            uploaded_at: f.uploaded_at,
        }
    }
}

/// Payload for a submission that carried attachments.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitWithFilesResponse {
    /// The created complaint.
    pub complaint: ComplaintView,
    /// Attachments that were stored successfully.
    pub files: Vec<FileResponse>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateStatusRequest {
    status: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AssignRequest {
    staff_id: String,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(submit).get(list))
        .route("/with-files", post(submit_with_files))
        .route("/stats", get(stats))
        .route("/staff", get(staff))
        .route("/notifications", get(notifications))
        .route("/notifications/clear", post(clear_notifications))
        .route("/files/{file_id}/download", get(download_file))
        .route("/files/{file_id}", delete(delete_file))
        .route("/{id}", get(get_one))
        .route("/{id}/files", get(list_files))
        .route("/{id}/status", put(update_status))
        .route("/{id}/assign", put(assign))
        .route("/{id}/resolve", put(resolve))
}

async fn submit(
    State(state): State<AppState>,
    MaybeAuthUser(user): MaybeAuthUser,
    Json(input): Json<SubmitComplaintInput>,
) -> AppResult<ApiResponse<ComplaintView>> {
    let complaint = state.complaints.submit(input, user.as_ref()).await?;
    let view = state.complaints.to_view(complaint).await?;
    Ok(ApiResponse::ok(view))
}

async fn submit_with_files(
    State(state): State<AppState>,
    MaybeAuthUser(user): MaybeAuthUser,
    mut multipart: Multipart,
) -> AppResult<ApiResponse<SubmitWithFilesResponse>> {
    let mut title = String::new();
    let mut description = String::new();
    let mut category = String::new();
    let mut anonymous = false;
    let mut uploads: Vec<(String, String, Vec<u8>)> = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "title" => title = field_text(field).await?,
            "description" => description = field_text(field).await?,
            "category" => category = field_text(field).await?,
            "anonymous" => {
                anonymous = field_text(field).await?.trim().eq_ignore_ascii_case("true");
            }
            "files" => {
                let file_name = field.file_name().unwrap_or("attachment").to_string();
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;
                uploads.push((file_name, content_type, data.to_vec()));
            }
            _ => {}
        }
    }

    let input = SubmitComplaintInput {
        title,
        description,
        category,
        anonymous,
    };
    let complaint = state.complaints.submit(input, user.as_ref()).await?;

    // A bad attachment must not sink the complaint it rode in on.
    let mut files = Vec::new();
    for (file_name, content_type, data) in uploads {
        match state
            .files
            .store(&complaint.id, &file_name, &content_type, &data)
            .await
        {
            Ok(record) => files.push(FileResponse::from(record)),
            Err(e) => {
                tracing::warn!(
                    complaint_id = %complaint.id,
                    file = %file_name,
                    error = %e,
                    "Failed to store attachment"
                );
            }
        }
    }

    let view = state.complaints.to_view(complaint).await?;
    Ok(ApiResponse::ok(SubmitWithFilesResponse {
        complaint: view,
        files,
    }))
}

async fn field_text(field: Field<'_>) -> AppResult<String> {
    field
        .text()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))
}

async fn list(State(state): State<AppState>) -> AppResult<ApiResponse<Vec<ComplaintView>>> {
    Ok(ApiResponse::ok(state.complaints.list_views().await?))
}

async fn get_one(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<ComplaintView>> {
    Ok(ApiResponse::ok(state.complaints.get_view(&id).await?))
}

async fn list_files(
    State(state): State<AppState>,
    MaybeAuthUser(user): MaybeAuthUser,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<Vec<FileResponse>>> {
    let role = user.map_or(Role::User, |u| u.role);
    let files = state.files.list_visible(&id, role).await?;
    Ok(ApiResponse::ok(
        files.into_iter().map(FileResponse::from).collect(),
    ))
}

async fn download_file(
    State(state): State<AppState>,
    MaybeAuthUser(user): MaybeAuthUser,
    Path(file_id): Path<String>,
) -> AppResult<Response> {
    let role = user.map_or(Role::User, |u| u.role);
    let (record, data) = state.files.open_for_download(&file_id, role).await?;

    let headers = [
        (header::CONTENT_TYPE, record.file_type),
        (
            header::CONTENT_DISPOSITION,
            format!(
                "attachment; filename=\"{}\"",
                record.original_file_name.replace('"', "")
            ),
        ),
    ];
    Ok((headers, data).into_response())
}

async fn delete_file(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(file_id): Path<String>,
) -> AppResult<ApiResponse<()>> {
    state.files.delete(&file_id, user.role).await?;
    Ok(ApiResponse::ok(()))
}

async fn update_status(
    State(state): State<AppState>,
    AuthUser(_user): AuthUser,
    Path(id): Path<String>,
    Json(req): Json<UpdateStatusRequest>,
) -> AppResult<ApiResponse<ComplaintView>> {
    let updated = state.complaints.transition_status(&id, &req.status).await?;
    Ok(ApiResponse::ok(state.complaints.to_view(updated).await?))
}

async fn assign(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
    Json(req): Json<AssignRequest>,
) -> AppResult<ApiResponse<ComplaintView>> {
    let updated = state.complaints.assign(&id, &req.staff_id, &user).await?;
    Ok(ApiResponse::ok(state.complaints.to_view(updated).await?))
}

async fn resolve(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<ComplaintView>> {
    let updated = state.complaints.resolve(&id, &user).await?;
    Ok(ApiResponse::ok(state.complaints.to_view(updated).await?))
}

async fn stats(State(state): State<AppState>) -> AppResult<ApiResponse<ComplaintStats>> {
    Ok(ApiResponse::ok(state.complaints.stats().await?))
}

async fn staff(State(state): State<AppState>) -> AppResult<ApiResponse<Vec<UserResponse>>> {
    let staff = state.users.list_staff().await?;
    Ok(ApiResponse::ok(
        staff.into_iter().map(UserResponse::from).collect(),
    ))
}

async fn notifications(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> AppResult<ApiResponse<Vec<NotificationEntry>>> {
    if !user.role.allows(Action::ViewNotificationLog) {
        return Err(AppError::Forbidden(
            "Only admins can view the notification log".to_string(),
        ));
    }
    Ok(ApiResponse::ok(state.notifications.recent()))
}

async fn clear_notifications(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> AppResult<ApiResponse<()>> {
    if !user.role.allows(Action::ViewNotificationLog) {
        return Err(AppError::Forbidden(
            "Only admins can clear the notification log".to_string(),
        ));
    }
    state.notifications.clear();
    Ok(ApiResponse::ok(()))
}
