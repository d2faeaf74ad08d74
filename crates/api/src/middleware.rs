//! Application state and authentication middleware.

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use resolveit_common::JwtKeys;
use resolveit_core::{
    ComplaintService, DatabaseAdminService, EscalationService, FileService, NotificationService,
    ReportService, StaffApplicationService, UserService,
};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// User service.
    pub users: UserService,
    /// Complaint service.
    pub complaints: ComplaintService,
    /// Attachment service.
    pub files: FileService,
    /// Escalation service.
    pub escalations: EscalationService,
    /// Staff application service.
    pub applications: StaffApplicationService,
    /// Report service.
    pub reports: ReportService,
    /// Database administration service.
    pub admin: DatabaseAdminService,
    /// Notification dispatch and log.
    pub notifications: NotificationService,
    /// JWT keys for token verification.
    pub jwt_keys: JwtKeys,
}

/// Bearer-token authentication middleware.
///
/// A valid token puts the resolved user model into the request extensions
/// for the `AuthUser`/`MaybeAuthUser` extractors. Requests without an
/// `Authorization` header pass through unauthenticated; a header that fails
/// verification is rejected outright.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let header_value = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());

    let Some(header_value) = header_value else {
        return next.run(req).await;
    };

    let Some(token) = header_value.strip_prefix("Bearer ") else {
        return (StatusCode::UNAUTHORIZED, "Invalid authorization header").into_response();
    };

    let claims = match state.jwt_keys.verify(token) {
        Ok(claims) => claims,
        Err(_) => {
            return (StatusCode::UNAUTHORIZED, "Invalid or expired token").into_response();
        }
    };

    match state.users.get_by_email(&claims.sub).await {
        Ok(user) => {
            req.extensions_mut().insert(user);
            next.run(req).await
        }
        Err(_) => (StatusCode::UNAUTHORIZED, "Unknown user").into_response(),
    }
}
