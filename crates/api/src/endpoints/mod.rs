//! API endpoints.

pub mod auth;
pub mod complaints;
pub mod database;
pub mod escalations;
pub mod reports;
pub mod staff_applications;

use axum::Router;

use crate::middleware::AppState;

/// Build the full API router.
pub fn router() -> Router<AppState> {
    Router::new().nest(
        "/api",
        Router::new()
            .nest("/auth", auth::router())
            .nest("/complaints", complaints::router())
            .nest("/escalations", escalations::router())
            .nest("/staff-applications", staff_applications::router())
            .nest("/reports", reports::router())
            .nest("/database", database::router()),
    )
}
