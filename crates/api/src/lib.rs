//! HTTP API layer for resolveit-rs.
//!
//! REST endpoints over the core services:
//!
//! - **Endpoints**: auth, complaints, escalations, staff applications,
//!   reports, database admin
//! - **Extractors**: authenticated-user extraction from request extensions
//! - **Middleware**: bearer-token authentication
//!
//! Built on Axum 0.8 with Tower middleware stack.

pub mod endpoints;
pub mod extractors;
pub mod middleware;
pub mod response;

pub use endpoints::router;
pub use middleware::AppState;
