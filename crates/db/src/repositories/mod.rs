//! Data access repositories.
//!
//! Each repository wraps an `Arc<DatabaseConnection>` and exposes the queries
//! one entity needs. Database errors map to [`AppError::Database`]; insert
//! paths guarded by unique indexes map constraint violations to
//! [`AppError::Conflict`] so races surface as 409s instead of 500s.

pub mod complaint;
pub mod complaint_file;
pub mod complaint_status;
pub mod escalation;
pub mod staff_application;
pub mod user;

pub use complaint::ComplaintRepository;
pub use complaint_file::ComplaintFileRepository;
pub use complaint_status::ComplaintStatusRepository;
pub use escalation::EscalationRepository;
pub use staff_application::StaffApplicationRepository;
pub use user::UserRepository;

use resolveit_common::AppError;
use sea_orm::{DbErr, SqlErr};

/// Map an insert error, turning unique-constraint violations into conflicts.
pub(crate) fn map_insert_err(e: DbErr, conflict_message: &str) -> AppError {
    match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => {
            AppError::Conflict(conflict_message.to_string())
        }
        _ => AppError::Database(e.to_string()),
    }
}
