//! Complaint status repository.

use std::sync::Arc;

use crate::entities::{ComplaintStatus, complaint_status};
use resolveit_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set, SqlErr,
};

/// Complaint status repository for database operations.
#[derive(Clone)]
pub struct ComplaintStatusRepository {
    db: Arc<DatabaseConnection>,
}

impl ComplaintStatusRepository {
    /// Create a new complaint status repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a status by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<complaint_status::Model>> {
        ComplaintStatus::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a status by code.
    pub async fn find_by_code(&self, code: &str) -> AppResult<Option<complaint_status::Model>> {
        ComplaintStatus::find()
            .filter(complaint_status::Column::Code.eq(code))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a status by code, creating it if missing.
    ///
    /// Two callers racing on the same new code both succeed: the loser of the
    /// insert refetches the winner's row.
    pub async fn get_or_create(
        &self,
        id: String,
        code: &str,
        display: &str,
    ) -> AppResult<complaint_status::Model> {
        if let Some(existing) = self.find_by_code(code).await? {
            return Ok(existing);
        }

        let model = complaint_status::ActiveModel {
            id: Set(id),
            code: Set(code.to_string()),
            display: Set(display.to_string()),
        };

        match model.insert(self.db.as_ref()).await {
            Ok(created) => Ok(created),
            Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => self
                .find_by_code(code)
                .await?
                .ok_or_else(|| AppError::Database(format!("Status {code} vanished mid-create"))),
            Err(e) => Err(AppError::Database(e.to_string())),
        }
    }

    /// List all statuses.
    pub async fn find_all(&self) -> AppResult<Vec<complaint_status::Model>> {
        ComplaintStatus::find()
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete every status row.
    pub async fn delete_all(&self) -> AppResult<u64> {
        ComplaintStatus::delete_many()
            .exec(self.db.as_ref())
            .await
            .map(|res| res.rows_affected)
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
