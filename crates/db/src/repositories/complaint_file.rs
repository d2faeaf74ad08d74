//! Complaint file repository.

use std::sync::Arc;

use crate::entities::{ComplaintFile, complaint_file};
use resolveit_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, PaginatorTrait,
    QueryFilter, QueryOrder,
};

/// Complaint file repository for database operations.
#[derive(Clone)]
pub struct ComplaintFileRepository {
    db: Arc<DatabaseConnection>,
}

impl ComplaintFileRepository {
    /// Create a new complaint file repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a file by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<complaint_file::Model>> {
        ComplaintFile::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a file by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<complaint_file::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("File {id} not found")))
    }

    /// List files attached to a complaint, oldest first.
    pub async fn find_by_complaint(
        &self,
        complaint_id: &str,
    ) -> AppResult<Vec<complaint_file::Model>> {
        ComplaintFile::find()
            .filter(complaint_file::Column::ComplaintId.eq(complaint_id))
            .order_by_asc(complaint_file::Column::UploadedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new file record.
    pub async fn create(
        &self,
        model: complaint_file::ActiveModel,
    ) -> AppResult<complaint_file::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete a file record.
    pub async fn delete(&self, model: complaint_file::Model) -> AppResult<()> {
        model
            .delete(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Count all file records.
    pub async fn count_all(&self) -> AppResult<u64> {
        ComplaintFile::find()
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete every file row.
    pub async fn delete_all(&self) -> AppResult<u64> {
        ComplaintFile::delete_many()
            .exec(self.db.as_ref())
            .await
            .map(|res| res.rows_affected)
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
