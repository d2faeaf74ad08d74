//! Complaint repository.

use std::sync::Arc;

use crate::entities::{Complaint, complaint};
use resolveit_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, prelude::DateTimeWithTimeZone,
};

/// Complaint repository for database operations.
#[derive(Clone)]
pub struct ComplaintRepository {
    db: Arc<DatabaseConnection>,
}

impl ComplaintRepository {
    /// Create a new complaint repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a complaint by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<complaint::Model>> {
        Complaint::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a complaint by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<complaint::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::ComplaintNotFound(id.to_string()))
    }

    /// List all complaints, newest first.
    pub async fn find_all(&self) -> AppResult<Vec<complaint::Model>> {
        Complaint::find()
            .order_by_desc(complaint::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// List complaints in a category, newest first.
    pub async fn find_by_category(&self, category: &str) -> AppResult<Vec<complaint::Model>> {
        Complaint::find()
            .filter(complaint::Column::Category.eq(category))
            .order_by_desc(complaint::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new complaint.
    pub async fn create(&self, model: complaint::ActiveModel) -> AppResult<complaint::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update a complaint.
    pub async fn update(&self, model: complaint::ActiveModel) -> AppResult<complaint::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Complaints created before `cutoff` that hold a status not in
    /// `closed_status_ids`. Status-less complaints never left intake and are
    /// skipped.
    ///
    /// Feeds the auto-escalation sweep.
    pub async fn find_open_older_than(
        &self,
        cutoff: DateTimeWithTimeZone,
        closed_status_ids: &[String],
    ) -> AppResult<Vec<complaint::Model>> {
        let mut query = Complaint::find()
            .filter(complaint::Column::CreatedAt.lt(cutoff))
            .filter(complaint::Column::StatusId.is_not_null());
        if !closed_status_ids.is_empty() {
            query =
                query.filter(complaint::Column::StatusId.is_not_in(closed_status_ids.to_vec()));
        }

        query
            .order_by_asc(complaint::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count all complaints.
    pub async fn count_all(&self) -> AppResult<u64> {
        Complaint::find()
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count complaints with the given status.
    pub async fn count_by_status(&self, status_id: &str) -> AppResult<u64> {
        Complaint::find()
            .filter(complaint::Column::StatusId.eq(status_id))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count complaints created at or after `since`.
    pub async fn count_created_since(&self, since: DateTimeWithTimeZone) -> AppResult<u64> {
        Complaint::find()
            .filter(complaint::Column::CreatedAt.gte(since))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete every complaint row.
    pub async fn delete_all(&self) -> AppResult<u64> {
        Complaint::delete_many()
            .exec(self.db.as_ref())
            .await
            .map(|res| res.rows_affected)
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
