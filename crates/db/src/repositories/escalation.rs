//! Escalation repository.

use std::sync::Arc;

use crate::entities::{Escalation, escalation};
use resolveit_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, prelude::DateTimeWithTimeZone, sea_query::Expr,
};

/// Escalation repository for database operations.
#[derive(Clone)]
pub struct EscalationRepository {
    db: Arc<DatabaseConnection>,
}

impl EscalationRepository {
    /// Create a new escalation repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find an escalation by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<escalation::Model>> {
        Escalation::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find an escalation by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<escalation::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Escalation {id} not found")))
    }

    /// Create a new escalation.
    ///
    /// The partial unique index on active escalations turns a second active
    /// escalation for the same complaint into a conflict.
    pub async fn create(&self, model: escalation::ActiveModel) -> AppResult<escalation::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| super::map_insert_err(e, "Complaint is already escalated"))
    }

    /// Update an escalation.
    pub async fn update(&self, model: escalation::ActiveModel) -> AppResult<escalation::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find the active escalation for a complaint, if any.
    pub async fn find_active_by_complaint(
        &self,
        complaint_id: &str,
    ) -> AppResult<Option<escalation::Model>> {
        Escalation::find()
            .filter(escalation::Column::ComplaintId.eq(complaint_id))
            .filter(escalation::Column::IsActive.eq(true))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// List all escalations for a complaint, newest first.
    pub async fn find_by_complaint(&self, complaint_id: &str) -> AppResult<Vec<escalation::Model>> {
        Escalation::find()
            .filter(escalation::Column::ComplaintId.eq(complaint_id))
            .order_by_desc(escalation::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// List active escalations targeting a user, newest first.
    pub async fn find_active_by_target(&self, user_id: &str) -> AppResult<Vec<escalation::Model>> {
        Escalation::find()
            .filter(escalation::Column::EscalatedToId.eq(user_id))
            .filter(escalation::Column::IsActive.eq(true))
            .order_by_desc(escalation::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// List active escalations created before `cutoff` (reminder sweep).
    pub async fn find_active_older_than(
        &self,
        cutoff: DateTimeWithTimeZone,
    ) -> AppResult<Vec<escalation::Model>> {
        Escalation::find()
            .filter(escalation::Column::IsActive.eq(true))
            .filter(escalation::Column::CreatedAt.lt(cutoff))
            .order_by_asc(escalation::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count active escalations targeting a user.
    pub async fn count_active_by_target(&self, user_id: &str) -> AppResult<u64> {
        Escalation::find()
            .filter(escalation::Column::EscalatedToId.eq(user_id))
            .filter(escalation::Column::IsActive.eq(true))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count all escalations (round-robin strategy input).
    pub async fn count_all(&self) -> AppResult<u64> {
        Escalation::find()
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Deactivate every active escalation for a complaint (single UPDATE).
    pub async fn resolve_all_for_complaint(
        &self,
        complaint_id: &str,
        resolved_at: DateTimeWithTimeZone,
    ) -> AppResult<u64> {
        Escalation::update_many()
            .col_expr(escalation::Column::IsActive, Expr::value(false))
            .col_expr(escalation::Column::ResolvedAt, Expr::value(resolved_at))
            .filter(escalation::Column::ComplaintId.eq(complaint_id))
            .filter(escalation::Column::IsActive.eq(true))
            .exec(self.db.as_ref())
            .await
            .map(|res| res.rows_affected)
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete every escalation row.
    pub async fn delete_all(&self) -> AppResult<u64> {
        Escalation::delete_many()
            .exec(self.db.as_ref())
            .await
            .map(|res| res.rows_affected)
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
