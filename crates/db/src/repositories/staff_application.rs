//! Staff application repository.

use std::sync::Arc;

use crate::entities::{
    StaffApplication,
    staff_application::{self, ApplicationStatus},
};
use resolveit_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder,
};

/// Staff application repository for database operations.
#[derive(Clone)]
pub struct StaffApplicationRepository {
    db: Arc<DatabaseConnection>,
}

impl StaffApplicationRepository {
    /// Create a new staff application repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find an application by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<staff_application::Model>> {
        StaffApplication::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find an application by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<staff_application::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Application {id} not found")))
    }

    /// Create a new application.
    ///
    /// The partial unique index on pending applications turns a second
    /// pending application from the same user into a conflict.
    pub async fn create(
        &self,
        model: staff_application::ActiveModel,
    ) -> AppResult<staff_application::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| super::map_insert_err(e, "You already have a pending application"))
    }

    /// Update an application.
    pub async fn update(
        &self,
        model: staff_application::ActiveModel,
    ) -> AppResult<staff_application::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// List a user's applications, newest first.
    pub async fn find_by_user(&self, user_id: &str) -> AppResult<Vec<staff_application::Model>> {
        StaffApplication::find()
            .filter(staff_application::Column::UserId.eq(user_id))
            .order_by_desc(staff_application::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// List applications awaiting review, oldest first.
    pub async fn find_pending(&self) -> AppResult<Vec<staff_application::Model>> {
        StaffApplication::find()
            .filter(staff_application::Column::Status.eq(ApplicationStatus::Pending))
            .order_by_asc(staff_application::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// List all applications, newest first.
    pub async fn find_all(&self) -> AppResult<Vec<staff_application::Model>> {
        StaffApplication::find()
            .order_by_desc(staff_application::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count all applications.
    pub async fn count_all(&self) -> AppResult<u64> {
        StaffApplication::find()
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete every application row.
    pub async fn delete_all(&self) -> AppResult<u64> {
        StaffApplication::delete_many()
            .exec(self.db.as_ref())
            .await
            .map(|res| res.rows_affected)
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
