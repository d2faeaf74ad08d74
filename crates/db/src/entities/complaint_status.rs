//! Complaint status entity.
//!
//! Statuses are rows, not an enum: new codes are created on demand so the
//! workflow can grow without a migration. Display names for well-known codes
//! live in the core status service.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Complaint status model.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "complaint_status")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// Upper-case status code, e.g. `NEW`, `IN_PROGRESS`.
    #[sea_orm(unique)]
    pub code: String,

    /// Human-readable name, e.g. "In Progress".
    pub display: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::complaint::Entity")]
    Complaints,
}

impl Related<super::complaint::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Complaints.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
