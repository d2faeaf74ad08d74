//! Escalation entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// How an escalation came to exist.
#[derive(
    Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
#[derive(Default)]
pub enum EscalationType {
    /// Raised by a user through the API.
    #[sea_orm(string_value = "manual")]
    #[default]
    Manual,
    /// Raised by the overdue-complaint sweep.
    #[sea_orm(string_value = "automatic")]
    Automatic,
    /// Raised because of complaint priority.
    #[sea_orm(string_value = "priority")]
    Priority,
}

/// Escalation model.
///
/// At most one active escalation may exist per complaint; a partial unique
/// index on `(complaint_id) WHERE is_active` enforces this.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "escalation")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    pub complaint_id: String,

    /// Who escalated. NULL for system-generated escalations.
    #[sea_orm(nullable)]
    pub escalated_by_id: Option<String>,

    /// Authority the complaint was escalated to.
    pub escalated_to_id: String,

    #[sea_orm(column_type = "Text")]
    pub reason: String,

    pub escalation_type: EscalationType,

    #[sea_orm(default_value = true)]
    pub is_active: bool,

    pub created_at: DateTimeWithTimeZone,

    #[sea_orm(nullable)]
    pub resolved_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::complaint::Entity",
        from = "Column::ComplaintId",
        to = "super::complaint::Column::Id",
        on_delete = "Cascade"
    )]
    Complaint,
}

impl Related<super::complaint::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Complaint.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
