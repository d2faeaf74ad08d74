//! Complaint entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Complaint model.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "complaint")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// Short summary.
    pub title: String,

    /// Full description.
    #[sea_orm(column_type = "Text")]
    pub description: String,

    /// Free-form category label.
    pub category: String,

    /// Anonymous complaints never expose their owner.
    #[sea_orm(default_value = false)]
    pub anonymous: bool,

    /// Owner. NULL for unauthenticated or anonymous submissions.
    #[sea_orm(nullable)]
    pub user_id: Option<String>,

    /// Staff member currently assigned.
    #[sea_orm(nullable)]
    pub assigned_to_id: Option<String>,

    /// Current workflow status.
    #[sea_orm(nullable)]
    pub status_id: Option<String>,

    pub created_at: DateTimeWithTimeZone,

    #[sea_orm(nullable)]
    pub updated_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_delete = "SetNull"
    )]
    User,

    #[sea_orm(
        belongs_to = "super::complaint_status::Entity",
        from = "Column::StatusId",
        to = "super::complaint_status::Column::Id",
        on_delete = "SetNull"
    )]
    Status,

    #[sea_orm(has_many = "super::complaint_file::Entity")]
    Files,

    #[sea_orm(has_many = "super::escalation::Entity")]
    Escalations,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::complaint_status::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Status.def()
    }
}

impl Related<super::complaint_file::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Files.def()
    }
}

impl Related<super::escalation::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Escalations.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
