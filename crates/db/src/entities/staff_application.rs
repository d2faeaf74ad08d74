//! Staff application entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Review status of a staff application.
#[derive(
    Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
#[derive(Default)]
pub enum ApplicationStatus {
    #[sea_orm(string_value = "pending")]
    #[default]
    Pending,
    #[sea_orm(string_value = "approved")]
    Approved,
    #[sea_orm(string_value = "rejected")]
    Rejected,
}

/// Staff application model.
///
/// One pending application per user; a partial unique index on
/// `(user_id) WHERE status = 'pending'` enforces this.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "staff_application")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    pub user_id: String,

    /// Complaint categories the applicant wants to handle.
    pub categories: String,

    #[sea_orm(column_type = "Text")]
    pub experience: String,

    #[sea_orm(column_type = "Text")]
    pub skills: String,

    pub availability: String,

    #[sea_orm(column_type = "Text")]
    pub motivation: String,

    #[sea_orm(column_type = "Text", nullable)]
    pub previous_experience: Option<String>,

    pub status: ApplicationStatus,

    /// Admin who reviewed the application.
    #[sea_orm(nullable)]
    pub reviewed_by_id: Option<String>,

    #[sea_orm(nullable)]
    pub reviewed_at: Option<DateTimeWithTimeZone>,

    #[sea_orm(column_type = "Text", nullable)]
    pub admin_notes: Option<String>,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    User,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
