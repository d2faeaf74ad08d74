//! User entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// User role, ordered from least to most privileged.
#[derive(
    Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter, DeriveActiveEnum,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
#[derive(Default)]
pub enum Role {
    /// Regular complaint-raising user.
    #[sea_orm(string_value = "user")]
    #[default]
    User,
    /// Staff member who handles assigned complaints.
    #[sea_orm(string_value = "staff")]
    Staff,
    /// Manager, a valid escalation target.
    #[sea_orm(string_value = "manager")]
    Manager,
    /// Administrator.
    #[sea_orm(string_value = "admin")]
    Admin,
    /// Super administrator (database reset, final escalation target).
    #[sea_orm(string_value = "superadmin")]
    SuperAdmin,
}

/// User model.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// Full display name.
    pub full_name: String,

    /// Login identifier, also the JWT subject.
    #[sea_orm(unique)]
    pub email: String,

    /// Argon2 password hash.
    pub password_hash: String,

    /// Access role.
    pub role: Role,

    pub created_at: DateTimeWithTimeZone,

    #[sea_orm(nullable)]
    pub updated_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::complaint::Entity")]
    Complaints,

    #[sea_orm(has_many = "super::staff_application::Entity")]
    StaffApplications,
}

impl Related<super::complaint::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Complaints.def()
    }
}

impl Related<super::staff_application::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::StaffApplications.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
