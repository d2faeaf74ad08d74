//! Complaint file entity (uploaded attachments).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Broad category of an uploaded file, derived from its MIME type.
#[derive(
    Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
pub enum FileCategory {
    #[sea_orm(string_value = "image")]
    Image,
    #[sea_orm(string_value = "document")]
    Document,
    #[sea_orm(string_value = "video")]
    Video,
}

/// Complaint file model.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "complaint_file")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    pub complaint_id: String,

    /// Stored file name (timestamp + random suffix).
    pub file_name: String,

    /// Name the client uploaded.
    pub original_file_name: String,

    /// Absolute path on disk.
    pub file_path: String,

    /// MIME type.
    pub file_type: String,

    pub file_category: FileCategory,

    /// Size in bytes.
    pub file_size: i64,

    /// Visible only to admins (forced for PDFs and videos).
    #[sea_orm(default_value = false)]
    pub admin_only: bool,

    pub uploaded_at: DateTimeWithTimeZone,
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
