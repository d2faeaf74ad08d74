//! Attachment handling: validation, disk storage, visibility.

use chrono::{DateTime, Utc};
use resolveit_common::{AppError, AppResult, IdGenerator};
use resolveit_db::{
    entities::{
        complaint_file::{self, FileCategory},
        user::Role,
    },
    repositories::{ComplaintFileRepository, ComplaintRepository},
};
use sea_orm::Set;
use std::path::{Path, PathBuf};

use crate::permissions::{Action, RolePermissions};

const MAX_IMAGE_BYTES: i64 = 5 * 1024 * 1024;
const MAX_DOCUMENT_BYTES: i64 = 10 * 1024 * 1024;
const MAX_VIDEO_BYTES: i64 = 50 * 1024 * 1024;

const IMAGE_TYPES: [&str; 5] = [
    "image/jpeg",
    "image/jpg",
    "image/png",
    "image/gif",
    "image/webp",
];
const DOCUMENT_TYPES: [&str; 4] = [
    "application/pdf",
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    "text/plain",
];
const VIDEO_TYPES: [&str; 5] = [
    "video/mp4",
    "video/avi",
    "video/mov",
    "video/wmv",
    "video/webm",
];

/// File service for attachment business logic.
#[derive(Clone)]
pub struct FileService {
    file_repo: ComplaintFileRepository,
    complaint_repo: ComplaintRepository,
    upload_dir: PathBuf,
    id_gen: IdGenerator,
}

impl FileService {
    /// Create a new file service.
    #[must_use]
    pub fn new(
        file_repo: ComplaintFileRepository,
        complaint_repo: ComplaintRepository,
        upload_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            file_repo,
            complaint_repo,
            upload_dir: upload_dir.into(),
            id_gen: IdGenerator::new(),
        }
    }

    /// Validate, write to disk, and record one attachment.
    pub async fn store(
        &self,
        complaint_id: &str,
        original_file_name: &str,
        content_type: &str,
        data: &[u8],
    ) -> AppResult<complaint_file::Model> {
        // Complaint must exist before anything touches the disk.
        self.complaint_repo.get_by_id(complaint_id).await?;

        let size = i64::try_from(data.len())
            .map_err(|_| AppError::BadRequest("File too large".to_string()))?;
        let (category, admin_only) = classify(content_type, size)?;

        let file_name = stored_file_name(Utc::now(), &self.id_gen.generate_file_suffix(), original_file_name);
        let dir = self.upload_dir.join("complaints").join(complaint_id);
        tokio::fs::create_dir_all(&dir).await?;

        let path = dir.join(&file_name);
        tokio::fs::write(&path, data).await?;

        let model = complaint_file::ActiveModel {
            id: Set(self.id_gen.generate()),
            complaint_id: Set(complaint_id.to_string()),
            file_name: Set(file_name),
            original_file_name: Set(original_file_name.to_string()),
            file_path: Set(path.to_string_lossy().into_owned()),
            file_type: Set(content_type.to_string()),
            file_category: Set(category),
            file_size: Set(size),
            admin_only: Set(admin_only),
            uploaded_at: Set(Utc::now().into()),
        };

        let record = self.file_repo.create(model).await?;
        tracing::info!(
            complaint_id = %complaint_id,
            file_id = %record.id,
            size = size,
            category = ?category,
            "Stored attachment"
        );
        Ok(record)
    }

    /// List a complaint's files visible to the given role.
    ///
    /// Admins see everything; everyone else only non-admin-only files.
    pub async fn list_visible(
        &self,
        complaint_id: &str,
        role: Role,
    ) -> AppResult<Vec<complaint_file::Model>> {
        self.complaint_repo.get_by_id(complaint_id).await?;

        let files = self.file_repo.find_by_complaint(complaint_id).await?;
        if role.allows(Action::ViewAdminOnlyFiles) {
            return Ok(files);
        }
        Ok(files.into_iter().filter(|f| !f.admin_only).collect())
    }

    /// Load a file's record and contents for download.
    pub async fn open_for_download(
        &self,
        file_id: &str,
        role: Role,
    ) -> AppResult<(complaint_file::Model, Vec<u8>)> {
        let record = self.file_repo.get_by_id(file_id).await?;

        if record.admin_only && !role.allows(Action::ViewAdminOnlyFiles) {
            return Err(AppError::Forbidden(
                "This file is restricted to admins".to_string(),
            ));
        }

        let data = tokio::fs::read(&record.file_path).await?;
        Ok((record, data))
    }

    /// Delete a file from disk and the database. Admin only.
    pub async fn delete(&self, file_id: &str, role: Role) -> AppResult<()> {
        if !role.allows(Action::DeleteComplaintFile) {
            return Err(AppError::Forbidden(
                "Only admins can delete files".to_string(),
            ));
        }

        let record = self.file_repo.get_by_id(file_id).await?;

        if let Err(e) = tokio::fs::remove_file(&record.file_path).await {
            // The row still goes away; an orphaned disk file beats a
            // dangling record pointing at nothing.
            tracing::warn!(file_id = %file_id, error = %e, "Failed to remove file from disk");
        }

        self.file_repo.delete(record).await?;
        tracing::info!(file_id = %file_id, "Deleted attachment");
        Ok(())
    }
}

/// Validate a MIME type and size against the upload rules.
///
/// Returns the file category and whether the file is admin-only (forced for
/// PDFs and all videos).
pub fn classify(content_type: &str, size: i64) -> AppResult<(FileCategory, bool)> {
    let content_type = content_type.to_lowercase();

    let (category, limit) = if IMAGE_TYPES.contains(&content_type.as_str()) {
        (FileCategory::Image, MAX_IMAGE_BYTES)
    } else if DOCUMENT_TYPES.contains(&content_type.as_str()) {
        (FileCategory::Document, MAX_DOCUMENT_BYTES)
    } else if VIDEO_TYPES.contains(&content_type.as_str()) {
        (FileCategory::Video, MAX_VIDEO_BYTES)
    } else {
        return Err(AppError::BadRequest(format!(
            "File type {content_type} is not allowed"
        )));
    };

    if size > limit {
        return Err(AppError::BadRequest(format!(
            "File exceeds the {} MB limit for its type",
            limit / (1024 * 1024)
        )));
    }

    let admin_only =
        content_type == "application/pdf" || matches!(category, FileCategory::Video);
    Ok((category, admin_only))
}

/// Build the on-disk file name: `yyyyMMdd_HHmmss_{suffix}{ext}`.
fn stored_file_name(now: DateTime<Utc>, suffix: &str, original: &str) -> String {
    let ext = Path::new(original)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{}", e.to_lowercase()))
        .unwrap_or_default();

    format!("{}_{}{}", now.format("%Y%m%d_%H%M%S"), suffix, ext)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_classify_image() {
        let (category, admin_only) = classify("image/png", 1024).unwrap();
        assert_eq!(category, FileCategory::Image);
        assert!(!admin_only);
    }

    #[test]
    fn test_classify_pdf_is_admin_only() {
        let (category, admin_only) = classify("application/pdf", 1024).unwrap();
        assert_eq!(category, FileCategory::Document);
        assert!(admin_only);
    }

    #[test]
    fn test_classify_plain_document_is_public() {
        let (category, admin_only) = classify("text/plain", 1024).unwrap();
        assert_eq!(category, FileCategory::Document);
        assert!(!admin_only);
    }

    #[test]
    fn test_classify_video_is_admin_only() {
        let (category, admin_only) = classify("video/mp4", 1024).unwrap();
        assert_eq!(category, FileCategory::Video);
        assert!(admin_only);
    }

    #[test]
    fn test_classify_size_limits() {
        assert!(classify("image/png", MAX_IMAGE_BYTES).is_ok());
        assert!(classify("image/png", MAX_IMAGE_BYTES + 1).is_err());
        assert!(classify("application/pdf", MAX_DOCUMENT_BYTES + 1).is_err());
        assert!(classify("video/mp4", MAX_VIDEO_BYTES).is_ok());
        assert!(classify("video/mp4", MAX_VIDEO_BYTES + 1).is_err());
    }

    #[test]
    fn test_classify_rejects_unknown_type() {
        assert!(classify("application/zip", 10).is_err());
        assert!(classify("image/tiff", 10).is_err());
    }

    #[test]
    fn test_stored_file_name_format() {
        let now = Utc.with_ymd_and_hms(2026, 3, 14, 9, 26, 53).unwrap();
        let name = stored_file_name(now, "deadbeef", "Report.PDF");
        assert_eq!(name, "20260314_092653_deadbeef.pdf");
    }

    #[test]
    fn test_stored_file_name_without_extension() {
        let now = Utc.with_ymd_and_hms(2026, 3, 14, 9, 26, 53).unwrap();
        let name = stored_file_name(now, "deadbeef", "notes");
        assert_eq!(name, "20260314_092653_deadbeef");
    }
}
