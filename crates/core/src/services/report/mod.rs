//! Report generation and export.
//!
//! Aggregation is a pure function over flattened report rows; the service
//! only assembles rows from the database and picks an output format.

pub mod pdf;

use chrono::{DateTime, FixedOffset};
use resolveit_common::{AppError, AppResult};
use resolveit_db::{
    entities::{complaint, complaint_status, user},
    repositories::{ComplaintRepository, ComplaintStatusRepository, UserRepository},
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::services::status;

/// Shown when a breakdown has nothing to show.
const EMPTY_PLACEHOLDER: &str = "N/A";

/// One complaint flattened for reporting.
#[derive(Debug, Clone)]
pub struct ReportRow {
    /// Complaint ID.
    pub id: String,
    /// Title.
    pub title: String,
    /// Category label.
    pub category: String,
    /// Status code, empty when unset.
    pub status_code: String,
    /// Status display name, empty when unset.
    pub status_display: String,
    /// Owner name or "Anonymous".
    pub raised_by: String,
    /// Assigned staff: (id, name).
    pub assigned_to: Option<(String, String)>,
    /// Submission time.
    pub created_at: DateTime<FixedOffset>,
}

/// A name with an occurrence count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BreakdownEntry {
    /// Category or status name.
    pub name: String,
    /// Number of complaints.
    pub count: u64,
}

/// Aggregated report.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportSummary {
    /// Total complaints in scope.
    pub total: u64,
    /// Complaints in RESOLVED or CLOSED.
    pub resolved: u64,
    /// Everything else.
    pub pending: u64,
    /// Integer percentage: `resolved * 100 / total`, 0 when empty.
    pub resolution_rate: u64,
    /// Categories sorted by count, descending.
    pub category_breakdown: Vec<BreakdownEntry>,
    /// Statuses sorted by count, descending.
    pub status_breakdown: Vec<BreakdownEntry>,
    /// Most common category, "N/A" when empty.
    pub top_category: String,
    /// Distinct staff members with at least one assignment.
    pub assigned_staff_count: u64,
}

/// Export output format.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ExportFormat {
    /// Comma-separated values.
    Csv,
    /// Portable document format.
    Pdf,
}

/// A rendered export ready to hand to the HTTP layer.
#[derive(Debug, Clone)]
pub struct ExportedReport {
    /// Suggested download file name.
    pub file_name: String,
    /// MIME type.
    pub content_type: &'static str,
    /// Rendered bytes.
    pub bytes: Vec<u8>,
}

/// Report service for business logic.
#[derive(Clone)]
pub struct ReportService {
    complaint_repo: ComplaintRepository,
    status_repo: ComplaintStatusRepository,
    user_repo: UserRepository,
}

impl ReportService {
    /// Create a new report service.
    #[must_use]
    pub const fn new(
        complaint_repo: ComplaintRepository,
        status_repo: ComplaintStatusRepository,
        user_repo: UserRepository,
    ) -> Self {
        Self {
            complaint_repo,
            status_repo,
            user_repo,
        }
    }

    /// Generate a summary, optionally scoped to one category.
    pub async fn generate(&self, category: Option<&str>) -> AppResult<ReportSummary> {
        let rows = self.build_rows(category).await?;
        Ok(summarize(&rows))
    }

    /// Render an export in the requested format.
    pub async fn export(
        &self,
        category: Option<&str>,
        format: ExportFormat,
    ) -> AppResult<ExportedReport> {
        let rows = self.build_rows(category).await?;

        match format {
            ExportFormat::Csv => Ok(ExportedReport {
                file_name: "complaint_report.csv".to_string(),
                content_type: "text/csv",
                bytes: to_csv(&rows)?,
            }),
            ExportFormat::Pdf => {
                let summary = summarize(&rows);
                Ok(ExportedReport {
                    file_name: "complaint_report.pdf".to_string(),
                    content_type: "application/pdf",
                    bytes: to_pdf(&summary, &rows),
                })
            }
        }
    }

    async fn build_rows(&self, category: Option<&str>) -> AppResult<Vec<ReportRow>> {
        let complaints = match category {
            Some(c) => self.complaint_repo.find_by_category(c).await?,
            None => self.complaint_repo.find_all().await?,
        };

        let statuses: HashMap<String, complaint_status::Model> = self
            .status_repo
            .find_all()
            .await?
            .into_iter()
            .map(|s| (s.id.clone(), s))
            .collect();

        let mut user_ids: Vec<String> = complaints
            .iter()
            .flat_map(|c| {
                let owner = if c.anonymous { None } else { c.user_id.clone() };
                owner.into_iter().chain(c.assigned_to_id.clone())
            })
            .collect();
        user_ids.sort_unstable();
        user_ids.dedup();

        let users: HashMap<String, user::Model> = self
            .user_repo
            .find_by_ids(&user_ids)
            .await?
            .into_iter()
            .map(|u| (u.id.clone(), u))
            .collect();

        Ok(complaints
            .into_iter()
            .map(|c| build_row(&c, &statuses, &users))
            .collect())
    }
}

fn build_row(
    complaint: &complaint::Model,
    statuses: &HashMap<String, complaint_status::Model>,
    users: &HashMap<String, user::Model>,
) -> ReportRow {
    let status = complaint.status_id.as_ref().and_then(|id| statuses.get(id));
    let raised_by = if complaint.anonymous {
        "Anonymous".to_string()
    } else {
        complaint
            .user_id
            .as_ref()
            .and_then(|id| users.get(id))
            .map_or_else(|| "Anonymous".to_string(), |u| u.full_name.clone())
    };
    let assigned_to = complaint
        .assigned_to_id
        .as_ref()
        .and_then(|id| users.get(id))
        .map(|u| (u.id.clone(), u.full_name.clone()));

    ReportRow {
        id: complaint.id.clone(),
        title: complaint.title.clone(),
        category: complaint.category.clone(),
        status_code: status.map(|s| s.code.clone()).unwrap_or_default(),
        status_display: status.map(|s| s.display.clone()).unwrap_or_default(),
        raised_by,
        assigned_to,
        created_at: complaint.created_at,
    }
}

/// Aggregate rows into a summary. Pure.
#[must_use]
pub fn summarize(rows: &[ReportRow]) -> ReportSummary {
    let total = rows.len() as u64;
    let resolved = rows
        .iter()
        .filter(|r| status::CLOSED_CODES.contains(&r.status_code.as_str()))
        .count() as u64;
    let pending = total - resolved;
    let resolution_rate = if total == 0 { 0 } else { resolved * 100 / total };

    let category_breakdown = count_by(rows.iter().map(|r| r.category.as_str()));
    let status_breakdown = count_by(rows.iter().map(|r| {
        if r.status_display.is_empty() {
            EMPTY_PLACEHOLDER
        } else {
            r.status_display.as_str()
        }
    }));

    let top_category = category_breakdown
        .first()
        .map_or_else(|| EMPTY_PLACEHOLDER.to_string(), |e| e.name.clone());

    let mut staff_ids: Vec<&str> = rows
        .iter()
        .filter_map(|r| r.assigned_to.as_ref().map(|(id, _)| id.as_str()))
        .collect();
    staff_ids.sort_unstable();
    staff_ids.dedup();

    ReportSummary {
        total,
        resolved,
        pending,
        resolution_rate,
        category_breakdown,
        status_breakdown,
        top_category,
        assigned_staff_count: staff_ids.len() as u64,
    }
}

/// Count occurrences, sorted by count descending then name for stability.
fn count_by<'a>(names: impl Iterator<Item = &'a str>) -> Vec<BreakdownEntry> {
    let mut counts: HashMap<&str, u64> = HashMap::new();
    for name in names {
        *counts.entry(name).or_default() += 1;
    }

    let mut entries: Vec<BreakdownEntry> = counts
        .into_iter()
        .map(|(name, count)| BreakdownEntry {
            name: name.to_string(),
            count,
        })
        .collect();
    entries.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.name.cmp(&b.name)));
    entries
}

/// Render rows as CSV. The writer handles quoting.
pub fn to_csv(rows: &[ReportRow]) -> AppResult<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    writer
        .write_record([
            "ID",
            "Title",
            "Category",
            "Status",
            "Raised By",
            "Assigned To",
            "Created Date",
        ])
        .map_err(|e| AppError::Internal(format!("CSV write failed: {e}")))?;

    for row in rows {
        writer
            .write_record([
                row.id.as_str(),
                row.title.as_str(),
                row.category.as_str(),
                row.status_display.as_str(),
                row.raised_by.as_str(),
                row.assigned_to
                    .as_ref()
                    .map_or("Unassigned", |(_, name)| name.as_str()),
                &row.created_at.format("%Y-%m-%d %H:%M").to_string(),
            ])
            .map_err(|e| AppError::Internal(format!("CSV write failed: {e}")))?;
    }

    writer
        .into_inner()
        .map_err(|e| AppError::Internal(format!("CSV write failed: {e}")))
}

/// Render summary and rows as a simple PDF table document.
#[must_use]
pub fn to_pdf(summary: &ReportSummary, rows: &[ReportRow]) -> Vec<u8> {
    let mut lines = vec![
        format!("Total complaints: {}", summary.total),
        format!("Resolved: {}", summary.resolved),
        format!("Pending: {}", summary.pending),
        format!("Resolution rate: {}%", summary.resolution_rate),
        format!("Top category: {}", summary.top_category),
        format!("Assigned staff: {}", summary.assigned_staff_count),
        String::new(),
        format!(
            "{:<28} {:<16} {:<14} {:<20}",
            "Title", "Category", "Status", "Raised By"
        ),
        "-".repeat(80),
    ];

    for row in rows {
        lines.push(format!(
            "{:<28} {:<16} {:<14} {:<20}",
            truncate(&row.title, 28),
            truncate(&row.category, 16),
            truncate(&row.status_display, 14),
            truncate(&row.raised_by, 20),
        ));
    }

    pdf::render_text_document("Complaint Report", &lines)
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let cut: String = text.chars().take(max.saturating_sub(1)).collect();
        format!("{cut}~")
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn row(category: &str, status_code: &str, assigned: Option<&str>) -> ReportRow {
        ReportRow {
            id: "c1".to_string(),
            title: "A complaint".to_string(),
            category: category.to_string(),
            status_code: status_code.to_string(),
            status_display: status::display_for_code(status_code),
            raised_by: "Alice".to_string(),
            assigned_to: assigned.map(|id| (id.to_string(), format!("Staff {id}"))),
            created_at: Utc::now().into(),
        }
    }

    #[test]
    fn test_resolution_rate_is_integer_percentage() {
        let rows: Vec<ReportRow> = (0..7)
            .map(|i| row("IT", if i < 3 { "RESOLVED" } else { "OPEN" }, None))
            .collect();
        let summary = summarize(&rows);

        assert_eq!(summary.total, 7);
        assert_eq!(summary.resolved, 3);
        assert_eq!(summary.pending, 4);
        assert_eq!(summary.resolution_rate, 42);
    }

    #[test]
    fn test_empty_report() {
        let summary = summarize(&[]);
        assert_eq!(summary.total, 0);
        assert_eq!(summary.resolution_rate, 0);
        assert_eq!(summary.top_category, "N/A");
        assert!(summary.category_breakdown.is_empty());
    }

    #[test]
    fn test_closed_counts_as_resolved() {
        let rows = [row("IT", "CLOSED", None), row("IT", "UNDER_REVIEW", None)];
        let summary = summarize(&rows);
        assert_eq!(summary.resolved, 1);
        assert_eq!(summary.pending, 1);
    }

    #[test]
    fn test_category_breakdown_sorted_by_count() {
        let rows = [
            row("Facilities", "OPEN", None),
            row("IT", "OPEN", None),
            row("IT", "OPEN", None),
        ];
        let summary = summarize(&rows);

        assert_eq!(summary.category_breakdown[0].name, "IT");
        assert_eq!(summary.category_breakdown[0].count, 2);
        assert_eq!(summary.top_category, "IT");
    }

    #[test]
    fn test_assigned_staff_counted_distinct() {
        let rows = [
            row("IT", "OPEN", Some("s1")),
            row("IT", "OPEN", Some("s1")),
            row("IT", "OPEN", Some("s2")),
            row("IT", "OPEN", None),
        ];
        let summary = summarize(&rows);
        assert_eq!(summary.assigned_staff_count, 2);
    }

    #[test]
    fn test_csv_header_and_quoting() {
        let mut quoted = row("IT", "OPEN", Some("s1"));
        quoted.title = "Printer, broken".to_string();
        let bytes = to_csv(&[quoted]).unwrap();
        let text = String::from_utf8(bytes).unwrap();

        assert!(text.starts_with("ID,Title,Category,Status,Raised By,Assigned To,Created Date"));
        assert!(text.contains("\"Printer, broken\""));
        assert!(text.contains("Staff s1"));
    }

    #[test]
    fn test_pdf_contains_summary() {
        let rows = [row("IT", "RESOLVED", None)];
        let summary = summarize(&rows);
        let doc = to_pdf(&summary, &rows);
        let text = String::from_utf8_lossy(&doc);

        assert!(text.contains("Resolution rate: 100%"));
    }
}
