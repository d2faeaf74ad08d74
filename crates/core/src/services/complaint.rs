//! Complaint service: submission, status workflow, assignment, stats.

use chrono::{Duration, Utc};
use resolveit_common::{AppError, AppResult, IdGenerator};
use resolveit_db::{
    entities::{
        complaint, complaint_status,
        user::{self, Role},
    },
    repositories::{
        ComplaintRepository, ComplaintStatusRepository, EscalationRepository, UserRepository,
    },
};
use sea_orm::Set;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::permissions::{Action, RolePermissions};
use crate::services::{notification::NotificationService, status};

/// Name shown in place of the owner for anonymous complaints.
const ANONYMOUS_NAME: &str = "Anonymous";

/// Complaint service for business logic.
#[derive(Clone)]
pub struct ComplaintService {
    complaint_repo: ComplaintRepository,
    status_repo: ComplaintStatusRepository,
    user_repo: UserRepository,
    escalation_repo: EscalationRepository,
    notifications: NotificationService,
    id_gen: IdGenerator,
}

/// Input for submitting a complaint.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitComplaintInput {
    /// Short summary.
    pub title: String,
    /// Full description.
    pub description: String,
    /// Category label.
    pub category: String,
    /// Hide the owner in all responses.
    #[serde(default)]
    pub anonymous: bool,
}

/// Status as exposed in responses.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusView {
    /// Status code.
    pub code: String,
    /// Human-readable name.
    pub display: String,
}

/// Assignee as exposed in responses.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssigneeView {
    /// Staff user ID.
    pub id: String,
    /// Staff display name.
    pub name: String,
}

/// Complaint as exposed in responses.
///
/// Anonymous complaints report their owner as "Anonymous" and carry no owner
/// ID anywhere in the payload.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplaintView {
    /// Complaint ID.
    pub id: String,
    /// Short summary.
    pub title: String,
    /// Full description.
    pub description: String,
    /// Category label.
    pub category: String,
    /// Whether the complaint is anonymous.
    pub anonymous: bool,
    /// Current status, if one has been set.
    pub status: Option<StatusView>,
    /// Owner display name, or "Anonymous".
    pub raised_by: String,
    /// Assigned staff member, if any.
    pub assigned_to: Option<AssigneeView>,
    /// Submission time.
    pub created_at: chrono::DateTime<chrono::FixedOffset>,
    /// Last update time.
    pub updated_at: Option<chrono::DateTime<chrono::FixedOffset>>,
}

/// Per-status complaint count.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusCount {
    /// Status code.
    pub code: String,
    /// Human-readable name.
    pub display: String,
    /// Number of complaints in this status.
    pub count: u64,
}

/// Dashboard statistics.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplaintStats {
    /// Total number of complaints.
    pub total: u64,
    /// Per-status counts.
    pub by_status: Vec<StatusCount>,
    /// Complaints submitted in the last seven days.
    pub recent: u64,
}

impl ComplaintService {
    /// Create a new complaint service.
    #[must_use]
    pub fn new(
        complaint_repo: ComplaintRepository,
        status_repo: ComplaintStatusRepository,
        user_repo: UserRepository,
        escalation_repo: EscalationRepository,
        notifications: NotificationService,
    ) -> Self {
        Self {
            complaint_repo,
            status_repo,
            user_repo,
            escalation_repo,
            notifications,
            id_gen: IdGenerator::new(),
        }
    }

    /// Submit a new complaint.
    ///
    /// The owner is attached only when the caller is authenticated and the
    /// complaint is not anonymous.
    pub async fn submit(
        &self,
        input: SubmitComplaintInput,
        owner: Option<&user::Model>,
    ) -> AppResult<complaint::Model> {
        let (title, description, category) = validate_submission(&input)?;

        let new_status = self.get_or_create_status(status::NEW).await?;

        let user_id = if input.anonymous {
            None
        } else {
            owner.map(|u| u.id.clone())
        };

        let model = complaint::ActiveModel {
            id: Set(self.id_gen.generate()),
            title: Set(title),
            description: Set(description),
            category: Set(category),
            anonymous: Set(input.anonymous),
            user_id: Set(user_id),
            assigned_to_id: Set(None),
            status_id: Set(Some(new_status.id)),
            created_at: Set(Utc::now().into()),
            updated_at: Set(None),
        };

        let complaint = self.complaint_repo.create(model).await?;
        tracing::info!(complaint_id = %complaint.id, category = %complaint.category, "Complaint submitted");
        Ok(complaint)
    }

    /// Get a complaint by ID.
    pub async fn get(&self, id: &str) -> AppResult<complaint::Model> {
        self.complaint_repo.get_by_id(id).await
    }

    /// Get a complaint as a response view.
    pub async fn get_view(&self, id: &str) -> AppResult<ComplaintView> {
        let complaint = self.complaint_repo.get_by_id(id).await?;
        self.to_view(complaint).await
    }

    /// List all complaints as response views, newest first.
    pub async fn list_views(&self) -> AppResult<Vec<ComplaintView>> {
        let complaints = self.complaint_repo.find_all().await?;
        self.to_views(complaints).await
    }

    /// Move a complaint to the status named by `code`.
    ///
    /// This is the single authoritative transition: it creates the status row
    /// on demand, notifies the owner (unless anonymous), and on a terminal
    /// status additionally force-resolves any active escalation.
    pub async fn transition_status(
        &self,
        complaint_id: &str,
        code: &str,
    ) -> AppResult<complaint::Model> {
        let complaint = self.complaint_repo.get_by_id(complaint_id).await?;
        self.transition(complaint, code).await
    }

    async fn transition(
        &self,
        complaint: complaint::Model,
        code: &str,
    ) -> AppResult<complaint::Model> {
        let code = code.trim().to_uppercase();
        if code.is_empty() {
            return Err(AppError::Validation("Status code is required".to_string()));
        }

        let new_status = self.get_or_create_status(&code).await?;
        let is_terminal = status::CLOSED_CODES.contains(&code.as_str());

        let mut active: complaint::ActiveModel = complaint.clone().into();
        active.status_id = Set(Some(new_status.id.clone()));
        active.updated_at = Set(Some(Utc::now().into()));
        let updated = self.complaint_repo.update(active).await?;

        tracing::info!(complaint_id = %updated.id, status = %code, "Complaint status changed");

        if is_terminal {
            let resolved = self
                .escalation_repo
                .resolve_all_for_complaint(&updated.id, Utc::now().into())
                .await?;
            if resolved > 0 {
                tracing::info!(complaint_id = %updated.id, count = resolved, "Force-resolved active escalations");
            }
        }

        self.notify_owner_of_status(&updated, &new_status, is_terminal)
            .await?;

        Ok(updated)
    }

    async fn notify_owner_of_status(
        &self,
        complaint: &complaint::Model,
        new_status: &complaint_status::Model,
        is_terminal: bool,
    ) -> AppResult<()> {
        if complaint.anonymous {
            return Ok(());
        }
        let Some(owner_id) = &complaint.user_id else {
            return Ok(());
        };
        let Some(owner) = self.user_repo.find_by_id(owner_id).await? else {
            return Ok(());
        };

        let (subject, body) = if is_terminal {
            (
                format!("Your complaint \"{}\" has been resolved", complaint.title),
                format!(
                    "Hello {},\n\nYour complaint \"{}\" has been marked {}. \
                     Thank you for your patience.",
                    owner.full_name, complaint.title, new_status.display
                ),
            )
        } else {
            (
                format!("Your complaint \"{}\" was updated", complaint.title),
                format!(
                    "Hello {},\n\nThe status of your complaint \"{}\" is now {}.",
                    owner.full_name, complaint.title, new_status.display
                ),
            )
        };

        self.notifications.notify(&owner.email, &subject, &body).await;
        Ok(())
    }

    /// Assign a complaint to a staff member.
    ///
    /// Only admins may assign; the target must hold the STAFF role. A NEW (or
    /// status-less) complaint transitions to IN_PROGRESS first, so the owner
    /// is told the complaint is being worked on exactly once.
    pub async fn assign(
        &self,
        complaint_id: &str,
        staff_id: &str,
        actor: &user::Model,
    ) -> AppResult<complaint::Model> {
        if !actor.role.allows(Action::AssignComplaint) {
            return Err(AppError::Forbidden(
                "Only admins can assign complaints".to_string(),
            ));
        }

        let staff = self.user_repo.get_by_id(staff_id).await?;
        if staff.role != Role::Staff {
            return Err(AppError::BadRequest(
                "Assignee must be a staff member".to_string(),
            ));
        }

        let mut complaint = self.complaint_repo.get_by_id(complaint_id).await?;

        let needs_progress = match &complaint.status_id {
            None => true,
            Some(status_id) => match self.status_repo.find_by_id(status_id).await? {
                Some(s) => s.code == status::NEW,
                None => true,
            },
        };
        if needs_progress {
            complaint = self.transition(complaint, status::IN_PROGRESS).await?;
        }

        let mut active: complaint::ActiveModel = complaint.clone().into();
        active.assigned_to_id = Set(Some(staff.id.clone()));
        active.updated_at = Set(Some(Utc::now().into()));
        let updated = self.complaint_repo.update(active).await?;

        tracing::info!(complaint_id = %updated.id, staff_id = %staff.id, "Complaint assigned");

        self.notifications
            .notify(
                &staff.email,
                &format!("Complaint assigned to you: \"{}\"", updated.title),
                &format!(
                    "Hello {},\n\nThe complaint \"{}\" ({}) has been assigned to you.",
                    staff.full_name, updated.title, updated.category
                ),
            )
            .await;

        if !updated.anonymous {
            if let Some(owner_id) = &updated.user_id {
                if let Some(owner) = self.user_repo.find_by_id(owner_id).await? {
                    self.notifications
                        .notify(
                            &owner.email,
                            &format!("Your complaint \"{}\" has been assigned", updated.title),
                            &format!(
                                "Hello {},\n\nYour complaint \"{}\" is now being handled by {}.",
                                owner.full_name, updated.title, staff.full_name
                            ),
                        )
                        .await;
                }
            }
        }

        Ok(updated)
    }

    /// Resolve a complaint.
    ///
    /// Admins may resolve anything; staff only complaints assigned to
    /// themselves.
    pub async fn resolve(
        &self,
        complaint_id: &str,
        actor: &user::Model,
    ) -> AppResult<complaint::Model> {
        let complaint = self.complaint_repo.get_by_id(complaint_id).await?;

        let assigned_to_self = actor.role == Role::Staff
            && complaint.assigned_to_id.as_deref() == Some(actor.id.as_str());
        if !actor.role.allows(Action::ResolveAnyComplaint) && !assigned_to_self {
            return Err(AppError::Forbidden(
                "Only admins or the assigned staff member can resolve a complaint".to_string(),
            ));
        }

        self.transition(complaint, status::RESOLVED).await
    }

    /// Dashboard statistics: totals, per-status counts, last-7-days count.
    pub async fn stats(&self) -> AppResult<ComplaintStats> {
        let total = self.complaint_repo.count_all().await?;

        let mut by_status = Vec::new();
        for s in self.status_repo.find_all().await? {
            let count = self.complaint_repo.count_by_status(&s.id).await?;
            by_status.push(StatusCount {
                code: s.code,
                display: s.display,
                count,
            });
        }

        let week_ago = Utc::now() - Duration::days(7);
        let recent = self.complaint_repo.count_created_since(week_ago.into()).await?;

        Ok(ComplaintStats {
            total,
            by_status,
            recent,
        })
    }

    /// Status row for `code`, created on demand.
    pub async fn get_or_create_status(&self, code: &str) -> AppResult<complaint_status::Model> {
        self.status_repo
            .get_or_create(self.id_gen.generate(), code, &status::display_for_code(code))
            .await
    }

    /// Build a response view for one complaint.
    pub async fn to_view(&self, complaint: complaint::Model) -> AppResult<ComplaintView> {
        self.to_views(vec![complaint])
            .await?
            .pop()
            .ok_or_else(|| AppError::Internal("View construction dropped a complaint".to_string()))
    }

    /// Build response views for a batch of complaints.
    pub async fn to_views(
        &self,
        complaints: Vec<complaint::Model>,
    ) -> AppResult<Vec<ComplaintView>> {
        let statuses: HashMap<String, complaint_status::Model> = self
            .status_repo
            .find_all()
            .await?
            .into_iter()
            .map(|s| (s.id.clone(), s))
            .collect();

        let mut user_ids: Vec<String> = Vec::new();
        for c in &complaints {
            if !c.anonymous {
                if let Some(id) = &c.user_id {
                    user_ids.push(id.clone());
                }
            }
            if let Some(id) = &c.assigned_to_id {
                user_ids.push(id.clone());
            }
        }
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
            .map(|c| {
                let status_view = c
                    .status_id
                    .as_ref()
                    .and_then(|id| statuses.get(id))
                    .map(|s| StatusView {
                        code: s.code.clone(),
                        display: s.display.clone(),
                    });
                let owner_name = if c.anonymous {
                    None
                } else {
                    c.user_id
                        .as_ref()
                        .and_then(|id| users.get(id))
                        .map(|u| u.full_name.as_str())
                };
                let assignee = c
                    .assigned_to_id
                    .as_ref()
                    .and_then(|id| users.get(id))
                    .map(|u| (u.id.as_str(), u.full_name.as_str()));
                build_view(&c, status_view, owner_name, assignee)
            })
            .collect())
    }
}

/// Validate and trim a submission, naming the first missing field.
fn validate_submission(input: &SubmitComplaintInput) -> AppResult<(String, String, String)> {
    let title = input.title.trim();
    if title.is_empty() {
        return Err(AppError::Validation("Title is required".to_string()));
    }
    let description = input.description.trim();
    if description.is_empty() {
        return Err(AppError::Validation("Description is required".to_string()));
    }
    let category = input.category.trim();
    if category.is_empty() {
        return Err(AppError::Validation("Category is required".to_string()));
    }
    Ok((
        title.to_string(),
        description.to_string(),
        category.to_string(),
    ))
}

/// Assemble a view from already-resolved pieces.
fn build_view(
    complaint: &complaint::Model,
    status_view: Option<StatusView>,
    owner_name: Option<&str>,
    assignee: Option<(&str, &str)>,
) -> ComplaintView {
    ComplaintView {
        id: complaint.id.clone(),
        title: complaint.title.clone(),
        description: complaint.description.clone(),
        category: complaint.category.clone(),
        anonymous: complaint.anonymous,
        status: status_view,
        raised_by: owner_name.unwrap_or(ANONYMOUS_NAME).to_string(),
        assigned_to: assignee.map(|(id, name)| AssigneeView {
            id: id.to_string(),
            name: name.to_string(),
        }),
        created_at: complaint.created_at,
        updated_at: complaint.updated_at,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::services::email::RecordingMailer;
    use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase};
    use std::sync::Arc;

    fn sample_input() -> SubmitComplaintInput {
        SubmitComplaintInput {
            title: "  Broken printer  ".to_string(),
            description: "The 3rd floor printer jams on every job.".to_string(),
            category: "Facilities".to_string(),
            anonymous: false,
        }
    }

    fn sample_complaint(anonymous: bool) -> complaint::Model {
        complaint::Model {
            id: "c1".to_string(),
            title: "Broken printer".to_string(),
            description: "It jams.".to_string(),
            category: "Facilities".to_string(),
            anonymous,
            user_id: Some("u1".to_string()),
            assigned_to_id: None,
            status_id: None,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    #[test]
    fn test_validate_trims_fields() {
        let (title, description, category) = validate_submission(&sample_input()).unwrap();
        assert_eq!(title, "Broken printer");
        assert_eq!(description, "The 3rd floor printer jams on every job.");
        assert_eq!(category, "Facilities");
    }

    #[test]
    fn test_validate_names_the_missing_field() {
        let mut input = sample_input();
        input.title = "   ".to_string();
        let err = validate_submission(&input).unwrap_err();
        assert!(err.to_string().contains("Title"));

        let mut input = sample_input();
        input.description = String::new();
        let err = validate_submission(&input).unwrap_err();
        assert!(err.to_string().contains("Description"));

        let mut input = sample_input();
        input.category = "\t".to_string();
        let err = validate_submission(&input).unwrap_err();
        assert!(err.to_string().contains("Category"));
    }

    #[test]
    fn test_anonymous_view_masks_owner() {
        let complaint = sample_complaint(true);
        let view = build_view(&complaint, None, None, None);

        assert_eq!(view.raised_by, "Anonymous");
        assert!(!serde_json::to_string(&view).unwrap().contains("u1"));
    }

    #[test]
    fn test_named_view_shows_owner() {
        let complaint = sample_complaint(false);
        let view = build_view(&complaint, None, Some("Alice Example"), None);

        assert_eq!(view.raised_by, "Alice Example");
    }

    #[test]
    fn test_view_carries_status_and_assignee() {
        let mut complaint = sample_complaint(false);
        complaint.assigned_to_id = Some("s1".to_string());
        let view = build_view(
            &complaint,
            Some(StatusView {
                code: "IN_PROGRESS".to_string(),
                display: "In Progress".to_string(),
            }),
            Some("Alice Example"),
            Some(("s1", "Sam Staff")),
        );

        assert_eq!(view.status.unwrap().display, "In Progress");
        assert_eq!(view.assigned_to.unwrap().name, "Sam Staff");
    }

    fn user_fixture(id: &str, name: &str, role: Role) -> user::Model {
        user::Model {
            id: id.to_string(),
            full_name: name.to_string(),
            email: format!("{id}@example.com"),
            password_hash: "hash".to_string(),
            role,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    fn status_fixture(id: &str, code: &str, display: &str) -> complaint_status::Model {
        complaint_status::Model {
            id: id.to_string(),
            code: code.to_string(),
            display: display.to_string(),
        }
    }

    fn mock_service(conn: DatabaseConnection, mailer: Arc<RecordingMailer>) -> ComplaintService {
        let conn = Arc::new(conn);
        ComplaintService::new(
            ComplaintRepository::new(Arc::clone(&conn)),
            ComplaintStatusRepository::new(Arc::clone(&conn)),
            UserRepository::new(Arc::clone(&conn)),
            EscalationRepository::new(Arc::clone(&conn)),
            NotificationService::new(mailer),
        )
    }

    #[tokio::test]
    async fn test_assign_requires_admin() {
        let conn = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let service = mock_service(conn, Arc::new(RecordingMailer::new()));
        let actor = user_fixture("s9", "Sam Staff", Role::Staff);

        let err = service.assign("c1", "s1", &actor).await.unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }

    #[tokio::test]
    async fn test_assign_rejects_non_staff_target() {
        let conn = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![user_fixture("m1", "Mia Manager", Role::Manager)]])
            .into_connection();
        let service = mock_service(conn, Arc::new(RecordingMailer::new()));
        let admin = user_fixture("a1", "Ada Admin", Role::Admin);

        let err = service.assign("c1", "m1", &admin).await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[tokio::test]
    async fn test_assign_moves_new_complaint_to_in_progress() {
        let staff = user_fixture("s1", "Sam Staff", Role::Staff);
        let owner = user_fixture("u1", "Alice Example", Role::User);

        let mut submitted = sample_complaint(false);
        submitted.status_id = Some("st-new".to_string());
        let mut in_progress = submitted.clone();
        in_progress.status_id = Some("st-ip".to_string());
        let mut assigned = in_progress.clone();
        assigned.assigned_to_id = Some("s1".to_string());

        let conn = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![staff]])
            .append_query_results([vec![submitted]])
            .append_query_results([vec![status_fixture("st-new", "NEW", "New")]])
            .append_query_results([vec![status_fixture("st-ip", "IN_PROGRESS", "In Progress")]])
            .append_query_results([vec![in_progress]])
            .append_query_results([vec![owner.clone()]])
            .append_query_results([vec![assigned]])
            .append_query_results([vec![owner]])
            .into_connection();

        let mailer = Arc::new(RecordingMailer::new());
        let service = mock_service(conn, Arc::clone(&mailer));
        let admin = user_fixture("a1", "Ada Admin", Role::Admin);

        let updated = service.assign("c1", "s1", &admin).await.unwrap();
        assert_eq!(updated.assigned_to_id.as_deref(), Some("s1"));
        assert_eq!(updated.status_id.as_deref(), Some("st-ip"));

        // One in-progress notice to the owner, one assignment email each way
        let sent = mailer.sent();
        assert_eq!(sent.len(), 3);
        let progress_notices = sent
            .iter()
            .filter(|m| m.subject.contains("was updated"))
            .count();
        assert_eq!(progress_notices, 1);
    }

    #[tokio::test]
    async fn test_assign_keeps_existing_in_progress_status() {
        let staff = user_fixture("s1", "Sam Staff", Role::Staff);
        let owner = user_fixture("u1", "Alice Example", Role::User);

        let mut working = sample_complaint(false);
        working.status_id = Some("st-ip".to_string());
        let mut assigned = working.clone();
        assigned.assigned_to_id = Some("s1".to_string());

        let conn = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![staff]])
            .append_query_results([vec![working]])
            .append_query_results([vec![status_fixture("st-ip", "IN_PROGRESS", "In Progress")]])
            .append_query_results([vec![assigned]])
            .append_query_results([vec![owner]])
            .into_connection();

        let mailer = Arc::new(RecordingMailer::new());
        let service = mock_service(conn, Arc::clone(&mailer));
        let admin = user_fixture("a1", "Ada Admin", Role::Admin);

        let updated = service.assign("c1", "s1", &admin).await.unwrap();
        assert_eq!(updated.status_id.as_deref(), Some("st-ip"));

        let sent = mailer.sent();
        assert_eq!(sent.len(), 2);
        assert!(sent.iter().all(|m| !m.subject.contains("was updated")));
    }
}
