//! Escalation workflow: manual escalation, overdue sweep, reminders.

use chrono::Utc;
use rand::thread_rng;
use resolveit_common::{AppError, AppResult, IdGenerator, config::EscalationConfig};
use resolveit_db::{
    entities::{
        complaint,
        escalation::{self, EscalationType},
        user::{self, Role},
    },
    repositories::{ComplaintRepository, ComplaintStatusRepository, EscalationRepository, UserRepository},
};
use sea_orm::Set;
use serde::Deserialize;

use crate::permissions::RolePermissions;
use crate::services::{
    complaint::ComplaintService,
    notification::NotificationService,
    status,
    strategy::{self, Candidate, EscalationStrategy},
};

/// Escalation service for business logic.
#[derive(Clone)]
pub struct EscalationService {
    escalation_repo: EscalationRepository,
    complaint_repo: ComplaintRepository,
    status_repo: ComplaintStatusRepository,
    user_repo: UserRepository,
    complaints: ComplaintService,
    notifications: NotificationService,
    strategy: EscalationStrategy,
    auto_escalate_after_days: i64,
    reminder_after_days: i64,
    id_gen: IdGenerator,
}

/// Input for manually escalating a complaint.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EscalateInput {
    /// User the complaint is escalated to.
    pub escalated_to_id: String,
    /// Why the complaint is being escalated.
    pub reason: String,
}

impl EscalationService {
    /// Create a new escalation service.
    pub fn new(
        escalation_repo: EscalationRepository,
        complaint_repo: ComplaintRepository,
        status_repo: ComplaintStatusRepository,
        user_repo: UserRepository,
        complaints: ComplaintService,
        notifications: NotificationService,
        config: &EscalationConfig,
    ) -> AppResult<Self> {
        Ok(Self {
            escalation_repo,
            complaint_repo,
            status_repo,
            user_repo,
            complaints,
            notifications,
            strategy: EscalationStrategy::parse(&config.strategy)?,
            auto_escalate_after_days: config.auto_escalate_after_days,
            reminder_after_days: config.reminder_after_days,
            id_gen: IdGenerator::new(),
        })
    }

    /// Manually escalate a complaint to an authority.
    ///
    /// The target must be a manager or admin. A second active escalation for
    /// the same complaint is rejected as a conflict by the partial unique
    /// index, so two racing callers cannot both succeed.
    pub async fn escalate(
        &self,
        complaint_id: &str,
        actor: &user::Model,
        input: EscalateInput,
    ) -> AppResult<escalation::Model> {
        let reason = input.reason.trim();
        if reason.is_empty() {
            return Err(AppError::Validation("Reason is required".to_string()));
        }

        let complaint = self.complaint_repo.get_by_id(complaint_id).await?;

        let target = self.user_repo.get_by_id(&input.escalated_to_id).await?;
        if !target.role.is_escalation_target() {
            return Err(AppError::BadRequest(
                "Escalation target must be a manager or admin".to_string(),
            ));
        }

        let escalation = self
            .create_escalation(
                &complaint,
                Some(actor.id.clone()),
                &target,
                reason,
                EscalationType::Manual,
            )
            .await?;

        let complaint_title = complaint.title.clone();
        self.apply_escalation_to_complaint(complaint, &target).await?;

        self.notifications
            .notify(
                &target.email,
                &format!("Complaint escalated to you by {}", actor.full_name),
                &format!(
                    "Hello {},\n\nThe complaint \"{}\" has been escalated to you.\nReason: {}",
                    target.full_name, complaint_title, reason
                ),
            )
            .await;

        tracing::info!(
            complaint_id = %complaint_id,
            target_id = %target.id,
            "Complaint escalated manually"
        );
        Ok(escalation)
    }

    /// Escalate every overdue complaint.
    ///
    /// A complaint is overdue when it is older than the configured threshold,
    /// carries a non-terminal status, and has no active escalation. Targets
    /// come from the configured strategy. Per-complaint failures are logged
    /// and skipped so one bad row cannot stall the sweep. Returns the number
    /// of complaints escalated.
    pub async fn auto_escalate_overdue(&self) -> AppResult<u64> {
        let cutoff = Utc::now() - chrono::Duration::days(self.auto_escalate_after_days);

        let mut closed_ids = Vec::new();
        for code in status::CLOSED_CODES {
            if let Some(s) = self.status_repo.find_by_code(code).await? {
                closed_ids.push(s.id);
            }
        }

        let overdue = self
            .complaint_repo
            .find_open_older_than(cutoff.into(), &closed_ids)
            .await?;
        if overdue.is_empty() {
            return Ok(0);
        }

        let mut candidates = self.build_candidates().await?;
        let mut total_escalations = self.escalation_repo.count_all().await?;

        let mut escalated = 0_u64;
        for complaint in overdue {
            match self
                .auto_escalate_one(&complaint, &candidates, total_escalations)
                .await
            {
                Ok(Some(target_id)) => {
                    escalated += 1;
                    total_escalations += 1;
                    if let Some(c) = candidates.iter_mut().find(|c| c.id == target_id) {
                        c.active_load += 1;
                    }
                }
                Ok(None) => {}
                Err(e) => {
                    tracing::warn!(
                        complaint_id = %complaint.id,
                        error = %e,
                        "Skipping complaint in auto-escalation sweep"
                    );
                }
            }
        }

        tracing::info!(count = escalated, "Auto-escalation sweep finished");
        Ok(escalated)
    }

    async fn auto_escalate_one(
        &self,
        complaint: &complaint::Model,
        candidates: &[Candidate],
        total_escalations: u64,
    ) -> AppResult<Option<String>> {
        if self
            .escalation_repo
            .find_active_by_complaint(&complaint.id)
            .await?
            .is_some()
        {
            return Ok(None);
        }

        let chosen =
            strategy::select_target(self.strategy, candidates, total_escalations, &mut thread_rng())?
                .clone();
        let target = self.user_repo.get_by_id(&chosen.id).await?;

        let days_pending = (Utc::now() - complaint.created_at.with_timezone(&Utc)).num_days();
        let reason = format!("Automatically escalated: unresolved for {days_pending} days");

        self.create_escalation(complaint, None, &target, &reason, EscalationType::Automatic)
            .await?;
        self.apply_escalation_to_complaint(complaint.clone(), &target)
            .await?;

        self.notifications
            .notify(
                &target.email,
                &format!("Overdue complaint escalated to you: \"{}\"", complaint.title),
                &format!(
                    "Hello {},\n\nThe complaint \"{}\" has been unresolved for {} days \
                     and was automatically escalated to you.",
                    target.full_name, complaint.title, days_pending
                ),
            )
            .await;

        Ok(Some(target.id))
    }

    /// Send reminder emails for escalations pending past the threshold.
    /// Returns the number of reminders sent.
    pub async fn send_reminders(&self) -> AppResult<u64> {
        let cutoff = Utc::now() - chrono::Duration::days(self.reminder_after_days);
        let pending = self
            .escalation_repo
            .find_active_older_than(cutoff.into())
            .await?;

        let mut sent = 0_u64;
        for escalation in pending {
            let Some(target) = self.user_repo.find_by_id(&escalation.escalated_to_id).await? else {
                tracing::warn!(escalation_id = %escalation.id, "Escalation target no longer exists");
                continue;
            };

            let days_pending =
                (Utc::now() - escalation.created_at.with_timezone(&Utc)).num_days();

            self.notifications
                .notify(
                    &target.email,
                    "Reminder: escalated complaint still pending",
                    &format!(
                        "Hello {},\n\nAn escalation assigned to you has been pending for \
                         {} days. Please review complaint {}.",
                        target.full_name, days_pending, escalation.complaint_id
                    ),
                )
                .await;
            sent += 1;
        }

        tracing::info!(count = sent, "Reminder sweep finished");
        Ok(sent)
    }

    /// Active escalations targeting the given user.
    pub async fn my_escalations(&self, user_id: &str) -> AppResult<Vec<escalation::Model>> {
        self.escalation_repo.find_active_by_target(user_id).await
    }

    /// Full escalation history for a complaint, newest first.
    pub async fn history(&self, complaint_id: &str) -> AppResult<Vec<escalation::Model>> {
        self.complaint_repo.get_by_id(complaint_id).await?;
        self.escalation_repo.find_by_complaint(complaint_id).await
    }

    /// Mark an escalation resolved.
    pub async fn resolve(&self, escalation_id: &str) -> AppResult<escalation::Model> {
        let escalation = self.escalation_repo.get_by_id(escalation_id).await?;

        let mut active: escalation::ActiveModel = escalation.into();
        active.is_active = Set(false);
        active.resolved_at = Set(Some(Utc::now().into()));
        let updated = self.escalation_repo.update(active).await?;

        tracing::info!(escalation_id = %updated.id, "Escalation resolved");
        Ok(updated)
    }

    async fn create_escalation(
        &self,
        complaint: &complaint::Model,
        escalated_by_id: Option<String>,
        target: &user::Model,
        reason: &str,
        escalation_type: EscalationType,
    ) -> AppResult<escalation::Model> {
        let model = escalation::ActiveModel {
            id: Set(self.id_gen.generate()),
            complaint_id: Set(complaint.id.clone()),
            escalated_by_id: Set(escalated_by_id),
            escalated_to_id: Set(target.id.clone()),
            reason: Set(reason.to_string()),
            escalation_type: Set(escalation_type),
            is_active: Set(true),
            created_at: Set(Utc::now().into()),
            resolved_at: Set(None),
        };

        self.escalation_repo.create(model).await
    }

    /// Status to ESCALATED, reassign to the target, tell the previous
    /// assignee they are off the hook.
    async fn apply_escalation_to_complaint(
        &self,
        complaint: complaint::Model,
        target: &user::Model,
    ) -> AppResult<()> {
        let previous_assignee_id = complaint.assigned_to_id.clone();

        let updated = self
            .complaints
            .transition_status(&complaint.id, status::ESCALATED)
            .await?;

        let mut active: complaint::ActiveModel = updated.clone().into();
        active.assigned_to_id = Set(Some(target.id.clone()));
        active.updated_at = Set(Some(Utc::now().into()));
        self.complaint_repo.update(active).await?;

        if let Some(prev_id) = previous_assignee_id {
            if prev_id != target.id {
                if let Some(prev) = self.user_repo.find_by_id(&prev_id).await? {
                    self.notifications
                        .notify(
                            &prev.email,
                            &format!("Complaint \"{}\" was escalated", updated.title),
                            &format!(
                                "Hello {},\n\nThe complaint \"{}\" previously assigned to you \
                                 has been escalated to {}.",
                                prev.full_name, updated.title, target.full_name
                            ),
                        )
                        .await;
                }
            }
        }

        Ok(())
    }

    async fn build_candidates(&self) -> AppResult<Vec<Candidate>> {
        let users = self
            .user_repo
            .find_by_roles(&[Role::Admin, Role::SuperAdmin])
            .await?;

        let mut candidates = Vec::with_capacity(users.len());
        for u in users {
            let active_load = self.escalation_repo.count_active_by_target(&u.id).await?;
            candidates.push(Candidate {
                id: u.id,
                name: u.full_name,
                email: u.email,
                role: u.role,
                active_load,
            });
        }
        Ok(candidates)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::services::email::RecordingMailer;
    use resolveit_db::entities::complaint_status;
    use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase};
    use std::sync::Arc;

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

    fn complaint_fixture() -> complaint::Model {
        complaint::Model {
            id: "c1".to_string(),
            title: "Broken printer".to_string(),
            description: "It jams.".to_string(),
            category: "Facilities".to_string(),
            anonymous: false,
            user_id: None,
            assigned_to_id: None,
            status_id: Some("st-new".to_string()),
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    fn escalation_fixture() -> escalation::Model {
        escalation::Model {
            id: "e1".to_string(),
            complaint_id: "c1".to_string(),
            escalated_by_id: Some("a1".to_string()),
            escalated_to_id: "m1".to_string(),
            reason: "Needs senior attention".to_string(),
            escalation_type: EscalationType::Manual,
            is_active: true,
            created_at: Utc::now().into(),
            resolved_at: None,
        }
    }

    fn mock_service(conn: DatabaseConnection, mailer: Arc<RecordingMailer>) -> EscalationService {
        let conn = Arc::new(conn);
        let escalation_repo = EscalationRepository::new(Arc::clone(&conn));
        let complaint_repo = ComplaintRepository::new(Arc::clone(&conn));
        let status_repo = ComplaintStatusRepository::new(Arc::clone(&conn));
        let user_repo = UserRepository::new(Arc::clone(&conn));
        let notifications = NotificationService::new(mailer);
        let complaints = ComplaintService::new(
            complaint_repo.clone(),
            status_repo.clone(),
            user_repo.clone(),
            escalation_repo.clone(),
            notifications.clone(),
        );
        EscalationService::new(
            escalation_repo,
            complaint_repo,
            status_repo,
            user_repo,
            complaints,
            notifications,
            &EscalationConfig::default(),
        )
        .unwrap()
    }

    fn escalate_input() -> EscalateInput {
        EscalateInput {
            escalated_to_id: "m1".to_string(),
            reason: "Needs senior attention".to_string(),
        }
    }

    #[tokio::test]
    async fn test_escalate_requires_a_reason() {
        let conn = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let service = mock_service(conn, Arc::new(RecordingMailer::new()));
        let actor = user_fixture("a1", "Ada Admin", Role::Admin);

        let mut input = escalate_input();
        input.reason = "   ".to_string();
        let err = service.escalate("c1", &actor, input).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_escalate_rejects_non_authority_target() {
        let conn = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![complaint_fixture()]])
            .append_query_results([vec![user_fixture("m1", "Sam Staff", Role::Staff)]])
            .into_connection();
        let service = mock_service(conn, Arc::new(RecordingMailer::new()));
        let actor = user_fixture("a1", "Ada Admin", Role::Admin);

        let err = service
            .escalate("c1", &actor, escalate_input())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[tokio::test]
    async fn test_escalate_emails_target_with_complaint_title() {
        let complaint = complaint_fixture();
        let mut escalated = complaint.clone();
        escalated.status_id = Some("st-esc".to_string());
        let mut reassigned = escalated.clone();
        reassigned.assigned_to_id = Some("m1".to_string());

        let conn = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![complaint.clone()]])
            .append_query_results([vec![user_fixture("m1", "Mia Manager", Role::Manager)]])
            .append_query_results([vec![escalation_fixture()]])
            .append_query_results([vec![complaint]])
            .append_query_results([vec![complaint_status::Model {
                id: "st-esc".to_string(),
                code: "ESCALATED".to_string(),
                display: "Escalated".to_string(),
            }]])
            .append_query_results([vec![escalated]])
            .append_query_results([vec![reassigned]])
            .into_connection();

        let mailer = Arc::new(RecordingMailer::new());
        let service = mock_service(conn, Arc::clone(&mailer));
        let actor = user_fixture("a1", "Ada Admin", Role::Admin);

        let result = service
            .escalate("c1", &actor, escalate_input())
            .await
            .unwrap();
        assert_eq!(result.escalation_type, EscalationType::Manual);

        let sent = mailer.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, "m1@example.com");
        // The target reads the complaint title, not its database ID
        assert!(sent[0].body.contains("\"Broken printer\""));
        assert!(!sent[0].body.contains("\"c1\""));
        assert!(sent[0].body.contains("Needs senior attention"));
    }
}
