//! Staff application workflow.

use chrono::Utc;
use resolveit_common::{AppError, AppResult, IdGenerator};
use resolveit_db::{
    entities::{
        staff_application::{self, ApplicationStatus},
        user::{self, Role},
    },
    repositories::{StaffApplicationRepository, UserRepository},
};
use sea_orm::Set;
use serde::Deserialize;
use validator::Validate;

use crate::permissions::{Action, RolePermissions};
use crate::services::notification::NotificationService;

/// Staff application service for business logic.
#[derive(Clone)]
pub struct StaffApplicationService {
    application_repo: StaffApplicationRepository,
    user_repo: UserRepository,
    notifications: NotificationService,
    id_gen: IdGenerator,
}

/// Input for applying to become staff.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ApplyInput {
    /// Complaint categories the applicant wants to handle.
    #[validate(length(min = 1, max = 512, message = "Categories are required"))]
    pub categories: String,

    /// Relevant experience.
    #[validate(length(min = 1, message = "Experience is required"))]
    pub experience: String,

    /// Relevant skills.
    #[validate(length(min = 1, message = "Skills are required"))]
    pub skills: String,

    /// Weekly availability.
    #[validate(length(min = 1, max = 256, message = "Availability is required"))]
    pub availability: String,

    /// Why the applicant wants to join.
    #[validate(length(min = 1, message = "Motivation is required"))]
    pub motivation: String,

    /// Prior staff or support roles, if any.
    pub previous_experience: Option<String>,
}

/// Input for reviewing an application.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewInput {
    /// Notes from the reviewing admin.
    pub admin_notes: Option<String>,
}

impl StaffApplicationService {
    /// Create a new staff application service.
    #[must_use]
    pub fn new(
        application_repo: StaffApplicationRepository,
        user_repo: UserRepository,
        notifications: NotificationService,
    ) -> Self {
        Self {
            application_repo,
            user_repo,
            notifications,
            id_gen: IdGenerator::new(),
        }
    }

    /// Submit a staff application.
    ///
    /// Only plain users may apply. A second pending application from the same
    /// user trips the partial unique index and comes back as a conflict.
    pub async fn apply(
        &self,
        applicant: &user::Model,
        input: ApplyInput,
    ) -> AppResult<staff_application::Model> {
        if !applicant.role.allows(Action::ApplyForStaff) {
            return Err(AppError::Forbidden(
                "Only regular users can apply for staff".to_string(),
            ));
        }
        input.validate()?;

        let model = staff_application::ActiveModel {
            id: Set(self.id_gen.generate()),
            user_id: Set(applicant.id.clone()),
            categories: Set(input.categories.trim().to_string()),
            experience: Set(input.experience.trim().to_string()),
            skills: Set(input.skills.trim().to_string()),
            availability: Set(input.availability.trim().to_string()),
            motivation: Set(input.motivation.trim().to_string()),
            previous_experience: Set(input
                .previous_experience
                .map(|p| p.trim().to_string())
                .filter(|p| !p.is_empty())),
            status: Set(ApplicationStatus::Pending),
            reviewed_by_id: Set(None),
            reviewed_at: Set(None),
            admin_notes: Set(None),
            created_at: Set(Utc::now().into()),
        };

        let application = self.application_repo.create(model).await?;
        tracing::info!(
            application_id = %application.id,
            user_id = %applicant.id,
            "Staff application submitted"
        );
        Ok(application)
    }

    /// List the caller's own applications.
    pub async fn my_applications(
        &self,
        user_id: &str,
    ) -> AppResult<Vec<staff_application::Model>> {
        self.application_repo.find_by_user(user_id).await
    }

    /// List applications awaiting review.
    pub async fn pending(&self) -> AppResult<Vec<staff_application::Model>> {
        self.application_repo.find_pending().await
    }

    /// List every application.
    pub async fn all(&self) -> AppResult<Vec<staff_application::Model>> {
        self.application_repo.find_all().await
    }

    /// Approve a pending application and promote the applicant to staff.
    pub async fn approve(
        &self,
        application_id: &str,
        reviewer: &user::Model,
        input: ReviewInput,
    ) -> AppResult<staff_application::Model> {
        let application = self
            .review(application_id, reviewer, ApplicationStatus::Approved, input)
            .await?;

        let applicant = self.user_repo.get_by_id(&application.user_id).await?;
        let mut active: user::ActiveModel = applicant.clone().into();
        active.role = Set(Role::Staff);
        active.updated_at = Set(Some(Utc::now().into()));
        self.user_repo.update(active).await?;

        self.notifications
            .notify(
                &applicant.email,
                "Your staff application was approved",
                &format!(
                    "Hello {},\n\nCongratulations, your staff application has been approved. \
                     You can now handle complaints.",
                    applicant.full_name
                ),
            )
            .await;

        tracing::info!(
            application_id = %application.id,
            user_id = %applicant.id,
            "Staff application approved"
        );
        Ok(application)
    }

    /// Reject a pending application. The applicant's role is untouched.
    pub async fn reject(
        &self,
        application_id: &str,
        reviewer: &user::Model,
        input: ReviewInput,
    ) -> AppResult<staff_application::Model> {
        let application = self
            .review(application_id, reviewer, ApplicationStatus::Rejected, input)
            .await?;

        if let Some(applicant) = self.user_repo.find_by_id(&application.user_id).await? {
            self.notifications
                .notify(
                    &applicant.email,
                    "Your staff application was not approved",
                    &format!(
                        "Hello {},\n\nYour staff application was reviewed and not approved \
                         at this time.",
                        applicant.full_name
                    ),
                )
                .await;
        }

        tracing::info!(application_id = %application.id, "Staff application rejected");
        Ok(application)
    }

    async fn review(
        &self,
        application_id: &str,
        reviewer: &user::Model,
        outcome: ApplicationStatus,
        input: ReviewInput,
    ) -> AppResult<staff_application::Model> {
        if !reviewer.role.allows(Action::ReviewApplications) {
            return Err(AppError::Forbidden(
                "Only admins can review applications".to_string(),
            ));
        }

        let application = self.application_repo.get_by_id(application_id).await?;
        if application.status != ApplicationStatus::Pending {
            return Err(AppError::BadRequest(
                "Application has already been reviewed".to_string(),
            ));
        }

        let mut active: staff_application::ActiveModel = application.into();
        active.status = Set(outcome);
        active.reviewed_by_id = Set(Some(reviewer.id.clone()));
        active.reviewed_at = Set(Some(Utc::now().into()));
        active.admin_notes = Set(input.admin_notes);

        self.application_repo.update(active).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::services::email::RecordingMailer;
    use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase};
    use std::sync::Arc;

    #[test]
    fn test_apply_input_validation() {
        let input = ApplyInput {
            categories: String::new(),
            experience: "Two years of IT support".to_string(),
            skills: "Troubleshooting".to_string(),
            availability: "Weekdays".to_string(),
            motivation: "I want to help".to_string(),
            previous_experience: None,
        };
        assert!(input.validate().is_err());

        let input = ApplyInput {
            categories: "IT,Facilities".to_string(),
            experience: "Two years of IT support".to_string(),
            skills: "Troubleshooting".to_string(),
            availability: "Weekdays".to_string(),
            motivation: "I want to help".to_string(),
            previous_experience: Some("Helpdesk".to_string()),
        };
        assert!(input.validate().is_ok());
    }

    fn user_fixture(id: &str, role: Role) -> user::Model {
        user::Model {
            id: id.to_string(),
            full_name: format!("User {id}"),
            email: format!("{id}@example.com"),
            password_hash: "hash".to_string(),
            role,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    fn application_fixture(status: ApplicationStatus) -> staff_application::Model {
        staff_application::Model {
            id: "ap1".to_string(),
            user_id: "u1".to_string(),
            categories: "IT".to_string(),
            experience: "Two years of IT support".to_string(),
            skills: "Troubleshooting".to_string(),
            availability: "Weekdays".to_string(),
            motivation: "I want to help".to_string(),
            previous_experience: None,
            status,
            reviewed_by_id: None,
            reviewed_at: None,
            admin_notes: None,
            created_at: Utc::now().into(),
        }
    }

    fn mock_service(
        conn: &Arc<DatabaseConnection>,
        mailer: Arc<RecordingMailer>,
    ) -> StaffApplicationService {
        StaffApplicationService::new(
            StaffApplicationRepository::new(Arc::clone(conn)),
            UserRepository::new(Arc::clone(conn)),
            NotificationService::new(mailer),
        )
    }

    #[tokio::test]
    async fn test_approve_promotes_applicant_to_staff() {
        let pending = application_fixture(ApplicationStatus::Pending);
        let mut approved = pending.clone();
        approved.status = ApplicationStatus::Approved;
        approved.reviewed_by_id = Some("a1".to_string());

        let applicant = user_fixture("u1", Role::User);
        let mut promoted = applicant.clone();
        promoted.role = Role::Staff;

        let conn = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![pending]])
                .append_query_results([vec![approved]])
                .append_query_results([vec![applicant]])
                .append_query_results([vec![promoted]])
                .into_connection(),
        );
        let mailer = Arc::new(RecordingMailer::new());
        let service = mock_service(&conn, Arc::clone(&mailer));
        let reviewer = user_fixture("a1", Role::Admin);

        let result = service
            .approve("ap1", &reviewer, ReviewInput::default())
            .await
            .unwrap();
        assert_eq!(result.status, ApplicationStatus::Approved);

        drop(service);
        let log = Arc::try_unwrap(conn).ok().unwrap().into_transaction_log();
        assert!(format!("{log:?}").contains(r#"UPDATE \"user\""#));

        let sent = mailer.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, "u1@example.com");
        assert_eq!(sent[0].subject, "Your staff application was approved");
    }

    #[tokio::test]
    async fn test_reject_leaves_applicant_role_untouched() {
        let pending = application_fixture(ApplicationStatus::Pending);
        let mut rejected = pending.clone();
        rejected.status = ApplicationStatus::Rejected;
        rejected.reviewed_by_id = Some("a1".to_string());

        let conn = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![pending]])
                .append_query_results([vec![rejected]])
                .append_query_results([vec![user_fixture("u1", Role::User)]])
                .into_connection(),
        );
        let mailer = Arc::new(RecordingMailer::new());
        let service = mock_service(&conn, Arc::clone(&mailer));
        let reviewer = user_fixture("a1", Role::Admin);

        let result = service
            .reject("ap1", &reviewer, ReviewInput::default())
            .await
            .unwrap();
        assert_eq!(result.status, ApplicationStatus::Rejected);

        drop(service);
        let log = Arc::try_unwrap(conn).ok().unwrap().into_transaction_log();
        assert_eq!(log.len(), 3);
        assert!(!format!("{log:?}").contains(r#"UPDATE \"user\""#));

        let sent = mailer.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].subject, "Your staff application was not approved");
    }

    #[tokio::test]
    async fn test_review_requires_admin() {
        let conn = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let service = mock_service(&conn, Arc::new(RecordingMailer::new()));
        let reviewer = user_fixture("m1", Role::Manager);

        let err = service
            .approve("ap1", &reviewer, ReviewInput::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }

    #[tokio::test]
    async fn test_review_rejects_already_reviewed_application() {
        let conn = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![application_fixture(ApplicationStatus::Approved)]])
                .into_connection(),
        );
        let service = mock_service(&conn, Arc::new(RecordingMailer::new()));
        let reviewer = user_fixture("a1", Role::Admin);

        let err = service
            .reject("ap1", &reviewer, ReviewInput::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }
}
