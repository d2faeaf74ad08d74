//! Database administration: reset, seeding, row counts.

use resolveit_common::{AppError, AppResult};
use resolveit_db::{
    entities::user::{self, Role},
    repositories::{
        ComplaintFileRepository, ComplaintRepository, ComplaintStatusRepository,
        EscalationRepository, StaffApplicationRepository, UserRepository,
    },
};
use serde::Serialize;

use crate::permissions::{Action, RolePermissions};
use crate::services::user::{RegisterInput, UserService};

/// Default admin seeded by `seed_admin`.
const DEFAULT_ADMIN_NAME: &str = "System Administrator";
const DEFAULT_ADMIN_EMAIL: &str = "admin@resolveit.com";
const DEFAULT_ADMIN_PASSWORD: &str = "admin123";

/// Per-table row counts.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DatabaseStats {
    /// Number of users.
    pub users: u64,
    /// Number of complaints.
    pub complaints: u64,
    /// Number of attachments.
    pub complaint_files: u64,
    /// Number of escalations.
    pub escalations: u64,
    /// Number of staff applications.
    pub staff_applications: u64,
}

/// Database administration service.
#[derive(Clone)]
pub struct DatabaseAdminService {
    user_repo: UserRepository,
    complaint_repo: ComplaintRepository,
    status_repo: ComplaintStatusRepository,
    file_repo: ComplaintFileRepository,
    escalation_repo: EscalationRepository,
    application_repo: StaffApplicationRepository,
    users: UserService,
}

impl DatabaseAdminService {
    /// Create a new database administration service.
    #[must_use]
    pub fn new(
        user_repo: UserRepository,
        complaint_repo: ComplaintRepository,
        status_repo: ComplaintStatusRepository,
        file_repo: ComplaintFileRepository,
        escalation_repo: EscalationRepository,
        application_repo: StaffApplicationRepository,
        users: UserService,
    ) -> Self {
        Self {
            user_repo,
            complaint_repo,
            status_repo,
            file_repo,
            escalation_repo,
            application_repo,
            users,
        }
    }

    /// Wipe every row in every table, children before parents.
    ///
    /// Superadmin only. The caller's own account goes too.
    pub async fn reset(&self, actor: &user::Model) -> AppResult<()> {
        if !actor.role.allows(Action::ResetDatabase) {
            return Err(AppError::Forbidden(
                "Only superadmins can reset the database".to_string(),
            ));
        }

        tracing::warn!(actor_id = %actor.id, "Resetting database");

        self.file_repo.delete_all().await?;
        self.escalation_repo.delete_all().await?;
        self.application_repo.delete_all().await?;
        self.complaint_repo.delete_all().await?;
        self.status_repo.delete_all().await?;
        self.user_repo.delete_all().await?;

        tracing::warn!("Database reset complete");
        Ok(())
    }

    /// Seed the default admin account if no admin exists yet.
    pub async fn seed_admin(&self, actor: &user::Model) -> AppResult<user::Model> {
        if !actor.role.allows(Action::SeedAdmin) {
            return Err(AppError::Forbidden(
                "Only superadmins can seed the admin account".to_string(),
            ));
        }

        if !self.user_repo.find_by_role(Role::Admin).await?.is_empty() {
            return Err(AppError::BadRequest(
                "An admin account already exists".to_string(),
            ));
        }

        self.users
            .create_with_role(
                RegisterInput {
                    full_name: DEFAULT_ADMIN_NAME.to_string(),
                    email: DEFAULT_ADMIN_EMAIL.to_string(),
                    password: DEFAULT_ADMIN_PASSWORD.to_string(),
                },
                Role::Admin,
            )
            .await
    }

    /// Per-table row counts.
    pub async fn stats(&self, actor: &user::Model) -> AppResult<DatabaseStats> {
        if !actor.role.allows(Action::ViewDatabaseStats) {
            return Err(AppError::Forbidden(
                "Only admins can view database statistics".to_string(),
            ));
        }

        Ok(DatabaseStats {
            users: self.user_repo.count_all().await?,
            complaints: self.complaint_repo.count_all().await?,
            complaint_files: self.file_repo.count_all().await?,
            escalations: self.escalation_repo.count_all().await?,
            staff_applications: self.application_repo.count_all().await?,
        })
    }
}
