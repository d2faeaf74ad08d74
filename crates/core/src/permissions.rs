//! Role-based permission checks.
//!
//! Every privileged operation names an [`Action`]; [`RolePermissions::allows`]
//! is the single place that maps roles to actions. Handlers never compare
//! roles directly.

use resolveit_db::entities::user::Role;

/// Privileged operations a role may or may not perform.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Action {
    /// Assign a complaint to a staff member.
    AssignComplaint,
    /// Resolve any complaint regardless of assignment.
    ResolveAnyComplaint,
    /// See and download admin-only attachments.
    ViewAdminOnlyFiles,
    /// Delete an attachment.
    DeleteComplaintFile,
    /// Submit a staff application.
    ApplyForStaff,
    /// Approve or reject staff applications.
    ReviewApplications,
    /// Generate and export reports.
    GenerateReports,
    /// Trigger the auto-escalation and reminder sweeps by hand.
    TriggerSweeps,
    /// Read and clear the recent-notification log.
    ViewNotificationLog,
    /// Read per-table row counts.
    ViewDatabaseStats,
    /// Wipe the database.
    ResetDatabase,
    /// Seed the default admin account.
    SeedAdmin,
}

/// Permission queries on [`Role`].
pub trait RolePermissions {
    /// Whether this role may perform the given action.
    fn allows(&self, action: Action) -> bool;

    /// Whether complaints may be escalated to a user with this role.
    fn is_escalation_target(&self) -> bool;
}

impl RolePermissions for Role {
    fn allows(&self, action: Action) -> bool {
        let is_admin = matches!(self, Self::Admin | Self::SuperAdmin);

        match action {
            Action::AssignComplaint
            | Action::ResolveAnyComplaint
            | Action::ViewAdminOnlyFiles
            | Action::DeleteComplaintFile
            | Action::ReviewApplications
            | Action::GenerateReports
            | Action::TriggerSweeps
            | Action::ViewNotificationLog
            | Action::ViewDatabaseStats => is_admin,
            Action::ApplyForStaff => matches!(self, Self::User),
            Action::ResetDatabase | Action::SeedAdmin => matches!(self, Self::SuperAdmin),
        }
    }

    fn is_escalation_target(&self) -> bool {
        matches!(self, Self::Manager | Self::Admin | Self::SuperAdmin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admin_actions() {
        assert!(Role::Admin.allows(Action::AssignComplaint));
        assert!(Role::SuperAdmin.allows(Action::DeleteComplaintFile));
        assert!(!Role::Staff.allows(Action::AssignComplaint));
        assert!(!Role::User.allows(Action::GenerateReports));
        assert!(!Role::Manager.allows(Action::ReviewApplications));
    }

    #[test]
    fn test_notification_log_is_admin_only() {
        assert!(Role::Admin.allows(Action::ViewNotificationLog));
        assert!(Role::SuperAdmin.allows(Action::ViewNotificationLog));
        assert!(!Role::Manager.allows(Action::ViewNotificationLog));
        assert!(!Role::Staff.allows(Action::ViewNotificationLog));
    }

    #[test]
    fn test_only_users_apply_for_staff() {
        assert!(Role::User.allows(Action::ApplyForStaff));
        assert!(!Role::Staff.allows(Action::ApplyForStaff));
        assert!(!Role::Admin.allows(Action::ApplyForStaff));
    }

    #[test]
    fn test_reset_is_superadmin_only() {
        assert!(Role::SuperAdmin.allows(Action::ResetDatabase));
        assert!(!Role::Admin.allows(Action::ResetDatabase));
        assert!(!Role::Admin.allows(Action::SeedAdmin));
    }

    #[test]
    fn test_escalation_targets() {
        assert!(Role::Manager.is_escalation_target());
        assert!(Role::Admin.is_escalation_target());
        assert!(Role::SuperAdmin.is_escalation_target());
        assert!(!Role::Staff.is_escalation_target());
        assert!(!Role::User.is_escalation_target());
    }
}
