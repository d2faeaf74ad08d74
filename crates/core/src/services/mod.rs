//! Business logic services.

pub mod admin;
pub mod complaint;
pub mod email;
pub mod escalation;
pub mod file;
pub mod notification;
pub mod report;
pub mod staff_application;
pub mod status;
pub mod strategy;
pub mod user;

pub use admin::DatabaseAdminService;
pub use complaint::ComplaintService;
pub use email::{Mailer, RecordingMailer, SmtpMailer};
pub use escalation::EscalationService;
pub use file::FileService;
pub use notification::NotificationService;
pub use report::ReportService;
pub use staff_application::StaffApplicationService;
pub use strategy::EscalationStrategy;
pub use user::UserService;
