//! Database entities.

pub mod complaint;
pub mod complaint_file;
pub mod complaint_status;
pub mod escalation;
pub mod staff_application;
pub mod user;

pub use complaint::Entity as Complaint;
pub use complaint_file::Entity as ComplaintFile;
pub use complaint_status::Entity as ComplaintStatus;
pub use escalation::Entity as Escalation;
pub use staff_application::Entity as StaffApplication;
pub use user::Entity as User;
