//! Background scheduling for resolveit-rs.
//!
//! Runs the periodic sweeps (overdue-complaint auto-escalation, escalation
//! reminders) on tokio intervals. The admin endpoints trigger the same
//! service functions on demand.

pub mod scheduler;

pub use scheduler::{SweepConfig, SweepExecutor, run_scheduler};
