//! Periodic sweep scheduler.

use std::sync::Arc;
use std::time::Duration;

use resolveit_common::{AppResult, config::EscalationConfig};
use resolveit_core::EscalationService;
use tokio::time::interval;

/// Sweep scheduler configuration.
#[derive(Debug, Clone)]
pub struct SweepConfig {
    /// Interval between auto-escalation sweeps.
    pub escalation_interval: Duration,
    /// Interval between reminder sweeps.
    pub reminder_interval: Duration,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            escalation_interval: Duration::from_secs(86400),
            reminder_interval: Duration::from_secs(86400),
        }
    }
}

impl SweepConfig {
    /// Derive sweep intervals from the escalation configuration.
    #[must_use]
    pub const fn from_escalation(config: &EscalationConfig) -> Self {
        Self {
            escalation_interval: Duration::from_secs(config.sweep_interval_secs),
            reminder_interval: Duration::from_secs(config.sweep_interval_secs),
        }
    }
}

/// Executor trait for the scheduled sweeps.
#[async_trait::async_trait]
pub trait SweepExecutor: Send + Sync {
    /// Escalate overdue complaints. Returns the number escalated.
    async fn auto_escalate_overdue(&self) -> AppResult<u64>;

    /// Send reminders for stale escalations. Returns the number sent.
    async fn send_reminders(&self) -> AppResult<u64>;
}

#[async_trait::async_trait]
impl SweepExecutor for EscalationService {
    async fn auto_escalate_overdue(&self) -> AppResult<u64> {
        Self::auto_escalate_overdue(self).await
    }

    async fn send_reminders(&self) -> AppResult<u64> {
        Self::send_reminders(self).await
    }
}

/// Spawn the periodic sweep tasks.
pub fn run_scheduler<E: SweepExecutor + 'static>(config: SweepConfig, executor: Arc<E>) {
    let escalation_executor = Arc::clone(&executor);
    let reminder_executor = executor;

    tokio::spawn(async move {
        let mut interval = interval(config.escalation_interval);
        loop {
            interval.tick().await;
            match escalation_executor.auto_escalate_overdue().await {
                Ok(count) => {
                    if count > 0 {
                        tracing::info!(count, "Auto-escalated overdue complaints");
                    }
                }
                Err(e) => {
                    tracing::error!(error = %e, "Auto-escalation sweep failed");
                }
            }
        }
    });

    tokio::spawn(async move {
        let mut interval = interval(config.reminder_interval);
        loop {
            interval.tick().await;
            match reminder_executor.send_reminders().await {
                Ok(count) => {
                    if count > 0 {
                        tracing::info!(count, "Sent escalation reminders");
                    }
                }
                Err(e) => {
                    tracing::error!(error = %e, "Reminder sweep failed");
                }
            }
        }
    });
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU64, Ordering};

    #[derive(Default)]
    struct CountingExecutor {
        escalation_runs: AtomicU64,
        reminder_runs: AtomicU64,
    }

    #[async_trait::async_trait]
    impl SweepExecutor for CountingExecutor {
        async fn auto_escalate_overdue(&self) -> AppResult<u64> {
            self.escalation_runs.fetch_add(1, Ordering::SeqCst);
            Ok(0)
        }

        async fn send_reminders(&self) -> AppResult<u64> {
            self.reminder_runs.fetch_add(1, Ordering::SeqCst);
            Ok(0)
        }
    }

    #[test]
    fn test_sweep_config_default() {
        let config = SweepConfig::default();
        assert_eq!(config.escalation_interval, Duration::from_secs(86400));
        assert_eq!(config.reminder_interval, Duration::from_secs(86400));
    }

    #[test]
    fn test_sweep_config_from_escalation() {
        let escalation = EscalationConfig {
            sweep_interval_secs: 3600,
            ..EscalationConfig::default()
        };
        let config = SweepConfig::from_escalation(&escalation);
        assert_eq!(config.escalation_interval, Duration::from_secs(3600));
        assert_eq!(config.reminder_interval, Duration::from_secs(3600));
    }

    #[tokio::test(start_paused = true)]
    async fn test_scheduler_runs_both_sweeps() {
        let executor = Arc::new(CountingExecutor::default());
        run_scheduler(
            SweepConfig {
                escalation_interval: Duration::from_secs(60),
                reminder_interval: Duration::from_secs(60),
            },
            Arc::clone(&executor),
        );

        // Let the spawned tasks start and take their immediate first tick.
        tokio::task::yield_now().await;
        // First tick fires immediately, the next after one interval.
        tokio::time::advance(Duration::from_secs(61)).await;
        tokio::task::yield_now().await;

        assert!(executor.escalation_runs.load(Ordering::SeqCst) >= 2);
        assert!(executor.reminder_runs.load(Ordering::SeqCst) >= 2);
    }
}
