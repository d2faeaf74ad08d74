//! Notification dispatch and the in-memory notification log.
//!
//! Every outgoing notification email is also appended to a bounded ring
//! buffer that the API exposes for a lightweight activity feed. The buffer
//! is capped so a long-running process cannot grow without bound.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use crate::services::email::Mailer;

/// Default capacity of the notification log.
const DEFAULT_CAPACITY: usize = 200;

/// One entry in the notification log.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationEntry {
    /// Recipient email address.
    pub recipient: String,
    /// Subject line.
    pub subject: String,
    /// Short human-readable summary.
    pub message: String,
    /// When the notification was dispatched.
    pub created_at: DateTime<Utc>,
}

/// Sends notification emails and keeps the recent-notification log.
#[derive(Clone)]
pub struct NotificationService {
    mailer: Arc<dyn Mailer>,
    log: Arc<Mutex<VecDeque<NotificationEntry>>>,
    capacity: usize,
}

impl NotificationService {
    /// Create a notification service with the default log capacity.
    #[must_use]
    pub fn new(mailer: Arc<dyn Mailer>) -> Self {
        Self::with_capacity(mailer, DEFAULT_CAPACITY)
    }

    /// Create a notification service with an explicit log capacity.
    #[must_use]
    pub fn with_capacity(mailer: Arc<dyn Mailer>, capacity: usize) -> Self {
        Self {
            mailer,
            log: Arc::new(Mutex::new(VecDeque::with_capacity(capacity))),
            capacity,
        }
    }

    /// Send a notification email and record it in the log.
    ///
    /// Delivery failures are logged and swallowed: a broken SMTP relay must
    /// never fail the business operation that triggered the notification.
    pub async fn notify(&self, recipient: &str, subject: &str, body: &str) {
        if let Err(e) = self.mailer.send(recipient, subject, body).await {
            tracing::warn!(recipient = %recipient, subject = %subject, error = %e, "Failed to send notification email");
        }

        self.record(NotificationEntry {
            recipient: recipient.to_string(),
            subject: subject.to_string(),
            message: body.lines().next().unwrap_or_default().to_string(),
            created_at: Utc::now(),
        });
    }

    fn record(&self, entry: NotificationEntry) {
        if let Ok(mut log) = self.log.lock() {
            if log.len() == self.capacity {
                log.pop_front();
            }
            log.push_back(entry);
        }
    }

    /// Recent notifications, newest first.
    pub fn recent(&self) -> Vec<NotificationEntry> {
        self.log
            .lock()
            .map(|log| log.iter().rev().cloned().collect())
            .unwrap_or_default()
    }

    /// Clear the notification log.
    pub fn clear(&self) {
        if let Ok(mut log) = self.log.lock() {
            log.clear();
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::services::email::RecordingMailer;

    #[tokio::test]
    async fn test_notify_sends_and_records() {
        let mailer = Arc::new(RecordingMailer::new());
        let service = NotificationService::new(Arc::clone(&mailer) as Arc<dyn Mailer>);

        service
            .notify("owner@example.com", "Status updated", "Your complaint moved on.")
            .await;

        assert_eq!(mailer.sent().len(), 1);
        let recent = service.recent();
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].recipient, "owner@example.com");
    }

    #[tokio::test]
    async fn test_log_is_bounded() {
        let mailer: Arc<dyn Mailer> = Arc::new(RecordingMailer::new());
        let service = NotificationService::with_capacity(mailer, 3);

        for i in 0..5 {
            service
                .notify("a@example.com", &format!("Subject {i}"), "body")
                .await;
        }

        let recent = service.recent();
        assert_eq!(recent.len(), 3);
        // Newest first; the two oldest entries were evicted.
        assert_eq!(recent[0].subject, "Subject 4");
        assert_eq!(recent[2].subject, "Subject 2");
    }

    #[tokio::test]
    async fn test_clear_empties_log() {
        let mailer: Arc<dyn Mailer> = Arc::new(RecordingMailer::new());
        let service = NotificationService::new(mailer);

        service.notify("a@example.com", "s", "b").await;
        service.clear();

        assert!(service.recent().is_empty());
    }
}
