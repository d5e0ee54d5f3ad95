use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::constants::notify::WEBHOOK_TIMEOUT_SECONDS;
use crate::enrollment::{Outcome, SectionOutcome};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum NotificationKind {
    SeatAvailable,
    Enrolled,
    Waitlisted,
    Dropped,
    RegistrationError,
}

#[derive(Debug, Clone, Serialize)]
pub struct NotificationPayload {
    pub timestamp: DateTime<Utc>,
    pub kind: NotificationKind,
    pub term: String,
    pub title: String,
    pub message: String,
}

/// Pushes outcomes to the task's webhook. Delivery problems are logged and
/// never propagate.
#[derive(Clone)]
pub struct NotificationService {
    webhook_url: String,
    term: String,
    client: Client,
}

impl NotificationService {
    pub fn new(webhook_url: &str, term: &str) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(WEBHOOK_TIMEOUT_SECONDS))
            .build()
            .unwrap_or_else(|e| {
                warn!("Falling back to default webhook client: {}", e);
                Client::new()
            });

        Self {
            webhook_url: webhook_url.to_string(),
            term: term.to_string(),
            client,
        }
    }

    pub fn is_enabled(&self) -> bool {
        !self.webhook_url.is_empty()
    }

    pub async fn notify(&self, kind: NotificationKind, title: &str, message: String) {
        let payload = NotificationPayload {
            timestamp: Utc::now(),
            kind,
            term: self.term.clone(),
            title: title.to_string(),
            message,
        };
        self.send_webhook(&payload).await;
    }

    /// Notify about one reconciled section, when there is something to say
    pub async fn notify_outcome(&self, section: &SectionOutcome) {
        let title = section
            .course_title
            .clone()
            .unwrap_or_else(|| section.crn.clone());

        let (kind, message) = match &section.outcome {
            Outcome::Enrolled => (
                NotificationKind::Enrolled,
                format!("Successful Enrollment ({})", section.crn),
            ),
            Outcome::Waitlisted => (
                NotificationKind::Waitlisted,
                format!("Successful Waitlisted ({})", section.crn),
            ),
            Outcome::Dropped => (
                NotificationKind::Dropped,
                format!("Successful Drop ({})", section.crn),
            ),
            Outcome::Errors(messages) => (
                NotificationKind::RegistrationError,
                format!("Errors for {}: {}", section.crn, messages.join("; ")),
            ),
            other => (
                NotificationKind::RegistrationError,
                format!("{}: {}", section.crn, other),
            ),
        };

        self.notify(kind, &title, message).await;
    }

    async fn send_webhook(&self, payload: &NotificationPayload) {
        if !self.is_enabled() {
            debug!("No webhook URL configured, skipping notification");
            return;
        }

        match timeout(
            Duration::from_secs(WEBHOOK_TIMEOUT_SECONDS),
            self.client.post(&self.webhook_url).json(payload).send(),
        )
        .await
        {
            Ok(Ok(response)) => {
                if response.status().is_success() {
                    info!("Notification sent: {} ({:?})", payload.title, payload.kind);
                } else {
                    warn!(
                        "Notification webhook returned status: {} for {}",
                        response.status(),
                        payload.title
                    );
                }
            }
            Ok(Err(e)) => warn!("Failed to send notification for {}: {}", payload.title, e),
            Err(_) => warn!("Notification webhook timeout for {}", payload.title),
        }
    }
}
