use futures::future::join_all;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use super::{SeatDecision, SectionSnapshot};
use crate::constants::watch;
use crate::errors::{RegistrarError, Result};
use crate::portal::extract::seat_snapshot;
use crate::portal::PortalClient;

/// A detected opening, handed to the enrollment callback
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeatTrigger {
    pub crn: String,
    pub waitlist: bool,
    pub snapshot: SectionSnapshot,
}

impl SeatTrigger {
    pub fn message(&self) -> String {
        if self.waitlist {
            format!(
                "[{}] {} Waitlist spot(s) is now Available - Auto-enrolling!",
                self.crn, self.snapshot.waitlist_seats_available
            )
        } else {
            format!(
                "[{}] {} Enrollment seat(s) is now Available - Auto-enrolling!",
                self.crn, self.snapshot.enrollment_seats_available
            )
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchOutcome {
    Triggered(SeatTrigger),
    Cancelled,
}

/// Polls enrollment info for a set of sections
#[derive(Clone)]
pub struct SeatWatcher {
    client: PortalClient,
    term: String,
    poll_interval: Duration,
    cancel: CancellationToken,
    commit_lock: Arc<Mutex<()>>,
}

impl SeatWatcher {
    pub fn new(client: PortalClient, term: &str) -> Self {
        Self {
            client,
            term: term.to_string(),
            poll_interval: watch::POLL_INTERVAL,
            cancel: CancellationToken::new(),
            commit_lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub async fn fetch_snapshot(&self, crn: &str) -> Result<SectionSnapshot> {
        let operation = format!("Getting Enrollment Data ({})", crn);
        let body = self
            .client
            .post_form(
                &self.client.endpoints().enrollment_info(),
                &[],
                &[("term", self.term.as_str()), ("courseReferenceNumber", crn)],
                &operation,
            )
            .await?;
        Ok(seat_snapshot(&body))
    }

    /// Poll one section until a seat opens (then enroll) or cancellation
    pub async fn watch_section<F, Fut>(&self, crn: &str, enroll: &F) -> Result<WatchOutcome>
    where
        F: Fn(SeatTrigger) -> Fut,
        Fut: Future<Output = Result<()>>,
    {
        loop {
            if self.cancel.is_cancelled() {
                return Ok(WatchOutcome::Cancelled);
            }

            let snapshot = self.fetch_snapshot(crn).await?;
            let decision = snapshot.decide();

            if decision.triggers_enrollment() {
                let trigger = SeatTrigger {
                    crn: crn.to_string(),
                    waitlist: decision == SeatDecision::Waitlist,
                    snapshot,
                };
                info!("{}", trigger.message());

                let _commit = self.commit_lock.lock().await;
                enroll(trigger.clone()).await?;
                return Ok(WatchOutcome::Triggered(trigger));
            }

            match decision {
                SeatDecision::WaitlistOpeningSoon => info!("[{}] - (Waitlist Opening Soon)", crn),
                _ => info!("[{}] - (Not Available)", crn),
            }

            tokio::select! {
                _ = self.cancel.cancelled() => return Ok(WatchOutcome::Cancelled),
                _ = sleep(self.poll_interval) => {}
            }
        }
    }

    /// Watch every CRN concurrently; returns once all loops have ended
    pub async fn watch_all<F, Fut>(
        &self,
        crns: &[String],
        enroll: F,
    ) -> Vec<(String, Result<WatchOutcome>)>
    where
        F: Fn(SeatTrigger) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        let enroll = Arc::new(enroll);
        info!("[{}] Watching {} section(s)", self.term, crns.len());

        let handles: Vec<_> = crns
            .iter()
            .map(|crn| {
                let watcher = self.clone();
                let enroll = enroll.clone();
                let crn = crn.clone();
                tokio::spawn(async move { watcher.watch_section(&crn, enroll.as_ref()).await })
            })
            .collect();

        join_all(handles)
            .await
            .into_iter()
            .zip(crns.iter().cloned())
            .map(|(joined, crn)| {
                let result = joined.unwrap_or_else(|e| {
                    Err(RegistrarError::Other(format!("watch task for {} failed: {}", crn, e)))
                });
                if let Err(e) = &result {
                    error!("[{}] Watch ended with error: {}", crn, e);
                }
                (crn, result)
            })
            .collect()
    }
}
