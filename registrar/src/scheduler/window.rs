use chrono::{DateTime, TimeDelta, Utc};
use chrono_tz::Tz;
use std::path::PathBuf;
use std::time::Duration;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use super::eligibility::{decide, format_wait, RegistrationEligibility, TermSearchResponse, WindowDecision};
use super::heartbeat::Heartbeat;
use crate::constants::{defaults, window};
use crate::enrollment::BatchSubmitter;
use crate::errors::{EligibilityError, RegistrarError, Result};
use crate::portal::decode_json;
use crate::session::{Session, SessionManager};

#[derive(Debug, Clone)]
pub struct WindowOptions {
    pub timezone: Tz,
    pub heartbeat_interval: Duration,
    pub recheck_delay: Duration,
    pub max_checks: u32,
    /// Side file receiving the last reported opening time
    pub registration_time_file: Option<PathBuf>,
    /// Added to the local clock when comparing against portal times
    pub clock_offset: TimeDelta,
}

impl Default for WindowOptions {
    fn default() -> Self {
        Self {
            timezone: defaults::PORTAL_TIMEZONE
                .parse()
                .unwrap_or(chrono_tz::America::Los_Angeles),
            heartbeat_interval: window::HEARTBEAT_INTERVAL,
            recheck_delay: window::RECHECK_DELAY,
            max_checks: window::MAX_ELIGIBILITY_CHECKS,
            registration_time_file: None,
            clock_offset: TimeDelta::zero(),
        }
    }
}

impl WindowOptions {
    /// Current time in the portal's zone
    pub fn now(&self) -> DateTime<Tz> {
        (Utc::now() + self.clock_offset).with_timezone(&self.timezone)
    }
}

/// Gates submission on the portal's registration window
pub struct RegistrationWindowScheduler {
    sessions: SessionManager,
    term: String,
    options: WindowOptions,
    prewarm_crns: Vec<String>,
    cancel: CancellationToken,
}

impl RegistrationWindowScheduler {
    pub fn new(sessions: SessionManager, term: &str, options: WindowOptions) -> Self {
        Self {
            sessions,
            term: term.to_string(),
            options,
            prewarm_crns: Vec::new(),
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Sections looked up once right before a long wait
    pub fn with_prewarm(mut self, crns: &[String]) -> Self {
        self.prewarm_crns = crns.to_vec();
        self
    }

    pub async fn fetch_eligibility(&self, session: &Session) -> Result<RegistrationEligibility> {
        let operation = "Getting Registration Status";
        let client = self.sessions.client();
        let body = client
            .post_form(
                &client.endpoints().term_search(),
                &[("mode", "registration")],
                &[
                    ("term", self.term.as_str()),
                    ("studyPath", ""),
                    ("startDatepicker", ""),
                    ("endDatepicker", ""),
                    ("uniqueSessionId", session.unique_session_id()),
                ],
                operation,
            )
            .await?;

        let response: TermSearchResponse = decode_json(&body, operation)?;
        let eligibility = RegistrationEligibility::from(response);
        for failure in &eligibility.failures {
            info!("[{}] {}", self.term, failure);
        }
        Ok(eligibility)
    }

    /// Return once the portal reports the window open
    pub async fn await_registration_window(&self, session: &Session) -> Result<RegistrationEligibility> {
        for check in 1..=self.options.max_checks {
            let eligibility = self.fetch_eligibility(session).await?;
            let now = self.options.now();

            match decide(&eligibility, now) {
                WindowDecision::Open => {
                    info!("[{}] Registration window is open (check #{})", self.term, check);
                    return Ok(eligibility);
                }
                WindowDecision::Blocked { reason } => {
                    return Err(EligibilityError::Blocked { reason }.into());
                }
                WindowDecision::Recheck { raw, .. } => {
                    self.record_registration_time(&raw).await;
                    info!(
                        "[{}] Reported opening time {} has passed, rechecking",
                        self.term, raw
                    );
                    sleep(self.options.recheck_delay).await;
                }
                WindowDecision::WaitUntil { target, wait, raw } => {
                    self.record_registration_time(&raw).await;
                    self.prewarm().await;

                    info!(
                        "[{}] Waiting for Registration to open: {}",
                        self.term,
                        target.to_rfc2822()
                    );
                    info!("[{}] Will continue in {}", self.term, format_wait(wait));
                    if !self.wait_with_heartbeat(wait).await {
                        return Err(RegistrarError::Cancelled);
                    }

                    self.sessions.ensure_authenticated().await?;
                }
            }
        }

        Err(EligibilityError::WindowNeverOpened {
            checks: self.options.max_checks,
        }
        .into())
    }

    /// Sleep for `wait` while keeping the session alive. Returns `false`
    /// if cancelled before the wait elapsed.
    pub async fn wait_with_heartbeat(&self, wait: Duration) -> bool {
        let heartbeat = Heartbeat::spawn(
            self.sessions.clone(),
            self.options.heartbeat_interval,
            self.term.clone(),
        );
        let completed = tokio::select! {
            _ = self.cancel.cancelled() => false,
            _ = sleep(wait) => true,
        };
        let beats = heartbeat.stop().await;
        info!(
            "[{}] Wait finished after {} keep-alive beat(s)",
            self.term, beats
        );
        completed
    }

    async fn prewarm(&self) {
        if self.prewarm_crns.is_empty() {
            return;
        }
        BatchSubmitter::new(self.sessions.client().clone(), &self.term, false)
            .check_sections(&self.prewarm_crns)
            .await;
    }

    async fn record_registration_time(&self, raw: &str) {
        let Some(path) = &self.options.registration_time_file else {
            return;
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            if let Err(e) = tokio::fs::create_dir_all(parent).await {
                warn!("Could not create {}: {}", parent.display(), e);
                return;
            }
        }
        if let Err(e) = tokio::fs::write(path, raw).await {
            warn!("Could not record registration time to {}: {}", path.display(), e);
        }
    }
}
