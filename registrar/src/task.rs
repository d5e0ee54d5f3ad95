//! One configured registration task, from release wait to reported outcome

use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::config::{EngineSettings, Mode, TaskSettings};
use crate::constants::window::RELEASE_LEAD;
use crate::enrollment::{reconcile, BatchReport, BatchSubmitter, Outcome, RequestedSection};
use crate::errors::{ParseError, RegistrarError, Result};
use crate::notify::{NotificationKind, NotificationService};
use crate::portal::PortalClient;
use crate::scheduler::{extract_portal_timestamp, RegistrationWindowScheduler};
use crate::session::{Session, SessionManager};
use crate::watcher::{SeatTrigger, SeatWatcher};

/// Everything a registration pipeline needs. Cheap to clone into watcher
/// callbacks; every run builds its own transport and session.
#[derive(Clone)]
pub struct Pipeline {
    settings: Arc<TaskSettings>,
    engine: Arc<EngineSettings>,
    notifier: NotificationService,
    cancel: CancellationToken,
}

impl Pipeline {
    pub fn new(settings: TaskSettings, engine: EngineSettings) -> Self {
        let notifier = NotificationService::new(&settings.webhook_url, &settings.term);
        Self {
            settings: Arc::new(settings),
            engine: Arc::new(engine),
            notifier,
            cancel: CancellationToken::new(),
        }
    }

    /// Lets a long registration-window wait end early
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn settings(&self) -> &TaskSettings {
        &self.settings
    }

    pub fn notifier(&self) -> &NotificationService {
        &self.notifier
    }

    /// Authenticate, wait for the window, stage drops then adds, submit and
    /// reconcile. Every requested CRN gets an outcome in the report.
    pub async fn signup(&self, adds: &[String], drops: &[String], waitlist: bool) -> Result<BatchReport> {
        let term = self.settings.term.as_str();
        let client = PortalClient::new(self.engine.endpoints.clone())?;
        let sessions = SessionManager::new(client.clone(), self.settings.credentials.clone());
        let mut session = Session::new();

        sessions.ensure_authenticated().await?;

        RegistrationWindowScheduler::new(sessions.clone(), term, self.engine.window.clone())
            .with_prewarm(adds)
            .with_cancellation(self.cancel.clone())
            .await_registration_window(&session)
            .await?;

        let submitter = BatchSubmitter::new(client, term, waitlist);
        submitter.visit_class_registration().await;
        submitter.stage_drops(&mut session, drops).await?;
        submitter.stage_adds(&mut session, adds).await?;

        let requested = RequestedSection::from_lists(drops, adds, waitlist);
        let results = match submitter.submit_batch(&session).await {
            Ok(results) => results,
            Err(e) => {
                self.publish(&reconcile(&requested, &[], session.rejected()))
                    .await;
                return Err(e);
            }
        };

        let report = reconcile(&requested, &results, session.rejected());
        self.publish(&report).await;
        Ok(report)
    }

    async fn publish(&self, report: &BatchReport) {
        let term = &self.settings.term;
        for section in &report.sections {
            match &section.outcome {
                Outcome::Errors(messages) => {
                    for message in messages {
                        warn!("[{}] Error for {}: {}", term, section.label(), message);
                    }
                }
                outcome if outcome.is_success() => {
                    info!("[{}] {}: {}", term, outcome, section.label())
                }
                outcome => warn!("[{}] {}: {}", term, section.label(), outcome),
            }
            self.notifier.notify_outcome(section).await;
        }
    }
}

pub struct Task {
    pipeline: Pipeline,
    mode: Mode,
    cancel: CancellationToken,
}

impl Task {
    pub fn new(settings: TaskSettings, engine: EngineSettings) -> Self {
        let mode = settings.mode;
        let cancel = CancellationToken::new();
        Self {
            pipeline: Pipeline::new(settings, engine).with_cancellation(cancel.clone()),
            mode,
            cancel,
        }
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.pipeline = self.pipeline.with_cancellation(cancel.clone());
        self.cancel = cancel;
        self
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn term(&self) -> &str {
        &self.pipeline.settings.term
    }

    /// Run to completion. Watch mode yields one report per triggered
    /// enrollment, the other modes exactly one.
    pub async fn run(&mut self) -> Result<Vec<BatchReport>> {
        if self.mode == Mode::Release {
            self.wait_for_release().await?;
        }

        match self.mode {
            Mode::Watch => self.watch().await,
            _ => {
                let settings = self.pipeline.settings.clone();
                info!(
                    "[{}] Signing up: add {:?}, drop {:?}",
                    settings.term, settings.crns, settings.drop_crns
                );
                let report = self
                    .pipeline
                    .signup(&settings.crns, &settings.drop_crns, false)
                    .await?;
                Ok(vec![report])
            }
        }
    }

    /// Sleep until shortly before the configured opening, then switch to Signup
    async fn wait_for_release(&mut self) -> Result<()> {
        let settings = self.pipeline.settings.clone();
        let raw = settings.registration_time.as_deref().unwrap_or_default();
        let window = &self.pipeline.engine.window;

        let (_, target) = extract_portal_timestamp(raw, window.timezone).ok_or_else(|| {
            RegistrarError::Parse(ParseError::Timestamp {
                value: raw.to_string(),
            })
        })?;

        let wake_at = target - chrono::Duration::from_std(RELEASE_LEAD).unwrap_or_default();
        let now = window.now();

        if let Ok(wait) = (wake_at - now).to_std() {
            info!(
                "[{}] Release at {}, sleeping {}s before signup",
                settings.term,
                target,
                wait.as_secs()
            );
            tokio::select! {
                _ = self.cancel.cancelled() => return Err(RegistrarError::Cancelled),
                _ = sleep(wait) => {}
            }
        }

        info!("[{}] Mode {} -> {}", settings.term, Mode::Release, Mode::Signup);
        self.mode = Mode::Signup;
        Ok(())
    }

    async fn watch(&self) -> Result<Vec<BatchReport>> {
        let settings = self.pipeline.settings.clone();
        let client = PortalClient::new(self.pipeline.engine.endpoints.clone())?;
        let watcher = SeatWatcher::new(client, &settings.term)
            .with_poll_interval(self.pipeline.engine.watch_poll_interval)
            .with_cancellation(self.cancel.clone());

        let reports = Arc::new(Mutex::new(Vec::new()));
        let collected = reports.clone();
        // Drops still to be submitted; callbacks run one at a time under
        // the watcher's commit lock.
        let pending_drops = Arc::new(Mutex::new(settings.drop_crns.clone()));
        let pipeline = self.pipeline.clone();

        let outcomes = watcher
            .watch_all(&settings.crns, move |trigger: SeatTrigger| {
                let pipeline = pipeline.clone();
                let collected = collected.clone();
                let pending_drops = pending_drops.clone();
                async move {
                    let term = pipeline.settings().term.clone();
                    pipeline
                        .notifier()
                        .notify(
                            NotificationKind::SeatAvailable,
                            "Watch Task - Seat Available",
                            trigger.message(),
                        )
                        .await;

                    info!("[{}] Mode {} -> {} for {}", term, Mode::Watch, Mode::Signup, trigger.crn);
                    let drops = pending_drops.lock().await.clone();
                    let report = pipeline
                        .signup(&[trigger.crn.clone()], &drops, trigger.waitlist)
                        .await?;
                    if !drops.is_empty() {
                        info!("[{}] Drops {:?} submitted, not repeating them", term, drops);
                        pending_drops.lock().await.clear();
                    }
                    collected.lock().await.push(report);
                    Ok(())
                }
            })
            .await;

        let mut first_error = None;
        for (crn, result) in outcomes {
            if let Err(e) = result {
                error!("[{}] Watch on {} failed: {}", settings.term, crn, e);
                first_error.get_or_insert(e);
            }
        }

        let reports = std::mem::take(&mut *reports.lock().await);
        match first_error {
            Some(e) if reports.is_empty() => Err(e),
            _ => Ok(reports),
        }
    }
}
