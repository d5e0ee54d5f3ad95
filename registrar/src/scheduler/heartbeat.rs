use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::session::SessionManager;

/// Background keep-alive that re-authenticates on a fixed period until
/// stopped. The first beat happens one period after spawn.
pub struct Heartbeat {
    cancel: CancellationToken,
    handle: JoinHandle<u32>,
}

impl Heartbeat {
    pub fn spawn(sessions: SessionManager, period: Duration, label: String) -> Self {
        let cancel = CancellationToken::new();
        let token = cancel.clone();

        let handle = tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            let mut beats = 0u32;

            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = ticker.tick() => {
                        beats += 1;
                        debug!("[{}] Heartbeat #{}", label, beats);
                        if let Err(e) = sessions.ensure_authenticated().await {
                            warn!("[{}] Heartbeat re-authentication failed: {}", label, e);
                        }
                    }
                }
            }
            beats
        });

        Self { cancel, handle }
    }

    /// Cancel and wait for the task; returns the number of beats
    pub async fn stop(self) -> u32 {
        self.cancel.cancel();
        match self.handle.await {
            Ok(beats) => beats,
            Err(e) => {
                warn!("Heartbeat task ended abnormally: {}", e);
                0
            }
        }
    }
}
