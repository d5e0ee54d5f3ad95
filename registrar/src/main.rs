use anyhow::Result;
use futures::future::join_all;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use registrar::{ConfigManager, Task};

#[tokio::main]
async fn main() -> Result<()> {
    let env_filter = EnvFilter::from_default_env()
        .add_directive("registrar=info".parse()?)
        .add_directive("hyper=warn".parse()?)
        .add_directive("reqwest=warn".parse()?);

    fmt().with_env_filter(env_filter).init();

    info!("Starting course registration engine");

    let config_manager = ConfigManager::new(ConfigManager::default_dir()).await?;
    let engine = config_manager.engine().clone();
    let tasks = config_manager.tasks().to_vec();

    if tasks.is_empty() {
        warn!("No runnable tasks configured, nothing to do");
        return Ok(());
    }
    info!("Configuration loaded: {} task(s)", tasks.len());

    let shutdown = CancellationToken::new();
    let runs = tasks.into_iter().map(|settings| {
        let mut task = Task::new(settings, engine.clone()).with_cancellation(shutdown.child_token());
        async move {
            info!("[{}] Starting {} task", task.term(), task.mode());
            match task.run().await {
                Ok(reports) => {
                    let succeeded = reports.iter().filter(|r| r.all_succeeded()).count();
                    info!(
                        "[{}] Task finished: {} of {} batch(es) fully succeeded",
                        task.term(),
                        succeeded,
                        reports.len()
                    );
                }
                Err(e) => error!("[{}] Task failed: {}", task.term(), e),
            }
        }
    });

    let all_runs = join_all(runs);
    tokio::pin!(all_runs);

    tokio::select! {
        _ = &mut all_runs => info!("All tasks finished"),
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown signal received, stopping tasks");
            shutdown.cancel();
            all_runs.await;
            info!("All tasks stopped");
        }
    }

    Ok(())
}
