//! Store compliance worker.
//!
//! Runs the license expiry scheduler against PostgreSQL until Ctrl-C.

use tokio::sync::watch;
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

use store_compliance::bootstrap::ComplianceServices;
use store_compliance::config::{AppConfig, RuntimeConfig};

fn init_tracing(runtime: &RuntimeConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(runtime.log_level.clone()));
    let builder = fmt().with_env_filter(filter);

    if runtime.json_logs() {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load_validated()?;
    init_tracing(&config.runtime);
    info!(environment = ?config.runtime.environment, "Starting store compliance worker");

    let services = ComplianceServices::connect(&config).await?;

    let Some(scheduler) = services.scheduler else {
        info!("Expiry scheduler disabled; nothing to run");
        return Ok(());
    };

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let task = scheduler.spawn(shutdown_rx);

    tokio::signal::ctrl_c().await?;
    info!("Shutdown requested");

    let _ = shutdown_tx.send(true);
    if let Err(e) = task.await {
        error!(error = %e, "Expiry scheduler task failed");
    }

    info!("Stopped");
    Ok(())
}
