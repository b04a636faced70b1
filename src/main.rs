use std::sync::Arc;

use anyhow::{Context, Result};
use delivery_network::provider::SyntheticRoutes;
use delivery_network::{Config, Dashboard, LogPresenter};
use realtime::{Scheduler, SystemClock};
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Registry, fmt};

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    Registry::default().with(filter).with(fmt::layer()).init();

    let config = Config::from_env();
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to build runtime")?;

    runtime.block_on(run(config))
}

async fn run(config: Config) -> Result<()> {
    info!(
        timezone = %config.timezone,
        fleet_size = config.fleet_size,
        seed = ?config.seed,
        "starting delivery network simulation"
    );

    let scheduler = Scheduler::new(SystemClock);
    let dashboard = Dashboard::start(
        &config,
        &scheduler,
        Arc::new(SyntheticRoutes::new()),
        Arc::new(LogPresenter),
    );

    match config.run_for {
        Some(duration) => tokio::time::sleep(duration).await,
        None => tokio::signal::ctrl_c().await.context("failed to listen for shutdown signal")?,
    }

    dashboard.stop();
    Ok(())
}
