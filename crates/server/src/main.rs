use std::time::Duration;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use talentgrid_server::config::ServerConfig;
use talentgrid_server::startup::Application;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ServerConfig::load()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config.log_level.clone())),
        )
        .init();

    info!("Starting TalentGrid server");
    let app = Application::build(&config).await?;

    let relay = app.relay.clone();
    let relay_handle = tokio::spawn(async move { relay.run().await });

    let outbox = app.outbox.clone();
    let stats_interval = Duration::from_secs(config.stats_interval_secs);
    let stats_handle = tokio::spawn(async move {
        let mut interval = tokio::time::interval(stats_interval);
        loop {
            interval.tick().await;
            match outbox.stats().await {
                Ok(stats) => info!(
                    pending = stats.pending_count,
                    in_flight = stats.in_flight_count,
                    published = stats.published_count,
                    failed = stats.failed_count,
                    oldest_pending_age_secs = stats.oldest_pending_age_seconds.unwrap_or(0),
                    "Outbox status"
                ),
                Err(e) => error!(error = %e, "Failed to read outbox stats"),
            }
        }
    });

    tokio::signal::ctrl_c().await?;
    info!("Shutdown signal received");

    app.relay.shutdown();
    stats_handle.abort();
    if let Err(e) = relay_handle.await? {
        error!(error = %e, "Outbox relay exited with an error");
    }

    info!("TalentGrid server stopped");
    Ok(())
}
