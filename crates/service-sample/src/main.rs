//! # Service Sample
//!
//! Runs the sample services as one group until Ctrl-C.
//!
//! - **config**: Environment based settings ([`AppConfig`]).
//! - **services**: The concrete services (echo server, ticker, announcer).
//! - **lifecycle**: The [`AppSystem`] that composes and drives them.
//!
//! ```bash
//! RUST_LOG=info cargo run -p service-sample
//! ```

use service_framework::tracing::setup_tracing;
use service_framework::Service;
use service_sample::config::AppConfig;
use service_sample::lifecycle::{AppError, AppSystem};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<(), AppError> {
    setup_tracing();

    let config = AppConfig::from_env()?;
    info!(?config, "Starting application");

    let system = AppSystem::new(&config).await?;
    let ctx = CancellationToken::new();
    system.start(&ctx).await?;
    info!(addr = %system.echo_addr(), ready = system.is_ready(), "Echo server up");

    // Ctrl-C stops the group; the wait below then returns.
    let group = system.group().clone();
    let stop_ctx = ctx.clone();
    let signal = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Ctrl-C received");
            if let Err(e) = group.stop(&stop_ctx).await {
                error!(error = %e, "Stop failed");
            }
        }
    });

    let result = system.wait(&ctx).await;
    signal.abort();

    info!(
        ticks = system.ticks(),
        connections = system.connections(),
        "Application finished"
    );
    result.map_err(AppError::from)
}
