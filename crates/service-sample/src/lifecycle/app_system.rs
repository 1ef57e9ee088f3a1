use crate::config::AppConfig;
use crate::services::{Announcer, EchoServer, Ticker};
use service_framework::{Service, ServiceError, ServiceGroup};
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

/// Errors surfaced by the sample application.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("service error: {0}")]
    Service(#[from] ServiceError),
}

/// The running application: every sample service composed into one group.
///
/// # Example
///
/// ```no_run
/// use service_sample::config::AppConfig;
/// use service_sample::lifecycle::AppSystem;
/// use tokio_util::sync::CancellationToken;
///
/// # async fn run() -> Result<(), service_sample::lifecycle::AppError> {
/// let system = AppSystem::new(&AppConfig::default()).await?;
/// let ctx = CancellationToken::new();
///
/// system.start(&ctx).await?;
/// // ... serve traffic ...
/// system.shutdown(&ctx).await?;
/// # Ok(())
/// # }
/// ```
pub struct AppSystem {
    group: ServiceGroup,
    echo_addr: SocketAddr,
    echo: EchoServer,
    ticker: Ticker,
    announcer: Announcer,
}

impl AppSystem {
    /// Binds the echo server and spawns one actor per service. Nothing is
    /// started yet.
    pub async fn new(config: &AppConfig) -> Result<Self, AppError> {
        let echo = EchoServer::bind(config.echo_addr).await?;
        let echo_addr = echo.local_addr()?;
        let ticker = Ticker::new(config.tick_interval);
        let announcer = Announcer::new();

        let group = ServiceGroup::new(vec![
            Arc::new(ticker.clone().into_service(config.service("ticker"))) as Arc<dyn Service>,
            Arc::new(echo.clone().into_service(config.service("echo"))),
            Arc::new(announcer.clone().into_service(config.service("announcer"))),
        ]);

        Ok(Self {
            group,
            echo_addr,
            echo,
            ticker,
            announcer,
        })
    }

    pub fn group(&self) -> &ServiceGroup {
        &self.group
    }

    pub fn echo_addr(&self) -> SocketAddr {
        self.echo_addr
    }

    pub fn connections(&self) -> usize {
        self.echo.connections()
    }

    pub fn ticks(&self) -> u64 {
        self.ticker.ticks()
    }

    pub fn is_ready(&self) -> bool {
        self.announcer.is_ready()
    }

    pub async fn start(&self, ctx: &CancellationToken) -> Result<(), ServiceError> {
        info!(services = self.group.len(), "Starting system");
        self.group.start(ctx).await
    }

    /// Suspends until every service has finished.
    pub async fn wait(&self, ctx: &CancellationToken) -> Result<(), ServiceError> {
        self.group.wait(ctx).await
    }

    /// Stops every service, in start order.
    pub async fn shutdown(&self, ctx: &CancellationToken) -> Result<(), ServiceError> {
        info!("Shutting down system...");
        let result = self.group.stop(ctx).await;
        match &result {
            Ok(()) => info!("System shutdown complete."),
            Err(e) => error!(error = %e, "System shutdown failed"),
        }
        result
    }
}
