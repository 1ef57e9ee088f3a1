//! # Ticker
//!
//! Emits a heartbeat on a fixed interval until cancelled.

use service_framework::{BlockingService, BoxError, ServiceConfig};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::debug;

#[derive(Clone)]
pub struct Ticker {
    interval: Duration,
    ticks: Arc<AtomicU64>,
}

impl Ticker {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            ticks: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn ticks(&self) -> u64 {
        self.ticks.load(Ordering::SeqCst)
    }

    pub fn into_service(self, config: ServiceConfig) -> BlockingService {
        BlockingService::builder()
            .config(config)
            .on_start(move |ctx: CancellationToken| {
                let ticker = self.clone();
                async move {
                    ticker.run(ctx).await;
                    Ok::<_, BoxError>(())
                }
            })
            .spawn()
    }

    async fn run(self, ctx: CancellationToken) {
        let mut interval = tokio::time::interval(self.interval.max(Duration::from_millis(1)));
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            tokio::select! {
                _ = ctx.cancelled() => break,
                _ = interval.tick() => {
                    let tick = self.ticks.fetch_add(1, Ordering::SeqCst) + 1;
                    debug!(tick, "Heartbeat");
                }
            }
        }
    }
}
