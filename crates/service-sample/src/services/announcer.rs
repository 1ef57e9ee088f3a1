//! # Announcer
//!
//! Publishes a readiness flag. Both its start and its stop return
//! immediately, so it is wrapped with the start/stop adapter rather than as a
//! blocking service.

use service_framework::{BlockingService, BoxError, ServiceConfig};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::info;

#[derive(Clone, Default)]
pub struct Announcer {
    ready: Arc<AtomicBool>,
}

impl Announcer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }

    pub fn into_service(self, config: ServiceConfig) -> BlockingService {
        let (up, down) = (self.ready.clone(), self.ready);
        BlockingService::builder()
            .config(config)
            .on_start(move |_ctx: CancellationToken| {
                let ready = up.clone();
                async move {
                    ready.store(true, Ordering::SeqCst);
                    info!("Ready");
                    Ok::<_, BoxError>(())
                }
            })
            .on_stop(move |_ctx: CancellationToken| {
                let ready = down.clone();
                async move {
                    ready.store(false, Ordering::SeqCst);
                    info!("Not ready");
                    Ok::<_, BoxError>(())
                }
            })
            .spawn_start_stop()
    }
}
