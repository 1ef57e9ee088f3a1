//! # Service Builder
//!
//! Fluent construction of a [`BlockingService`]. Both callbacks are optional;
//! a missing callback behaves as a no-op.
//!
//! ```rust
//! use service_framework::{BlockingService, BoxError, Service};
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main]
//! async fn main() {
//!     let worker = BlockingService::builder()
//!         .name("worker")
//!         .buffer_size(8)
//!         .on_start(|ctx: CancellationToken| async move {
//!             ctx.cancelled().await;
//!             Ok::<_, BoxError>(())
//!         })
//!         .spawn();
//!
//!     let ctx = CancellationToken::new();
//!     worker.start(&ctx).await.unwrap();
//!     worker.stop(&ctx).await.unwrap();
//! }
//! ```

use crate::actor::LifecycleActor;
use crate::callback::LifecycleFn;
use crate::client::BlockingService;
use crate::config::ServiceConfig;
use crate::start_stop::into_blocking;
use std::sync::Arc;

/// Builder for [`BlockingService`].
#[derive(Default)]
pub struct BlockingServiceBuilder {
    config: ServiceConfig,
    on_start: Option<Arc<dyn LifecycleFn>>,
    on_stop: Option<Arc<dyn LifecycleFn>>,
}

impl BlockingServiceBuilder {
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.config.name = name.into();
        self
    }

    pub fn buffer_size(mut self, buffer_size: usize) -> Self {
        self.config.buffer_size = buffer_size;
        self
    }

    /// Replaces the whole configuration.
    pub fn config(mut self, config: ServiceConfig) -> Self {
        self.config = config;
        self
    }

    pub fn on_start(mut self, start: impl LifecycleFn) -> Self {
        self.on_start = Some(Arc::new(start));
        self
    }

    pub fn on_stop(mut self, stop: impl LifecycleFn) -> Self {
        self.on_stop = Some(Arc::new(stop));
        self
    }

    /// Creates the actor and its handle without spawning the actor loop.
    pub fn build(self) -> (LifecycleActor, BlockingService) {
        LifecycleActor::new(self.config, self.on_start, self.on_stop)
    }

    /// Creates the service and spawns its actor loop on the current Tokio runtime.
    pub fn spawn(self) -> BlockingService {
        let (actor, service) = self.build();
        tokio::spawn(actor.run());
        service
    }

    /// Like [`spawn`](Self::spawn), but for a `start` callback that returns
    /// as soon as the service is up instead of running until stopped.
    pub fn spawn_start_stop(self) -> BlockingService {
        let (start, stop) = into_blocking(self.on_start, self.on_stop);
        let (actor, service) =
            LifecycleActor::new(self.config, Some(Arc::new(start)), Some(Arc::new(stop)));
        tokio::spawn(actor.run());
        service
    }
}
