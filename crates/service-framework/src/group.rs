//! # Service Groups
//!
//! Composes an ordered list of services into one [`Service`].
//!
//! ## Ordering and Failure Policy
//!
//! - **start**: members start strictly in list order. The first failure stops
//!   every member started before it (rollback) and later members are never
//!   started.
//! - **stop**: every member is stopped in list order, whatever earlier members
//!   returned. All failures are aggregated.
//! - **wait**: every member is waited on concurrently. The first member to
//!   finish triggers a detached stop of the whole group; the call returns once
//!   all members have finished, with every result aggregated.
//!
//! Groups are services themselves, so they nest:
//!
//! ```rust
//! use service_framework::{BlockingService, Service, ServiceGroup};
//! use std::sync::Arc;
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main]
//! async fn main() {
//!     let inner = ServiceGroup::new(vec![
//!         Arc::new(BlockingService::builder().name("db").spawn()) as Arc<dyn Service>,
//!         Arc::new(BlockingService::builder().name("cache").spawn()),
//!     ]);
//!     let outer = ServiceGroup::new(vec![
//!         Arc::new(inner) as Arc<dyn Service>,
//!         Arc::new(BlockingService::builder().name("http").spawn()),
//!     ]);
//!
//!     let ctx = CancellationToken::new();
//!     outer.start(&ctx).await.unwrap();
//!     outer.stop(&ctx).await.unwrap();
//! }
//! ```

use crate::error::{combine, ServiceError};
use crate::service::Service;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Starts `services` in order, rolling back on the first failure.
///
/// If the member at index `j` fails, the members at indices `< j` are stopped
/// and the start error is returned combined with any rollback errors.
pub async fn start_all(
    ctx: &CancellationToken,
    services: &[Arc<dyn Service>],
) -> Result<(), ServiceError> {
    for (index, service) in services.iter().enumerate() {
        if let Err(err) = service.start(ctx).await {
            warn!(index, error = %err, "Member failed to start");
            if index == 0 {
                return Err(err);
            }

            info!(started = index, "Rolling back started members");
            let rollback = stop_all(ctx, &services[..index]).await;
            return combine([Err(err), rollback]);
        }
    }
    Ok(())
}

/// Stops every member in order and aggregates all failures.
pub async fn stop_all(
    ctx: &CancellationToken,
    services: &[Arc<dyn Service>],
) -> Result<(), ServiceError> {
    let mut results = Vec::with_capacity(services.len());
    for (index, service) in services.iter().enumerate() {
        let result = service.stop(ctx).await;
        if let Err(e) = &result {
            warn!(index, error = %e, "Member failed to stop");
        }
        results.push(result);
    }
    combine(results)
}

/// Waits for every member to finish.
///
/// The first member to finish, successfully or not, triggers a stop of the
/// whole group on a detached task. That stop is intentionally not awaited
/// here; its effect is observed through the members' own wait results.
pub async fn wait_all(
    ctx: &CancellationToken,
    services: &[Arc<dyn Service>],
) -> Result<(), ServiceError> {
    let mut pending = JoinSet::new();
    for (index, service) in services.iter().enumerate() {
        let service = Arc::clone(service);
        let ctx = ctx.clone();
        pending.spawn(async move { (index, service.wait(&ctx).await) });
    }

    let mut results = Vec::with_capacity(services.len());
    let mut stopping = false;
    while let Some(joined) = pending.join_next().await {
        let result = match joined {
            Ok((index, result)) => {
                debug!(index, ok = result.is_ok(), "Member finished");
                result
            }
            Err(e) => Err(ServiceError::TaskFailed(e.to_string())),
        };

        if !stopping {
            stopping = true;
            info!("First member finished, stopping group");
            let group = services.to_vec();
            let ctx = ctx.clone();
            tokio::spawn(async move {
                if let Err(e) = stop_all(&ctx, &group).await {
                    debug!(error = %e, "Group stop reported errors");
                }
            });
        }
        results.push(result);
    }
    combine(results)
}

/// A [`Service`] made of an ordered, fixed list of member services.
#[derive(Clone)]
pub struct ServiceGroup {
    services: Arc<[Arc<dyn Service>]>,
}

impl ServiceGroup {
    pub fn new(services: Vec<Arc<dyn Service>>) -> Self {
        Self {
            services: services.into(),
        }
    }

    pub fn services(&self) -> &[Arc<dyn Service>] {
        &self.services
    }

    pub fn len(&self) -> usize {
        self.services.len()
    }

    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }
}

impl Default for ServiceGroup {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl FromIterator<Arc<dyn Service>> for ServiceGroup {
    fn from_iter<I: IntoIterator<Item = Arc<dyn Service>>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

#[async_trait]
impl Service for ServiceGroup {
    async fn start(&self, ctx: &CancellationToken) -> Result<(), ServiceError> {
        start_all(ctx, &self.services).await
    }

    async fn stop(&self, ctx: &CancellationToken) -> Result<(), ServiceError> {
        stop_all(ctx, &self.services).await
    }

    async fn wait(&self, ctx: &CancellationToken) -> Result<(), ServiceError> {
        wait_all(ctx, &self.services).await
    }
}

impl std::fmt::Debug for ServiceGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceGroup")
            .field("len", &self.services.len())
            .finish()
    }
}
