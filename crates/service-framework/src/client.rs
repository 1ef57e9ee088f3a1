//! # Blocking Service Handle
//!
//! This module defines [`BlockingService`], the client half of a
//! [`LifecycleActor`](crate::LifecycleActor). It turns every call into one
//! [`LifecycleRequest`] and waits for the actor's reply.

use crate::builder::BlockingServiceBuilder;
use crate::callback::LifecycleFn;
use crate::error::ServiceError;
use crate::message::{LifecycleRequest, Response};
use crate::service::Service;
use crate::state::LifecycleState;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tokio_util::sync::CancellationToken;

/// A [`Service`] built from a blocking `start` callback and an optional `stop` callback.
///
/// The handle only holds a sender, so cloning is inexpensive and every clone
/// talks to the same actor. The actor loop ends once the last clone is dropped.
#[derive(Clone)]
pub struct BlockingService {
    name: Arc<str>,
    sender: mpsc::Sender<LifecycleRequest>,
}

/// Wraps a blocking `start` function (one that runs until its context is
/// cancelled, like a server accept loop) and a `stop` function into a service.
///
/// Spawns the actor loop, so it must be called from within a Tokio runtime.
///
/// ```rust
/// use service_framework::{wrap_blocking, BoxError, Service};
/// use tokio_util::sync::CancellationToken;
///
/// #[tokio::main]
/// async fn main() {
///     let server = wrap_blocking(
///         |ctx: CancellationToken| async move {
///             ctx.cancelled().await;
///             Ok::<_, BoxError>(())
///         },
///         |_ctx: CancellationToken| async move { Ok::<_, BoxError>(()) },
///     );
///
///     let ctx = CancellationToken::new();
///     server.start(&ctx).await.unwrap();
///     server.stop(&ctx).await.unwrap();
/// }
/// ```
pub fn wrap_blocking(start: impl LifecycleFn, stop: impl LifecycleFn) -> BlockingService {
    BlockingService::builder().on_start(start).on_stop(stop).spawn()
}

impl BlockingService {
    pub(crate) fn new(name: Arc<str>, sender: mpsc::Sender<LifecycleRequest>) -> Self {
        Self { name, sender }
    }

    /// Returns a builder for configuring a new service.
    pub fn builder() -> BlockingServiceBuilder {
        BlockingServiceBuilder::default()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Runs `f` against the current state from inside the actor loop.
    ///
    /// `f` observes a snapshot that no concurrent `start`, `stop` or `wait`
    /// can interleave with.
    pub async fn with_status<F>(&self, f: F) -> Result<(), ServiceError>
    where
        F: FnOnce(LifecycleState) + Send + 'static,
    {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(LifecycleRequest::WithStatus {
                f: Box::new(f),
                respond_to,
            })
            .await
            .map_err(|_| ServiceError::ActorClosed)?;
        response.await.map_err(|_| ServiceError::ActorDropped)
    }

    /// Returns the current lifecycle state.
    pub async fn state(&self) -> Result<LifecycleState, ServiceError> {
        let (tx, rx) = oneshot::channel();
        self.with_status(move |state| {
            let _ = tx.send(state);
        })
        .await?;
        rx.await.map_err(|_| ServiceError::ActorDropped)
    }

    async fn request(
        &self,
        build: impl FnOnce(Response) -> LifecycleRequest,
    ) -> Result<(), ServiceError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(build(respond_to))
            .await
            .map_err(|_| ServiceError::ActorClosed)?;
        response.await.map_err(|_| ServiceError::ActorDropped)?
    }
}

#[async_trait]
impl Service for BlockingService {
    #[tracing::instrument(level = "debug", skip_all)]
    async fn start(&self, ctx: &CancellationToken) -> Result<(), ServiceError> {
        let ctx = ctx.clone();
        self.request(|respond_to| LifecycleRequest::Start { ctx, respond_to })
            .await
    }

    #[tracing::instrument(level = "debug", skip_all)]
    async fn stop(&self, ctx: &CancellationToken) -> Result<(), ServiceError> {
        let ctx = ctx.clone();
        self.request(|respond_to| LifecycleRequest::Stop { ctx, respond_to })
            .await
    }

    /// Suspends until the service stops.
    ///
    /// Cancelling `ctx` does not abort a parked wait; bound it with
    /// `tokio::time::timeout` instead.
    #[tracing::instrument(level = "debug", skip_all)]
    async fn wait(&self, _ctx: &CancellationToken) -> Result<(), ServiceError> {
        self.request(|respond_to| LifecycleRequest::Wait { respond_to })
            .await
    }
}

impl std::fmt::Debug for BlockingService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlockingService")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}
