//! # Service Contract
//!
//! The uniform lifecycle contract implemented by every long running component.
//! Both the state machine behind [`BlockingService`](crate::BlockingService)
//! and [`ServiceGroup`](crate::ServiceGroup) implement it, so groups can be
//! nested arbitrarily.

use crate::error::ServiceError;
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

/// A component with a `start`, `stop`, `wait` lifecycle.
///
/// The `ctx` token carries cancellation for the call. It is forwarded to the
/// user callbacks of the service and is otherwise opaque to the framework.
#[async_trait]
pub trait Service: Send + Sync {
    /// Starts the service. Returns once the service is running, not once it has finished.
    async fn start(&self, ctx: &CancellationToken) -> Result<(), ServiceError>;

    /// Stops the service and returns its stop result.
    async fn stop(&self, ctx: &CancellationToken) -> Result<(), ServiceError>;

    /// Suspends until the service has stopped and returns its stop result.
    async fn wait(&self, ctx: &CancellationToken) -> Result<(), ServiceError>;
}
