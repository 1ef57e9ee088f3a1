//! # Lifecycle Callbacks
//!
//! The `LifecycleFn` trait is the contract for the opaque `start` and `stop`
//! functions handed to a [`BlockingService`](crate::BlockingService). The
//! framework never inspects them; it only calls them with a
//! [`CancellationToken`] and records their result.
//!
//! # Provided Implementations
//! Any `Fn(CancellationToken) -> impl Future<Output = Result<(), E>>` closure
//! is a `LifecycleFn` as long as `E` converts into a [`BoxError`]. This covers
//! `std::io::Error`, `&str`, `String`, `ServiceError` and any `thiserror` type.
//!
//! ```rust
//! use service_framework::{BoxError, LifecycleFn};
//! use tokio_util::sync::CancellationToken;
//!
//! fn assert_callback(_: impl LifecycleFn) {}
//!
//! // A blocking start callback: runs until its context is cancelled.
//! assert_callback(|ctx: CancellationToken| async move {
//!     ctx.cancelled().await;
//!     Ok::<_, BoxError>(())
//! });
//!
//! // A failing stop callback.
//! assert_callback(|_ctx: CancellationToken| async move {
//!     Err::<(), _>(std::io::Error::other("flush failed"))
//! });
//! ```

use crate::error::BoxError;
use std::future::Future;
use std::pin::Pin;
use tokio_util::sync::CancellationToken;

/// The future returned by a lifecycle callback.
pub type LifecycleFuture = Pin<Box<dyn Future<Output = Result<(), BoxError>> + Send + 'static>>;

/// An externally supplied `start` or `stop` function.
///
/// A `start` callback is expected to run until the service should stop, so it
/// may suspend indefinitely. A `stop` callback performs a bounded shutdown
/// action.
pub trait LifecycleFn: Send + Sync + 'static {
    fn call(&self, ctx: CancellationToken) -> LifecycleFuture;
}

impl<F, Fut, E> LifecycleFn for F
where
    F: Fn(CancellationToken) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), E>> + Send + 'static,
    E: Into<BoxError>,
{
    fn call(&self, ctx: CancellationToken) -> LifecycleFuture {
        let fut = self(ctx);
        Box::pin(async move { fut.await.map_err(Into::into) })
    }
}
