//! # Service Framework
//!
//! This crate provides a uniform lifecycle contract (`start`, `stop`, `wait`)
//! for long running components, an actor that turns a *blocking* entry point
//! into a service honoring that contract, and groups that drive many services
//! as one.
//!
//! ## Why an Actor?
//!
//! A blocking entry point, such as a server accept loop, runs until it is told
//! to stop. Wrapping it means tracking a small state machine while `start`,
//! `stop`, `wait` and the entry point's own exit can all race each other.
//!
//! Instead of guarding that state with a lock, each service gets a
//! [`LifecycleActor`]: one Tokio task that owns the state and processes
//! requests from a single ordered queue. Every request is fully applied
//! before the next one is read, so the races above resolve deterministically.
//!
//! **Further Reading**:
//! - [Actors with Tokio](https://ryhl.io/blog/actors-with-tokio/) - The handle/actor split used here
//!
//! ## Architecture Overview
//!
//! 1. **Contract** ([`Service`]) - The `start`/`stop`/`wait` capability
//! 2. **Runtime** ([`LifecycleActor`]) - The serialized state machine
//! 3. **Interface** ([`BlockingService`]) - Cloneable handle implementing [`Service`]
//! 4. **Composition** ([`ServiceGroup`]) - Ordered groups with rollback and fan-in
//!
//! ## Lifecycle
//!
//! ```text
//! Empty --start--> Started --stop / callback exit--> Stopped
//! ```
//!
//! - `start` on `Started` is a no-op; on `Stopped` it fails with [`ServiceError::InvalidStart`].
//! - `stop` on `Stopped` replays the recorded stop result; on `Empty` it fails with [`ServiceError::InvalidStop`].
//! - `wait` only succeeds while `Started`; otherwise it fails with [`ServiceError::InvalidWait`].
//!
//! ## Quick Example
//!
//! ```rust
//! use service_framework::{wrap_blocking, BoxError, Service, ServiceGroup};
//! use std::sync::Arc;
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main]
//! async fn main() {
//!     let worker = |ctx: CancellationToken| async move {
//!         ctx.cancelled().await;
//!         Ok::<_, BoxError>(())
//!     };
//!     let noop = |_ctx: CancellationToken| async move { Ok::<_, BoxError>(()) };
//!
//!     let group = ServiceGroup::new(vec![
//!         Arc::new(wrap_blocking(worker, noop)) as Arc<dyn Service>,
//!         Arc::new(wrap_blocking(worker, noop)),
//!     ]);
//!
//!     let ctx = CancellationToken::new();
//!     group.start(&ctx).await.unwrap();
//!     group.stop(&ctx).await.unwrap();
//! }
//! ```
//!
//! ## Testing
//!
//! The [`mock`] module provides [`MockService`](mock::MockService), an
//! in-memory service with scripted failures and a shared call log.

pub mod actor;
pub mod builder;
pub mod callback;
pub mod client;
pub mod config;
pub mod error;
pub mod group;
pub mod message;
pub mod mock;
pub mod service;
pub mod start_stop;
pub mod state;
pub mod tracing;

// Re-export core types for convenience
pub use actor::LifecycleActor;
pub use builder::BlockingServiceBuilder;
pub use callback::{LifecycleFn, LifecycleFuture};
pub use client::{wrap_blocking, BlockingService};
pub use config::ServiceConfig;
pub use error::{append, combine, BoxError, ServiceError};
pub use group::{start_all, stop_all, wait_all, ServiceGroup};
pub use message::{LifecycleRequest, Response};
pub use service::Service;
pub use start_stop::wrap_start_stop;
pub use state::LifecycleState;
