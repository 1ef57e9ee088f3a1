//! # Lifecycle Messages
//!
//! This module defines the requests sent from a [`BlockingService`](crate::BlockingService)
//! handle to its [`LifecycleActor`](crate::LifecycleActor).
//!
//! Every public operation becomes exactly one `LifecycleRequest` on a single
//! ordered queue. The actor answers each request through the oneshot channel
//! it carries, except `Wait` while running, whose channel is parked until the
//! service stops.

use crate::error::ServiceError;
use crate::state::LifecycleState;
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;

/// Type alias for the one-shot response channel used by the actor.
pub type Response = oneshot::Sender<Result<(), ServiceError>>;

/// A function evaluated against the current state inside the actor loop.
pub type StatusFn = Box<dyn FnOnce(LifecycleState) + Send + 'static>;

/// Internal message type sent to the actor to request operations.
pub enum LifecycleRequest {
    Start {
        ctx: CancellationToken,
        respond_to: Response,
    },
    Stop {
        ctx: CancellationToken,
        respond_to: Response,
    },
    Wait {
        respond_to: Response,
    },
    WithStatus {
        f: StatusFn,
        respond_to: oneshot::Sender<()>,
    },
}

impl LifecycleRequest {
    pub fn name(&self) -> &'static str {
        match self {
            LifecycleRequest::Start { .. } => "start",
            LifecycleRequest::Stop { .. } => "stop",
            LifecycleRequest::Wait { .. } => "wait",
            LifecycleRequest::WithStatus { .. } => "with_status",
        }
    }
}
