//! # Lifecycle Actor
//!
//! This module defines the `LifecycleActor`, the serialized state machine that
//! backs every [`BlockingService`]. It implements the "Server" side of the
//! Actor Model: it owns the lifecycle state and processes requests one at a
//! time, so no lock ever guards the state or the waiter list.

use crate::callback::LifecycleFn;
use crate::client::BlockingService;
use crate::config::ServiceConfig;
use crate::error::ServiceError;
use crate::message::{LifecycleRequest, Response};
use crate::state::LifecycleState;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// The actor that owns the lifecycle of one blocking service.
///
/// # Architecture Note
/// This struct is the "Server" half of a [`BlockingService`]. It owns the
/// receiver end of the command queue together with everything that can
/// change: the [`LifecycleState`], the recorded stop result and the parked
/// `wait` callers.
///
/// **Concurrency Model**:
/// Each request is fully applied before the next one is read. A `stop`
/// racing the natural exit of the `start` callback is resolved by whichever
/// message the loop sees first; the state check turns the loser into a
/// no-op or an idempotent reply.
///
/// # State Machine
///
/// | Request | `Empty`                   | `Started`                          | `Stopped`              |
/// |---------|---------------------------|------------------------------------|------------------------|
/// | start   | spawn callback, `Ok`      | `Ok`                               | `InvalidStart`         |
/// | stop    | `InvalidStop`             | run stop callback, resolve waiters | replay recorded result |
/// | wait    | `InvalidWait`             | park until stopped                 | `InvalidWait`          |
/// | exit    | n/a                       | record result, resolve waiters     | ignored                |
pub struct LifecycleActor {
    name: Arc<str>,
    receiver: mpsc::Receiver<LifecycleRequest>,
    on_start: Option<Arc<dyn LifecycleFn>>,
    on_stop: Option<Arc<dyn LifecycleFn>>,
    state: LifecycleState,
    stop_result: Result<(), ServiceError>,
    waiters: Vec<Response>,
    running: Option<CancellationToken>,
}

impl LifecycleActor {
    /// Creates a new `LifecycleActor` and its associated [`BlockingService`] handle.
    ///
    /// The actor does nothing until [`run`](Self::run) is spawned. Prefer
    /// [`BlockingService::builder`] unless you need to control where the loop runs.
    pub fn new(
        config: ServiceConfig,
        on_start: Option<Arc<dyn LifecycleFn>>,
        on_stop: Option<Arc<dyn LifecycleFn>>,
    ) -> (Self, BlockingService) {
        let (sender, receiver) = mpsc::channel(config.buffer_size.max(1));
        let name: Arc<str> = Arc::from(config.name);
        let actor = Self {
            name: name.clone(),
            receiver,
            on_start,
            on_stop,
            state: LifecycleState::Empty,
            stop_result: Ok(()),
            waiters: Vec::new(),
            running: None,
        };
        (actor, BlockingService::new(name, sender))
    }

    /// Runs the actor's event loop until every handle has been dropped.
    ///
    /// A start callback still running at that point has its token cancelled.
    pub async fn run(mut self) {
        let service = self.name.clone();
        info!(%service, "Actor started");

        // The actor keeps `exit_tx` alive, so `exit_rx.recv()` never yields `None`.
        let (exit_tx, mut exit_rx) = mpsc::channel(1);

        loop {
            tokio::select! {
                Some(result) = exit_rx.recv() => self.handle_exit(result),
                msg = self.receiver.recv() => match msg {
                    Some(msg) => self.handle(msg, &exit_tx).await,
                    None => break,
                },
            }
        }

        // No handle is left to stop a running callback, so end it here.
        if let Some(running) = self.running.take() {
            debug!(%service, "Cancelling orphaned start callback");
            running.cancel();
        }
        if !self.waiters.is_empty() {
            warn!(%service, waiters = self.waiters.len(), "Dropping pending waiters");
        }
        info!(%service, state = %self.state, "Shutdown");
    }

    async fn handle(
        &mut self,
        msg: LifecycleRequest,
        exit_tx: &mpsc::Sender<Result<(), ServiceError>>,
    ) {
        debug!(service = %self.name, state = %self.state, request = msg.name(), "Request");
        match msg {
            LifecycleRequest::Start { ctx, respond_to } => {
                let result = self.handle_start(ctx, exit_tx);
                let _ = respond_to.send(result);
            }
            LifecycleRequest::Stop { ctx, respond_to } => {
                let result = self.handle_stop(ctx).await;
                let _ = respond_to.send(result);
            }
            LifecycleRequest::Wait { respond_to } => self.handle_wait(respond_to),
            LifecycleRequest::WithStatus { f, respond_to } => {
                f(self.state);
                let _ = respond_to.send(());
            }
        }
    }

    fn handle_start(
        &mut self,
        ctx: CancellationToken,
        exit_tx: &mpsc::Sender<Result<(), ServiceError>>,
    ) -> Result<(), ServiceError> {
        match self.state {
            LifecycleState::Empty => {
                self.state = LifecycleState::Started;
                info!(service = %self.name, "Started");

                if let Some(on_start) = self.on_start.clone() {
                    let token = ctx.child_token();
                    self.running = Some(token.clone());

                    let exit_tx = exit_tx.clone();
                    let callback = tokio::spawn(async move { on_start.call(token).await });
                    tokio::spawn(async move {
                        let result = match callback.await {
                            Ok(result) => result.map_err(ServiceError::from_callback),
                            Err(e) => Err(ServiceError::TaskFailed(e.to_string())),
                        };
                        let _ = exit_tx.send(result).await;
                    });
                }
                Ok(())
            }
            LifecycleState::Started => Ok(()),
            LifecycleState::Stopped => {
                warn!(service = %self.name, "Start rejected: already stopped");
                Err(ServiceError::InvalidStart)
            }
        }
    }

    async fn handle_stop(&mut self, ctx: CancellationToken) -> Result<(), ServiceError> {
        match self.state {
            LifecycleState::Started => {
                self.state = LifecycleState::Stopped;
                let result = match &self.on_stop {
                    Some(on_stop) => on_stop
                        .call(ctx)
                        .await
                        .map_err(ServiceError::from_callback),
                    None => Ok(()),
                };
                if let Some(running) = self.running.take() {
                    running.cancel();
                }

                match &result {
                    Ok(()) => info!(service = %self.name, "Stopped"),
                    Err(e) => warn!(service = %self.name, error = %e, "Stopped with error"),
                }
                self.record(result.clone());
                result
            }
            LifecycleState::Stopped => self.stop_result.clone(),
            LifecycleState::Empty => {
                warn!(service = %self.name, "Stop rejected: never started");
                Err(ServiceError::InvalidStop)
            }
        }
    }

    fn handle_wait(&mut self, respond_to: Response) {
        match self.state {
            LifecycleState::Started => self.waiters.push(respond_to),
            _ => {
                warn!(service = %self.name, state = %self.state, "Wait rejected: not running");
                let _ = respond_to.send(Err(ServiceError::InvalidWait));
            }
        }
    }

    /// Handles the natural termination of the `start` callback.
    fn handle_exit(&mut self, result: Result<(), ServiceError>) {
        if self.state != LifecycleState::Started {
            debug!(service = %self.name, ok = result.is_ok(), "Ignoring exit after stop");
            return;
        }

        self.state = LifecycleState::Stopped;
        self.running = None;
        match &result {
            Ok(()) => info!(service = %self.name, "Exited"),
            Err(e) => warn!(service = %self.name, error = %e, "Exited with error"),
        }
        self.record(result);
    }

    /// Stores the canonical stop result and resolves every parked waiter with it.
    fn record(&mut self, result: Result<(), ServiceError>) {
        for waiter in self.waiters.drain(..) {
            let _ = waiter.send(result.clone());
        }
        self.stop_result = result;
    }
}
