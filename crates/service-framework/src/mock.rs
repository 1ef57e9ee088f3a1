//! # Mock Services & Testing Guide
//!
//! [`MockService`] implements the same [`Service`] contract as
//! [`BlockingService`](crate::BlockingService) but runs entirely in memory,
//! with no actor loop and no callbacks. It lets you script failures and
//! record the order in which a [`ServiceGroup`](crate::ServiceGroup) drives
//! its members.
//!
//! ## When to use Mocks vs Real Services
//!
//! | Feature | MockService | BlockingService |
//! |---------|-------------|-----------------|
//! | **Speed** | Instant | Fast (spawns an actor task) |
//! | **Determinism** | Fully deterministic | Subject to scheduler |
//! | **Error Injection** | `fail_start` / `fail_stop` | Requires a failing callback |
//! | **Use Case** | Testing orchestration around services | Testing the state machine itself |
//!
//! ## Example
//!
//! ```rust
//! use service_framework::mock::{Call, CallLog, MockService};
//! use service_framework::{Service, ServiceError, ServiceGroup};
//! use std::sync::Arc;
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main]
//! async fn main() {
//!     let log = CallLog::default();
//!     let db = MockService::new("db", &log);
//!     let http = MockService::new("http", &log).fail_start(ServiceError::from_callback("bind failed"));
//!
//!     let group = ServiceGroup::new(vec![
//!         Arc::new(db.clone()) as Arc<dyn Service>,
//!         Arc::new(http.clone()),
//!     ]);
//!
//!     let ctx = CancellationToken::new();
//!     assert!(group.start(&ctx).await.is_err());
//!
//!     // `db` was rolled back after `http` failed.
//!     assert_eq!(log.calls_for("db"), vec![Call::Start, Call::Stop]);
//! }
//! ```

use crate::error::ServiceError;
use crate::service::Service;
use crate::state::LifecycleState;
use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

/// A lifecycle operation recorded by a [`MockService`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Call {
    Start,
    Stop,
    Wait,
}

/// Shared, ordered record of calls made across any number of mock services.
#[derive(Debug, Clone, Default)]
pub struct CallLog {
    calls: Arc<Mutex<Vec<(String, Call)>>>,
}

impl CallLog {
    fn record(&self, name: &str, call: Call) {
        self.calls.lock().unwrap().push((name.to_string(), call));
    }

    /// Every recorded call, in order.
    pub fn calls(&self) -> Vec<(String, Call)> {
        self.calls.lock().unwrap().clone()
    }

    /// The calls made on the service called `name`, in order.
    pub fn calls_for(&self, name: &str) -> Vec<Call> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(n, _)| n == name)
            .map(|(_, call)| *call)
            .collect()
    }
}

/// An in-memory [`Service`] with scripted results.
///
/// Clones share state, so a clone handed to a group can be inspected or
/// driven (see [`exit`](Self::exit)) from the test.
#[derive(Clone)]
pub struct MockService {
    name: Arc<str>,
    log: CallLog,
    start_error: Option<ServiceError>,
    stop_error: Option<ServiceError>,
    state: Arc<Mutex<LifecycleState>>,
    done: Arc<watch::Sender<Option<Result<(), ServiceError>>>>,
}

impl MockService {
    /// Creates a mock that succeeds at everything and records into `log`.
    pub fn new(name: &str, log: &CallLog) -> Self {
        let (done, _) = watch::channel(None);
        Self {
            name: Arc::from(name),
            log: log.clone(),
            start_error: None,
            stop_error: None,
            state: Arc::new(Mutex::new(LifecycleState::Empty)),
            done: Arc::new(done),
        }
    }

    /// Makes `start` fail with `err`, leaving the mock in `Empty`.
    pub fn fail_start(mut self, err: ServiceError) -> Self {
        self.start_error = Some(err);
        self
    }

    /// Makes `stop` record `err` as the stop result.
    pub fn fail_stop(mut self, err: ServiceError) -> Self {
        self.stop_error = Some(err);
        self
    }

    pub fn state(&self) -> LifecycleState {
        *self.state.lock().unwrap()
    }

    /// Simulates the service finishing on its own with `result`.
    ///
    /// Has no effect unless the mock is running.
    pub fn exit(&self, result: Result<(), ServiceError>) {
        let mut state = self.state.lock().unwrap();
        if *state == LifecycleState::Started {
            *state = LifecycleState::Stopped;
            self.done.send_replace(Some(result));
        }
    }

    fn recorded(&self) -> Result<(), ServiceError> {
        self.done.borrow().clone().unwrap_or(Ok(()))
    }
}

#[async_trait]
impl Service for MockService {
    async fn start(&self, _ctx: &CancellationToken) -> Result<(), ServiceError> {
        self.log.record(&self.name, Call::Start);
        if let Some(err) = &self.start_error {
            return Err(err.clone());
        }

        let mut state = self.state.lock().unwrap();
        match *state {
            LifecycleState::Empty => {
                *state = LifecycleState::Started;
                Ok(())
            }
            LifecycleState::Started => Ok(()),
            LifecycleState::Stopped => Err(ServiceError::InvalidStart),
        }
    }

    async fn stop(&self, _ctx: &CancellationToken) -> Result<(), ServiceError> {
        self.log.record(&self.name, Call::Stop);
        let mut state = self.state.lock().unwrap();
        match *state {
            LifecycleState::Started => {
                *state = LifecycleState::Stopped;
                let result = self.stop_error.clone().map_or(Ok(()), Err);
                self.done.send_replace(Some(result.clone()));
                result
            }
            LifecycleState::Stopped => self.recorded(),
            LifecycleState::Empty => Err(ServiceError::InvalidStop),
        }
    }

    async fn wait(&self, _ctx: &CancellationToken) -> Result<(), ServiceError> {
        self.log.record(&self.name, Call::Wait);
        let mut done = {
            let state = self.state.lock().unwrap();
            if *state != LifecycleState::Started {
                return Err(ServiceError::InvalidWait);
            }
            self.done.subscribe()
        };

        // The `Ref` must be released before `done` goes out of scope.
        let result = match done.wait_for(Option::is_some).await {
            Ok(signal) => (*signal).clone().unwrap_or(Ok(())),
            Err(_) => Err(ServiceError::ActorDropped),
        };
        result
    }
}

impl std::fmt::Debug for MockService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockService")
            .field("name", &self.name)
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}
