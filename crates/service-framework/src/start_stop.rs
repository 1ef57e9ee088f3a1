//! # Start/Stop Adapter
//!
//! Adapts a non-blocking `start` (one that returns as soon as the service is
//! up) to the blocking model used by [`LifecycleActor`](crate::LifecycleActor).
//!
//! The synthetic `start` runs the user `start` and then suspends until the
//! synthetic `stop` has run the user `stop` and published its result on a
//! [`watch`] channel. Only a real `stop` releases it: cancelling the start
//! context alone would leave whatever the user `start` set up running.

use crate::callback::LifecycleFn;
use crate::client::BlockingService;
use crate::error::ServiceError;
use std::sync::Arc;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

type StopSignal = Option<Result<(), ServiceError>>;

/// Wraps a `start` function that returns immediately and a `stop` function into a service.
///
/// Spawns the actor loop, so it must be called from within a Tokio runtime.
pub fn wrap_start_stop(start: impl LifecycleFn, stop: impl LifecycleFn) -> BlockingService {
    BlockingService::builder()
        .on_start(start)
        .on_stop(stop)
        .spawn_start_stop()
}

/// Converts a non-blocking callback pair into a blocking `start` and a matching `stop`.
pub(crate) fn into_blocking(
    start: Option<Arc<dyn LifecycleFn>>,
    stop: Option<Arc<dyn LifecycleFn>>,
) -> (impl LifecycleFn, impl LifecycleFn) {
    let (done_tx, done_rx) = watch::channel::<StopSignal>(None);
    let done_tx = Arc::new(done_tx);

    let blocking_start = move |ctx: CancellationToken| {
        let start = start.clone();
        let done = done_rx.clone();
        async move {
            if let Some(start) = start {
                start.call(ctx).await.map_err(ServiceError::from_callback)?;
            }

            // `None` only if the actor, and with it the stop side, is gone.
            published(done).await.unwrap_or(Ok(()))
        }
    };

    let blocking_stop = move |ctx: CancellationToken| {
        let stop = stop.clone();
        let done = done_tx.clone();
        async move {
            let result = match stop {
                Some(stop) => stop.call(ctx).await.map_err(ServiceError::from_callback),
                None => Ok(()),
            };
            done.send_replace(Some(result.clone()));
            result
        }
    };

    (blocking_start, blocking_stop)
}

async fn published(mut done: watch::Receiver<StopSignal>) -> StopSignal {
    let signal = match done.wait_for(Option::is_some).await {
        Ok(signal) => (*signal).clone(),
        Err(_) => None,
    };
    signal
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BoxError;
    use crate::service::Service;
    use crate::state::LifecycleState;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    #[tokio::test]
    async fn test_start_stop_lifecycle() {
        let up = Arc::new(AtomicBool::new(false));
        let (on, off) = (up.clone(), up.clone());

        let service = wrap_start_stop(
            move |_ctx: CancellationToken| {
                let up = on.clone();
                async move {
                    up.store(true, Ordering::SeqCst);
                    Ok::<_, BoxError>(())
                }
            },
            move |_ctx: CancellationToken| {
                let up = off.clone();
                async move {
                    up.store(false, Ordering::SeqCst);
                    Ok::<_, BoxError>(())
                }
            },
        );

        let ctx = CancellationToken::new();
        service.start(&ctx).await.unwrap();

        let waiter = {
            let service = service.clone();
            let ctx = ctx.clone();
            tokio::spawn(async move { service.wait(&ctx).await })
        };
        // Give the waiter time to park before stopping.
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        assert!(up.load(Ordering::SeqCst));
        assert_eq!(service.state().await.unwrap(), LifecycleState::Started);

        service.stop(&ctx).await.unwrap();
        waiter.await.unwrap().unwrap();
        assert!(!up.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_failing_start_stops_service() {
        let service = BlockingService::builder()
            .name("broken")
            .on_start(|_ctx: CancellationToken| async move {
                Err::<(), BoxError>("port in use".into())
            })
            .spawn_start_stop();

        let ctx = CancellationToken::new();
        service.start(&ctx).await.unwrap();

        // Poll until the exit has been processed by the actor.
        while service.state().await.unwrap() != LifecycleState::Stopped {
            tokio::task::yield_now().await;
        }
        let err = service.stop(&ctx).await.unwrap_err();
        assert_eq!(err.to_string(), "port in use");
    }

    #[tokio::test]
    async fn test_cancelled_context_still_runs_user_stop() {
        let stops = Arc::new(AtomicUsize::new(0));
        let counter = stops.clone();
        let service = wrap_start_stop(
            |_ctx: CancellationToken| async move { Ok::<_, BoxError>(()) },
            move |_ctx: CancellationToken| {
                counter.fetch_add(1, Ordering::SeqCst);
                async move { Ok::<_, BoxError>(()) }
            },
        );

        let ctx = CancellationToken::new();
        service.start(&ctx).await.unwrap();
        ctx.cancel();
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;

        // Cancellation does not end the service; the user stop is still owed.
        assert_eq!(service.state().await.unwrap(), LifecycleState::Started);
        assert_eq!(stops.load(Ordering::SeqCst), 0);

        service.stop(&ctx).await.unwrap();
        assert_eq!(stops.load(Ordering::SeqCst), 1);
        assert_eq!(service.state().await.unwrap(), LifecycleState::Stopped);
    }

    #[tokio::test]
    async fn test_stop_error_is_returned() {
        let service = BlockingService::builder()
            .on_stop(|_ctx: CancellationToken| async move {
                Err::<(), _>(ServiceError::InvalidStop)
            })
            .spawn_start_stop();

        let ctx = CancellationToken::new();
        service.start(&ctx).await.unwrap();
        let err = service.stop(&ctx).await.unwrap_err();
        assert!(matches!(err, ServiceError::InvalidStop));
    }
}
