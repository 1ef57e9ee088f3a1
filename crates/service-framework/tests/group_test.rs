use service_framework::mock::{Call, CallLog, MockService};
use service_framework::{
    start_all, stop_all, BlockingService, BoxError, LifecycleState, Service, ServiceError,
    ServiceGroup,
};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

fn members(services: &[&MockService]) -> Vec<Arc<dyn Service>> {
    services
        .iter()
        .map(|s| Arc::new((*s).clone()) as Arc<dyn Service>)
        .collect()
}

#[tokio::test]
async fn test_start_rolls_back_on_failure() {
    let log = CallLog::default();
    let a = MockService::new("a", &log).fail_stop(ServiceError::from_callback("a stop failed"));
    let b = MockService::new("b", &log).fail_start(ServiceError::from_callback("b start failed"));
    let c = MockService::new("c", &log);

    let ctx = CancellationToken::new();
    let err = start_all(&ctx, &members(&[&a, &b, &c])).await.unwrap_err();

    // Both the start failure and the rollback failure are kept.
    let parts: Vec<String> = err.errors().iter().map(ToString::to_string).collect();
    assert_eq!(parts, vec!["b start failed", "a stop failed"]);

    // A was rolled back, C was never touched.
    assert_eq!(
        log.calls(),
        vec![
            ("a".to_string(), Call::Start),
            ("b".to_string(), Call::Start),
            ("a".to_string(), Call::Stop),
        ]
    );
    assert_eq!(a.state(), LifecycleState::Stopped);
    assert_eq!(c.state(), LifecycleState::Empty);
}

#[tokio::test]
async fn test_start_failure_without_rollback_errors() {
    let log = CallLog::default();
    let a = MockService::new("a", &log);
    let b = MockService::new("b", &log).fail_start(ServiceError::from_callback("b start failed"));

    let ctx = CancellationToken::new();
    let err = start_all(&ctx, &members(&[&a, &b])).await.unwrap_err();

    // A clean rollback leaves only the original error.
    assert!(matches!(err, ServiceError::Callback(_)));
    assert_eq!(err.to_string(), "b start failed");
}

#[tokio::test]
async fn test_stop_is_best_effort() {
    let log = CallLog::default();
    let a = MockService::new("a", &log);
    let b = MockService::new("b", &log).fail_stop(ServiceError::from_callback("b stop failed"));
    let c = MockService::new("c", &log);
    let services = members(&[&a, &b, &c]);

    let ctx = CancellationToken::new();
    start_all(&ctx, &services).await.unwrap();
    let err = stop_all(&ctx, &services).await.unwrap_err();

    assert_eq!(err.errors().len(), 1);
    assert_eq!(err.to_string(), "b stop failed");
    for mock in [&a, &b, &c] {
        assert_eq!(mock.state(), LifecycleState::Stopped);
    }
    assert_eq!(log.calls_for("c"), vec![Call::Start, Call::Stop]);
}

#[tokio::test]
async fn test_stop_aggregates_invalid_stops() {
    let log = CallLog::default();
    let a = MockService::new("a", &log);
    let b = MockService::new("b", &log);

    let ctx = CancellationToken::new();
    let err = stop_all(&ctx, &members(&[&a, &b])).await.unwrap_err();

    let parts = err.errors();
    assert_eq!(parts.len(), 2);
    assert!(parts.iter().all(|e| matches!(e, ServiceError::InvalidStop)));
}

#[tokio::test]
async fn test_wait_stops_group_after_first_exit() {
    let log = CallLog::default();
    let a = MockService::new("a", &log);
    let b = MockService::new("b", &log);
    let c = MockService::new("c", &log).fail_stop(ServiceError::from_callback("c stop failed"));
    let group = ServiceGroup::new(members(&[&a, &b, &c]));

    let ctx = CancellationToken::new();
    group.start(&ctx).await.unwrap();

    // 1. Wait on the whole group
    let waiter = {
        let group = group.clone();
        let ctx = ctx.clone();
        tokio::spawn(async move { group.wait(&ctx).await })
    };
    tokio::time::sleep(Duration::from_millis(20)).await;

    // 2. One member exits on its own
    b.exit(Err(ServiceError::from_callback("b crashed")));

    // 3. The detached group stop brings down the rest; every result is collected
    let err = tokio::time::timeout(Duration::from_secs(1), waiter)
        .await
        .expect("group wait did not finish")
        .unwrap()
        .unwrap_err();

    let mut parts: Vec<String> = err.errors().iter().map(ToString::to_string).collect();
    parts.sort();
    assert_eq!(parts, vec!["b crashed", "c stop failed"]);
    for mock in [&a, &b, &c] {
        assert_eq!(mock.state(), LifecycleState::Stopped);
    }
}

#[tokio::test]
async fn test_wait_on_unstarted_members() {
    let log = CallLog::default();
    let group = ServiceGroup::new(members(&[
        &MockService::new("a", &log),
        &MockService::new("b", &log),
    ]));

    let ctx = CancellationToken::new();
    let err = group.wait(&ctx).await.unwrap_err();
    assert_eq!(err.errors().len(), 2);
    assert!(err
        .errors()
        .iter()
        .all(|e| matches!(e, ServiceError::InvalidWait)));
}

#[tokio::test]
async fn test_nested_groups_of_blocking_services() {
    let worker = || {
        BlockingService::builder()
            .on_start(|ctx: CancellationToken| async move {
                ctx.cancelled().await;
                Ok::<_, BoxError>(())
            })
            .spawn()
    };
    let (db, cache, http) = (worker(), worker(), worker());

    let backend = ServiceGroup::new(vec![
        Arc::new(db.clone()) as Arc<dyn Service>,
        Arc::new(cache.clone()),
    ]);
    let app = ServiceGroup::new(vec![
        Arc::new(backend) as Arc<dyn Service>,
        Arc::new(http.clone()),
    ]);

    let ctx = CancellationToken::new();
    app.start(&ctx).await.unwrap();
    for service in [&db, &cache, &http] {
        assert_eq!(service.state().await.unwrap(), LifecycleState::Started);
    }

    let waiter = {
        let app = app.clone();
        let ctx = ctx.clone();
        tokio::spawn(async move { app.wait(&ctx).await })
    };
    tokio::time::sleep(Duration::from_millis(20)).await;

    // Stopping a single leaf ends the whole tree.
    http.stop(&ctx).await.unwrap();
    tokio::time::timeout(Duration::from_secs(1), waiter)
        .await
        .expect("app wait did not finish")
        .unwrap()
        .unwrap();

    for service in [&db, &cache, &http] {
        assert_eq!(service.state().await.unwrap(), LifecycleState::Stopped);
    }
}
