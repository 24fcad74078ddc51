//! Context propagation across await points, spawned tasks, and interleaved
//! requests on one thread.

use std::sync::Arc;
use std::time::Duration;

use sessionseal_context::{
    bind_request_context, get_request_context, spawn_with_request_context, with_request_context,
    ContextError,
};
use tokio::sync::oneshot;

#[derive(Debug, Clone, PartialEq)]
struct RequestUser {
    name: String,
    groups: Vec<String>,
}

fn user(name: &str) -> RequestUser {
    RequestUser {
        name: name.to_string(),
        groups: vec!["blab".to_string()],
    }
}

async fn authorized_name() -> Result<String, ContextError> {
    tokio::time::sleep(Duration::from_millis(1)).await;
    Ok(get_request_context::<RequestUser>()?.name.clone())
}

#[tokio::test]
async fn visible_in_nested_awaits() {
    let name = bind_request_context(user("alice"), || async { authorized_name().await })
        .call()
        .await
        .unwrap();
    assert_eq!(name, "alice");
}

#[tokio::test]
async fn missing_outside_binding_after_request() {
    bind_request_context(user("alice"), || async {}).call().await;
    assert!(matches!(
        authorized_name().await,
        Err(ContextError::MissingRequestContext)
    ));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn spawned_continuations_inherit_context() {
    let (tx, rx) = oneshot::channel();
    bind_request_context(user("dana"), || async move {
        let handle = spawn_with_request_context(async move {
            tokio::time::sleep(Duration::from_millis(5)).await;
            let _ = tx.send(get_request_context::<RequestUser>().map(|u| u.name.clone()));
        });
        handle.await.unwrap();
    })
    .call()
    .await;

    assert_eq!(rx.await.unwrap().unwrap(), "dana");
}

#[tokio::test]
async fn plain_spawn_does_not_inherit() {
    let outcome = bind_request_context(user("erin"), || async {
        tokio::spawn(async { get_request_context::<RequestUser>().map(|_| ()) })
            .await
            .unwrap()
    })
    .call()
    .await;
    assert!(matches!(outcome, Err(ContextError::MissingRequestContext)));
}

#[tokio::test]
async fn context_captured_at_spawn_time() {
    let (go_tx, go_rx) = oneshot::channel::<()>();
    let handle = bind_request_context(user("frank"), || async move {
        spawn_with_request_context(async move {
            go_rx.await.unwrap();
            get_request_context::<RequestUser>().unwrap().name.clone()
        })
    })
    .call()
    .await;

    // The binding has ended by the time the child reads the context.
    go_tx.send(()).unwrap();
    assert_eq!(handle.await.unwrap(), "frank");
}

#[tokio::test(flavor = "current_thread")]
async fn interleaved_requests_are_isolated() {
    let (a_ready_tx, a_ready_rx) = oneshot::channel::<()>();
    let (b_done_tx, b_done_rx) = oneshot::channel::<()>();

    let request_a = bind_request_context(user("a"), || async move {
        let before = get_request_context::<RequestUser>().unwrap().name.clone();
        a_ready_tx.send(()).unwrap();
        // Request B runs to completion on this same thread while A is parked.
        b_done_rx.await.unwrap();
        let after = get_request_context::<RequestUser>().unwrap().name.clone();
        (before, after)
    })
    .call();

    let request_b = bind_request_context(user("b"), || async move {
        a_ready_rx.await.unwrap();
        let seen = get_request_context::<RequestUser>().unwrap().name.clone();
        b_done_tx.send(()).unwrap();
        seen
    })
    .call();

    let ((a_before, a_after), b_seen) = tokio::join!(request_a, request_b);
    assert_eq!(a_before, "a");
    assert_eq!(a_after, "a");
    assert_eq!(b_seen, "b");
}

#[tokio::test]
async fn nested_async_bindings_revert() {
    bind_request_context(user("outer"), || async {
        let inner = bind_request_context(user("inner"), || async { authorized_name().await })
            .call()
            .await
            .unwrap();
        assert_eq!(inner, "inner");
        assert_eq!(authorized_name().await.unwrap(), "outer");
    })
    .call()
    .await;
}

#[tokio::test]
async fn with_request_context_carries_into_detached_future() {
    let detached = bind_request_context(user("gwen"), || async {
        with_request_context(async { get_request_context::<RequestUser>().unwrap() })
    })
    .call()
    .await;

    // Polled after the binding ended, still sees the captured context.
    let seen: Arc<RequestUser> = detached.await;
    assert_eq!(seen.name, "gwen");
    assert_eq!(seen.groups, ["blab"]);
}
