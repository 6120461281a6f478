//! Gateway Integration Tests
//!
//! Each test runs the full gateway against a local websocket server and a
//! mocked REST API; no external services are needed.
//!
//! Run with: cargo test -p integration-tests --test gateway_tests

use std::sync::Arc;
use std::time::Duration;

use integration_tests::*;
use kook_core::{ChatType, InboundMessage, ReplyTarget};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use wiremock::MockServer;

struct Harness {
    gateway: MockGateway,
    api: MockServer,
    messages: mpsc::UnboundedReceiver<InboundMessage>,
    sink: Arc<RecordingSink>,
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

/// Mock servers that are up but not yet wired to a running gateway
struct Prepared {
    gateway: MockGateway,
    api: MockServer,
    heartbeat_ms: u64,
}

async fn prepare(heartbeat_ms: u64) -> Prepared {
    let gateway = MockGateway::start().await.expect("Failed to start gateway");
    let api = mock_api(&gateway).await;
    Prepared {
        gateway,
        api,
        heartbeat_ms,
    }
}

fn launch(
    prepared: Prepared,
    (router, messages): (Arc<RecordingRouter>, mpsc::UnboundedReceiver<InboundMessage>),
) -> Harness {
    let config = test_config(&prepared.api.uri(), prepared.heartbeat_ms).expect("Invalid test config");
    let sink = Arc::new(RecordingSink::default());
    let cancel = CancellationToken::new();

    let run = kook_gateway::run(config, router, sink.clone(), cancel.clone());
    let handle = tokio::spawn(async move {
        run.await.expect("gateway run failed");
    });

    Harness {
        gateway: prepared.gateway,
        api: prepared.api,
        messages,
        sink,
        cancel,
        handle,
    }
}

async fn start(heartbeat_ms: u64) -> Harness {
    launch(prepare(heartbeat_ms).await, RecordingRouter::new())
}

async fn eventually<F, Fut>(mut check: F) -> bool
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = bool>,
{
    for _ in 0..100 {
        if check().await {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    false
}

// ============================================================================
// Session Tests
// ============================================================================

#[tokio::test]
async fn test_fresh_connect_and_reply() {
    let mut h = start(30_000).await;
    let mut conn = h.gateway.accept().await.unwrap();
    assert_eq!(conn.query("token").as_deref(), Some("test-token"));
    assert_eq!(conn.query("compress").as_deref(), Some("0"));
    assert_eq!(conn.query("resume"), None);

    conn.send(hello("sess-1")).await.unwrap();
    conn.send(mention_event(1, "  ping bot ")).await.unwrap();

    let message = next_message(&mut h.messages).await.unwrap();
    assert_eq!(message.body_text, "ping bot");
    assert_eq!(message.chat_type, ChatType::Channel);
    assert_eq!(message.reply_target, ReplyTarget::Channel("chan-1".to_string()));
    assert!(message.mentions_self);

    let api = &h.api;
    assert!(eventually(|| async move { !created_messages(api).await.is_empty() }).await);
    let posted = created_messages(api).await;
    assert_eq!(posted[0]["target_id"], "chan-1");
    assert_eq!(posted[0]["content"], "echo: ping bot");
    assert_eq!(posted[0]["type"], 9);

    let sink = h.sink.clone();
    assert!(
        eventually(|| {
            let sink = sink.clone();
            async move {
                sink.patches()
                    .iter()
                    .any(|(_, patch)| patch.last_inbound_at.is_some())
            }
        })
        .await
    );
    assert!(h
        .sink
        .patches()
        .iter()
        .any(|(account, patch)| account == "default" && patch.running == Some(true) && patch.connected == Some(true)));

    h.cancel.cancel();
    h.handle.await.unwrap();
}

#[tokio::test]
async fn test_out_of_order_events_delivered_in_order() {
    let mut h = start(30_000).await;
    let mut conn = h.gateway.accept().await.unwrap();
    conn.send(hello("sess-1")).await.unwrap();

    conn.send(mention_event(3, "third")).await.unwrap();
    conn.send(mention_event(2, "second")).await.unwrap();
    conn.send(mention_event(1, "first")).await.unwrap();
    conn.send(mention_event(2, "second again")).await.unwrap();
    conn.send(mention_event(4, "fourth")).await.unwrap();

    let mut bodies = Vec::new();
    for _ in 0..4 {
        bodies.push(next_message(&mut h.messages).await.unwrap().body_text);
    }
    assert_eq!(bodies, ["first", "second", "third", "fourth"]);

    h.cancel.cancel();
    h.handle.await.unwrap();
    assert!(h.messages.try_recv().is_err());
}

#[tokio::test]
async fn test_unmentioned_chatter_is_dropped() {
    let mut h = start(30_000).await;
    let mut conn = h.gateway.accept().await.unwrap();
    conn.send(hello("sess-1")).await.unwrap();

    conn.send(chatter_event(1)).await.unwrap();
    conn.send(mention_event(2, "for the bot")).await.unwrap();

    let message = next_message(&mut h.messages).await.unwrap();
    assert_eq!(message.message_id, "msg-2");

    h.cancel.cancel();
    h.handle.await.unwrap();
}

#[tokio::test]
async fn test_unknown_identity_forwards_unmentioned_chatter() {
    let prepared = prepare(30_000).await;
    fail_self_user(&prepared.api, 401).await;
    let mut h = launch(prepared, RecordingRouter::new());

    let mut conn = h.gateway.accept().await.unwrap();
    conn.send(hello("sess-1")).await.unwrap();
    conn.send(chatter_event(1)).await.unwrap();

    let message = next_message(&mut h.messages).await.unwrap();
    assert_eq!(message.message_id, "msg-1");
    assert!(!message.mentions_self);
    assert_eq!(request_count(&h.api, "/user/me").await, 1);

    h.cancel.cancel();
    h.handle.await.unwrap();
}

#[tokio::test]
async fn test_heartbeat_carries_last_sequence() {
    let mut h = start(100).await;
    let mut conn = h.gateway.accept().await.unwrap();
    conn.send(hello("sess-1")).await.unwrap();
    conn.send(mention_event(1, "hello")).await.unwrap();
    next_message(&mut h.messages).await.unwrap();

    let mut saw_current = false;
    for _ in 0..5 {
        let frame = conn.recv().await.unwrap().expect("socket closed");
        assert_eq!(frame["s"], 2);
        conn.send(pong()).await.unwrap();
        if frame["sn"] == 1 {
            saw_current = true;
            break;
        }
    }
    assert!(saw_current);

    h.cancel.cancel();
    h.handle.await.unwrap();
}

#[tokio::test]
async fn test_slow_router_does_not_stall_heartbeat() {
    let mut h = launch(prepare(200).await, RecordingRouter::stalling(Duration::from_secs(60)));
    let mut conn = h.gateway.accept().await.unwrap();
    conn.send(hello("sess-1")).await.unwrap();
    conn.send(mention_event(1, "take your time")).await.unwrap();

    // The router now holds the first message for a minute
    next_message(&mut h.messages).await.unwrap();
    conn.send(mention_event(2, "queued behind")).await.unwrap();

    for _ in 0..3 {
        let frame = conn.recv().await.unwrap().expect("socket closed");
        assert_eq!(frame["s"], 2);
        assert!(frame["sn"].as_u64() >= Some(1));
        conn.send(pong()).await.unwrap();
    }
    assert!(h.messages.try_recv().is_err());
    assert!(created_messages(&h.api).await.is_empty());

    h.cancel.cancel();
    tokio::time::timeout(WAIT, h.handle)
        .await
        .expect("gateway did not stop while the router was busy")
        .unwrap();
    conn.closed().await.unwrap();
}

// ============================================================================
// Reconnect Tests
// ============================================================================

#[tokio::test]
async fn test_dropped_socket_resumes_session() {
    let mut h = start(30_000).await;
    let mut conn = h.gateway.accept().await.unwrap();
    conn.send(hello("sess-9")).await.unwrap();
    conn.send(mention_event(1, "one")).await.unwrap();
    conn.send(mention_event(2, "two")).await.unwrap();
    next_message(&mut h.messages).await.unwrap();
    next_message(&mut h.messages).await.unwrap();
    conn.drop_connection();

    let mut resumed = h.gateway.accept().await.unwrap();
    assert_eq!(resumed.query("resume").as_deref(), Some("1"));
    assert_eq!(resumed.query("sn").as_deref(), Some("2"));
    assert_eq!(resumed.query("session_id").as_deref(), Some("sess-9"));
    assert_eq!(resumed.query("token").as_deref(), Some("test-token"));

    resumed.send(resume_ack("sess-9")).await.unwrap();
    resumed.send(mention_event(2, "two replayed")).await.unwrap();
    resumed.send(mention_event(3, "three")).await.unwrap();

    let message = next_message(&mut h.messages).await.unwrap();
    assert_eq!(message.body_text, "three");
    assert_eq!(request_count(&h.api, "/gateway/index").await, 1);

    h.cancel.cancel();
    h.handle.await.unwrap();
}

#[tokio::test]
async fn test_fatal_hello_re_resolves_gateway() {
    let mut h = start(30_000).await;
    let mut conn = h.gateway.accept().await.unwrap();
    conn.send(hello_failure(40103)).await.unwrap();
    conn.closed().await.unwrap();

    let fresh = h.gateway.accept().await.unwrap();
    assert_eq!(fresh.query("resume"), None);
    assert_eq!(request_count(&h.api, "/gateway/index").await, 2);

    h.cancel.cancel();
    h.handle.await.unwrap();
}

#[tokio::test]
async fn test_non_fatal_hello_keeps_socket_open() {
    let mut h = start(30_000).await;
    let mut conn = h.gateway.accept().await.unwrap();
    conn.send(hello_failure(50000)).await.unwrap();

    // Still waiting for a usable Hello on the same socket
    conn.send(hello("sess-1")).await.unwrap();
    conn.send(mention_event(1, "same socket")).await.unwrap();
    let message = next_message(&mut h.messages).await.unwrap();
    assert_eq!(message.body_text, "same socket");

    tokio::time::sleep(Duration::from_millis(300)).await;
    assert!(h.gateway.try_accept().is_none());
    assert_eq!(request_count(&h.api, "/gateway/index").await, 1);

    h.cancel.cancel();
    h.handle.await.unwrap();
}

#[tokio::test]
async fn test_resume_exhaustion_re_resolves_gateway() {
    let mut h = start(30_000).await;
    let mut conn = h.gateway.accept().await.unwrap();
    conn.send(hello("sess-1")).await.unwrap();
    conn.send(mention_event(1, "one")).await.unwrap();
    next_message(&mut h.messages).await.unwrap();
    conn.drop_connection();

    // max_reconnect_attempts = 3 failed resumes
    for _ in 0..3 {
        let resumed = h.gateway.accept().await.unwrap();
        assert_eq!(resumed.query("resume").as_deref(), Some("1"));
        assert_eq!(resumed.query("session_id").as_deref(), Some("sess-1"));
        resumed.drop_connection();
    }

    let mut fresh = h.gateway.accept().await.unwrap();
    assert_eq!(fresh.query("resume"), None);
    assert_eq!(fresh.query("sn"), None);
    assert_eq!(request_count(&h.api, "/gateway/index").await, 2);

    // The watermark was cleared with the session
    fresh.send(hello("sess-2")).await.unwrap();
    fresh.send(mention_event(1, "one again")).await.unwrap();
    let message = next_message(&mut h.messages).await.unwrap();
    assert_eq!(message.body_text, "one again");

    h.cancel.cancel();
    h.handle.await.unwrap();
}

#[tokio::test]
async fn test_failed_gateway_lookup_is_retried() {
    let prepared = prepare(30_000).await;
    fail_gateway_lookup_once(&prepared.api, 40000).await;
    let mut h = launch(prepared, RecordingRouter::new());

    let conn = h.gateway.accept().await.unwrap();
    assert_eq!(conn.query("resume"), None);
    assert_eq!(request_count(&h.api, "/gateway/index").await, 2);

    let errors: Vec<String> = h
        .sink
        .patches()
        .into_iter()
        .filter_map(|(_, patch)| patch.last_error)
        .collect();
    assert_eq!(errors.len(), 1);
    assert!(errors[0].contains("40000"), "{}", errors[0]);

    h.cancel.cancel();
    h.handle.await.unwrap();
}

#[tokio::test]
async fn test_reconnect_frame_starts_fresh_session() {
    let mut h = start(30_000).await;
    let mut conn = h.gateway.accept().await.unwrap();
    conn.send(hello("sess-1")).await.unwrap();
    conn.send(mention_event(1, "before")).await.unwrap();
    next_message(&mut h.messages).await.unwrap();

    conn.send(reconnect()).await.unwrap();
    conn.closed().await.unwrap();

    let mut fresh = h.gateway.accept().await.unwrap();
    assert_eq!(fresh.query("resume"), None);

    // Sequence numbering restarts with the new session
    fresh.send(hello("sess-2")).await.unwrap();
    fresh.send(mention_event(1, "after")).await.unwrap();
    let message = next_message(&mut h.messages).await.unwrap();
    assert_eq!(message.body_text, "after");

    h.cancel.cancel();
    h.handle.await.unwrap();
}

// ============================================================================
// Shutdown Tests
// ============================================================================

#[tokio::test]
async fn test_cancel_closes_socket_and_reports_stop() {
    let mut h = start(30_000).await;
    let mut conn = h.gateway.accept().await.unwrap();
    conn.send(hello("sess-1")).await.unwrap();

    let sink = h.sink.clone();
    assert!(
        eventually(|| {
            let sink = sink.clone();
            async move { sink.patches().iter().any(|(_, p)| p.running == Some(true) && p.connected == Some(true)) }
        })
        .await
    );

    h.cancel.cancel();
    tokio::time::timeout(WAIT, h.handle)
        .await
        .expect("gateway did not stop")
        .unwrap();
    conn.closed().await.unwrap();

    let patches = h.sink.patches();
    let (_, last) = patches.last().unwrap();
    assert_eq!(last.running, Some(false));
    assert_eq!(last.connected, Some(false));
    assert!(last.last_stop_at.is_some());
}
