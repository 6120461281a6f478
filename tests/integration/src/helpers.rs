//! Test helpers for integration tests
//!
//! Provides a scripted gateway endpoint, a mocked REST API, and recording
//! collaborators.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use kook_common::AppConfig;
use kook_core::{InboundMessage, ReplyPayload, ReplyRouter, RouterResult, StatusPatch, StatusSink};
use serde_json::{json, Value};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::handshake::server::{ErrorResponse, Request, Response};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::WebSocketStream;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// How long a test waits for anything before failing
pub const WAIT: Duration = Duration::from_secs(5);

/// Bot id reported by the mocked `/user/me`
pub const BOT_ID: &str = "bot-1";

// ============================================================================
// Mock gateway
// ============================================================================

/// Local websocket server that hands every accepted connection to the test
pub struct MockGateway {
    pub addr: SocketAddr,
    connections: mpsc::UnboundedReceiver<GatewayConnection>,
    _handle: JoinHandle<()>,
}

impl MockGateway {
    /// Bind to an ephemeral port and start accepting
    pub async fn start() -> Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let (tx, connections) = mpsc::unbounded_channel();

        let handle = tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                if let Ok(connection) = GatewayConnection::accept(stream).await {
                    if tx.send(connection).is_err() {
                        break;
                    }
                }
            }
        });

        Ok(Self {
            addr,
            connections,
            _handle: handle,
        })
    }

    /// URL returned by the mocked endpoint lookup
    pub fn url(&self) -> String {
        format!("ws://{}/gateway?token=test-token", self.addr)
    }

    /// Wait for the next client connection
    pub async fn accept(&mut self) -> Result<GatewayConnection> {
        tokio::time::timeout(WAIT, self.connections.recv())
            .await
            .context("no gateway connection within timeout")?
            .context("gateway listener stopped")
    }

    /// Connection accepted so far but not yet taken, without waiting
    pub fn try_accept(&mut self) -> Option<GatewayConnection> {
        self.connections.try_recv().ok()
    }
}

/// One accepted client connection
pub struct GatewayConnection {
    /// Request path and query the client connected with
    pub uri: String,
    ws: WebSocketStream<TcpStream>,
}

impl GatewayConnection {
    async fn accept(stream: TcpStream) -> Result<Self> {
        let uri = Arc::new(Mutex::new(String::new()));
        let seen = uri.clone();
        let record_uri = move |request: &Request, response: Response| -> Result<Response, ErrorResponse> {
            if let Ok(mut seen) = seen.lock() {
                *seen = request.uri().to_string();
            }
            Ok(response)
        };
        let ws = tokio_tungstenite::accept_hdr_async(stream, record_uri).await?;

        let uri = uri.lock().map(|uri| uri.clone()).unwrap_or_default();
        Ok(Self { uri, ws })
    }

    /// Value of a query parameter on the connect URL
    pub fn query(&self, key: &str) -> Option<String> {
        let (_, query) = self.uri.split_once('?')?;
        query.split('&').find_map(|pair| {
            let (k, v) = pair.split_once('=')?;
            (k == key).then(|| v.to_string())
        })
    }

    /// Send one frame
    pub async fn send(&mut self, frame: Value) -> Result<()> {
        self.ws.send(Message::Text(frame.to_string())).await?;
        Ok(())
    }

    /// Wait for the next text frame from the client
    ///
    /// Returns `None` once the client closes the socket.
    pub async fn recv(&mut self) -> Result<Option<Value>> {
        loop {
            let message = tokio::time::timeout(WAIT, self.ws.next())
                .await
                .context("no client frame within timeout")?;
            match message {
                Some(Ok(Message::Text(text))) => return Ok(Some(serde_json::from_str(&text)?)),
                Some(Ok(Message::Close(_))) | None | Some(Err(_)) => return Ok(None),
                Some(Ok(_)) => {}
            }
        }
    }

    /// Wait until the client closes the socket, ignoring heartbeats
    pub async fn closed(&mut self) -> Result<()> {
        while self.recv().await?.is_some() {}
        Ok(())
    }

    /// Drop the connection without a close handshake
    pub fn drop_connection(self) {
        drop(self.ws);
    }
}

// ============================================================================
// Mock REST API
// ============================================================================

/// Mount the endpoint lookup, self identity, and message create responses
pub async fn mock_api(gateway: &MockGateway) -> MockServer {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/gateway/index"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": 0,
            "message": "",
            "data": {"url": gateway.url()}
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/user/me"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": 0,
            "message": "",
            "data": {"id": BOT_ID, "username": "testbot"}
        })))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/message/create"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": 0,
            "message": "",
            "data": {"msg_id": "sent-1"}
        })))
        .mount(&server)
        .await;

    server
}

/// Make the next endpoint lookup fail with a non-zero API code
pub async fn fail_gateway_lookup_once(server: &MockServer, code: i64) {
    Mock::given(method("GET"))
        .and(path("/gateway/index"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": code,
            "message": "gateway unavailable",
            "data": {}
        })))
        .with_priority(1)
        .up_to_n_times(1)
        .mount(server)
        .await;
}

/// Make every self identity lookup fail
pub async fn fail_self_user(server: &MockServer, code: i64) {
    Mock::given(method("GET"))
        .and(path("/user/me"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": code,
            "message": "unauthorized",
            "data": {}
        })))
        .with_priority(1)
        .mount(server)
        .await;
}

/// Number of requests the API server received on `route`
pub async fn request_count(server: &MockServer, route: &str) -> usize {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|request| request.url.path() == route)
        .count()
}

/// JSON bodies posted to `/message/create`
pub async fn created_messages(server: &MockServer) -> Vec<Value> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|request| request.url.path() == "/message/create")
        .filter_map(|request| serde_json::from_slice(&request.body).ok())
        .collect()
}

/// Single-account configuration pointing at the mocked API, with fast timings
pub fn test_config(api_base_url: &str, heartbeat_ms: u64) -> Result<AppConfig> {
    let toml = format!(
        r#"
        [api]
        base_url = "{api_base_url}"
        request_timeout_secs = 5

        [gateway]
        heartbeat_interval_ms = {heartbeat_ms}
        connect_timeout_ms = 2000
        max_reconnect_attempts = 3
        inter_backoff_ms = 50
        error_backoff_ms = 50

        [channel]
        token = "test-token"
        "#
    );
    Ok(AppConfig::from_toml_str(&toml)?)
}

// ============================================================================
// Recording collaborators
// ============================================================================

/// Router that forwards every message to the test and echoes it back
pub struct RecordingRouter {
    tx: mpsc::UnboundedSender<InboundMessage>,
    delay: Duration,
}

impl RecordingRouter {
    pub fn new() -> (Arc<Self>, mpsc::UnboundedReceiver<InboundMessage>) {
        Self::stalling(Duration::ZERO)
    }

    /// Router that hands the message over, then takes `delay` to answer
    pub fn stalling(delay: Duration) -> (Arc<Self>, mpsc::UnboundedReceiver<InboundMessage>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Arc::new(Self { tx, delay }), rx)
    }
}

#[async_trait]
impl ReplyRouter for RecordingRouter {
    async fn route(&self, message: InboundMessage) -> RouterResult<Vec<ReplyPayload>> {
        let reply = ReplyPayload::text(format!("echo: {}", message.body_text));
        let _ = self.tx.send(message);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        Ok(vec![reply])
    }
}

/// Wait for the next routed message
pub async fn next_message(rx: &mut mpsc::UnboundedReceiver<InboundMessage>) -> Result<InboundMessage> {
    tokio::time::timeout(WAIT, rx.recv())
        .await
        .context("no routed message within timeout")?
        .context("router dropped")
}

/// Sink that keeps every patch
#[derive(Default)]
pub struct RecordingSink {
    patches: Mutex<Vec<(String, StatusPatch)>>,
}

impl RecordingSink {
    pub fn patches(&self) -> Vec<(String, StatusPatch)> {
        self.patches
            .lock()
            .map(|patches| patches.clone())
            .unwrap_or_default()
    }
}

impl StatusSink for RecordingSink {
    fn on_status(&self, account_id: &str, patch: StatusPatch) {
        if let Ok(mut patches) = self.patches.lock() {
            patches.push((account_id.to_string(), patch));
        }
    }
}
