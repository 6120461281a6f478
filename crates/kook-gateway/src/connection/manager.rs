//! Connection manager
//!
//! Drives one account's gateway connection: endpoint lookup, fresh connect,
//! resume, handshake, heartbeat, and event delivery. Everything runs on one
//! task, so the session state needs no locking.

use chrono::Utc;
use futures_util::{SinkExt, StreamExt};
use kook_common::{AccountConfig, ApiConfig, GatewaySettings};
use kook_core::{DomainError, ReplyRouter, StatusPatch, StatusSink};
use std::sync::Arc;
use std::time::Duration;
use tokio_tungstenite::tungstenite::Message;
use tokio_util::sync::CancellationToken;

use super::session::{ConnectionStatus, Effect, LifecycleEvent, ReconnectPolicy, SessionState};
use super::socket::{self, GatewaySocket, ResumeParams};
use crate::api::KookApiClient;
use crate::events::{DispatchQueue, EventClassifier, EventDispatcher};
use crate::handlers::{handle_frame, next_beat, HeartbeatMonitor};
use crate::outbound::OutboundSender;
use crate::protocol::GatewayFrame;
use crate::GatewayResult;

/// Why the socket loop ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SocketExit {
    /// Remote close, stream end, or transport error
    Closed,
    /// A transition asked for the socket to be closed
    Reset,
    Cancelled,
}

/// Gateway connection for one account
pub struct ConnectionManager {
    account_id: String,
    api: KookApiClient,
    queue: DispatchQueue,
    status_sink: Arc<dyn StatusSink>,
    heartbeat_interval: Duration,
    connect_timeout: Duration,
    policy: ReconnectPolicy,
    state: SessionState,
}

impl ConnectionManager {
    /// Create a manager for `account`
    ///
    /// Fails if the account has no token.
    pub fn new(
        account: &AccountConfig,
        api_config: &ApiConfig,
        settings: &GatewaySettings,
        router: Arc<dyn ReplyRouter>,
        status_sink: Arc<dyn StatusSink>,
    ) -> GatewayResult<Self> {
        let token = account
            .token()
            .ok_or_else(|| DomainError::MissingToken(account.account_id.clone()))?;
        let api = KookApiClient::new(api_config, token)?;

        let sender = OutboundSender::new(Arc::new(api.clone()), account.text_chunk_limit);
        let dispatcher = EventDispatcher::new(
            account.account_id.clone(),
            EventClassifier::for_account(account),
            router,
            sender,
            status_sink.clone(),
        );

        Ok(Self {
            account_id: account.account_id.clone(),
            api,
            queue: DispatchQueue::new(dispatcher),
            status_sink,
            heartbeat_interval: settings.heartbeat_interval(),
            connect_timeout: settings.connect_timeout(),
            policy: ReconnectPolicy::from(settings),
            state: SessionState::from_settings(settings),
        })
    }

    pub fn account_id(&self) -> &str {
        &self.account_id
    }

    /// Current session state
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Run until `cancel` fires
    ///
    /// Returns only after the socket is closed, the heartbeat stopped, and the
    /// dispatch worker finished.
    pub async fn run(mut self, cancel: CancellationToken) {
        tracing::info!("Kook provider started");
        self.report(StatusPatch::started(Utc::now()));
        let worker = self.queue.start(cancel.clone());

        while !cancel.is_cancelled() {
            if let Err(e) = self.step(&cancel).await {
                if e.is_transient() {
                    tracing::warn!(error = %e, "Gateway loop error");
                } else {
                    tracing::error!(error = %e, "Gateway loop error");
                }
                self.report(StatusPatch::error(e.to_string()));
                if !sleep_or_cancel(self.policy.error_backoff, &cancel).await {
                    break;
                }
            }
        }

        if let Some(worker) = worker {
            if let Err(e) = worker.await {
                tracing::error!(error = %e, "Dispatch worker failed");
            }
        }

        self.report(StatusPatch::stopped(Utc::now()));
        tracing::info!("Kook provider stopped");
    }

    /// One main-loop iteration
    async fn step(&mut self, cancel: &CancellationToken) -> GatewayResult<()> {
        if self.state.gateway_url().is_none() {
            self.resolve_gateway().await?;
        }

        if self.state.session_id().is_none() && self.state.gateway_url().is_some() {
            self.connect(false, cancel).await;
        }

        if cancel.is_cancelled() || !sleep_or_cancel(self.policy.inter_backoff, cancel).await {
            return Ok(());
        }

        if self.state.session_id().is_some() {
            self.connect(true, cancel).await;
        }
        Ok(())
    }

    /// Look up the gateway endpoint, and the bot identity while it is unknown
    async fn resolve_gateway(&mut self) -> GatewayResult<()> {
        if self.state.self_user_id().is_empty() {
            match self.api.self_user().await {
                Ok(user) => {
                    tracing::info!(self_user_id = %user.id, "Resolved bot identity");
                    self.state.set_self_user_id(user.id);
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Self identity lookup failed; mention filter disabled");
                }
            }
        }

        let url = self.api.gateway_url().await?;
        tracing::debug!("Gateway endpoint resolved");
        self.apply(LifecycleEvent::GatewayResolved { url });
        Ok(())
    }

    /// Open a socket (fresh or resumed) and run it until it closes
    async fn connect(&mut self, resume: bool, cancel: &CancellationToken) {
        if cancel.is_cancelled() {
            return;
        }
        let Some(gateway_url) = self.state.gateway_url() else {
            return;
        };

        let resume_params = if resume {
            self.state.session_id().map(|session_id| ResumeParams {
                session_id,
                sequence: self.state.highest_delivered(),
            })
        } else {
            None
        };
        let url = socket::connect_url(gateway_url, resume_params.as_ref());

        let opened = match url {
            Ok(url) => {
                tokio::select! {
                    () = cancel.cancelled() => return,
                    result = socket::open(&url, self.connect_timeout) => result,
                }
            }
            Err(e) => Err(e),
        };

        let ws = match opened {
            Ok(ws) => ws,
            Err(e) => {
                tracing::warn!(resume, error = %e, "Gateway connect failed");
                self.apply(LifecycleEvent::ConnectFailed);
                return;
            }
        };

        tracing::info!(
            resume,
            sn = self.state.highest_delivered(),
            "Gateway socket open"
        );
        self.apply(LifecycleEvent::SocketOpened);

        let exit = self.run_socket(ws, cancel).await;
        tracing::info!(?exit, "Gateway socket closed");
        self.apply(LifecycleEvent::SocketClosed);
    }

    /// Read frames and send heartbeats until the socket ends
    async fn run_socket(&mut self, ws: GatewaySocket, cancel: &CancellationToken) -> SocketExit {
        let (mut sink, mut stream) = ws.split();
        let mut heartbeat: Option<HeartbeatMonitor> = None;

        let exit = loop {
            tokio::select! {
                () = cancel.cancelled() => break SocketExit::Cancelled,

                () = next_beat(&mut heartbeat) => {
                    if !self.state.is_sessioned() {
                        continue;
                    }
                    let sn = self.state.highest_delivered();
                    match GatewayFrame::ping(sn).encode() {
                        Ok(text) => {
                            if let Err(e) = sink.send(Message::Text(text)).await {
                                tracing::warn!(error = %e, "Heartbeat send failed");
                                break SocketExit::Closed;
                            }
                            tracing::trace!(sn, "Heartbeat sent");
                        }
                        Err(e) => tracing::warn!(error = %e, "Heartbeat encode failed"),
                    }
                }

                message = stream.next() => match message {
                    Some(Ok(Message::Text(text))) => {
                        if self.on_text(&text, &mut heartbeat) {
                            break SocketExit::Reset;
                        }
                    }
                    Some(Ok(Message::Close(frame))) => {
                        tracing::debug!(?frame, "Server closed socket");
                        break SocketExit::Closed;
                    }
                    Some(Ok(Message::Binary(_))) => {
                        tracing::debug!("Ignoring binary frame");
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        tracing::warn!(error = %e, "Gateway socket error");
                        break SocketExit::Closed;
                    }
                    None => break SocketExit::Closed,
                },
            }
        };

        drop(heartbeat);
        if exit != SocketExit::Closed {
            if let Err(e) = sink.send(Message::Close(None)).await {
                tracing::debug!(error = %e, "Close frame not sent");
            }
        }
        exit
    }

    /// Handle one text frame; returns true when the socket must be closed
    fn on_text(&mut self, text: &str, heartbeat: &mut Option<HeartbeatMonitor>) -> bool {
        let frame = match GatewayFrame::decode(text) {
            Ok(frame) => frame,
            Err(e) => {
                tracing::debug!(error = %e, "Dropping malformed frame");
                return false;
            }
        };

        let outcome = handle_frame(&mut self.state, frame);
        let close = self.execute(outcome.effects, heartbeat);

        for payload in outcome.events {
            self.queue.push(payload, self.state.self_user_id());
        }
        close
    }

    /// Carry out transition effects; returns true when a close was requested
    fn execute(&self, effects: Vec<Effect>, heartbeat: &mut Option<HeartbeatMonitor>) -> bool {
        let mut close = false;
        for effect in effects {
            match effect {
                Effect::StartHeartbeat => {
                    *heartbeat = Some(HeartbeatMonitor::start(self.heartbeat_interval));
                }
                Effect::StopHeartbeat => *heartbeat = None,
                Effect::CloseSocket => close = true,
                Effect::StatusChanged(status) => self.report_status(status),
            }
        }
        close
    }

    /// Apply an event outside the socket loop
    fn apply(&mut self, event: LifecycleEvent) {
        let mut idle = None;
        let effects = self.state.apply(event);
        self.execute(effects, &mut idle);
    }

    fn report_status(&self, status: ConnectionStatus) {
        tracing::info!(
            status = %status,
            attempts = self.state.reconnect_attempts(),
            "Gateway status changed"
        );
        self.report(
            StatusPatch::running(status == ConnectionStatus::Sessioned)
                .with_connected(status.is_connected()),
        );
    }

    fn report(&self, patch: StatusPatch) {
        self.status_sink.on_status(&self.account_id, patch);
    }
}

/// Sleep for `duration`; returns false if cancelled first
async fn sleep_or_cancel(duration: Duration, cancel: &CancellationToken) -> bool {
    tokio::select! {
        () = cancel.cancelled() => false,
        () = tokio::time::sleep(duration) => true,
    }
}
