//! Kook REST client
//!
//! Covers the calls the gateway needs: endpoint lookup, self identity, and
//! message creation. Every request carries `Authorization: Bot <token>`.

use async_trait::async_trait;
use kook_common::ApiConfig;
use kook_core::SendReceipt;
use reqwest::{header, Client};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

use super::envelope::{ApiEnvelope, CreatedMessage, GatewayData, SelfUser};
use super::{ApiError, ApiResult};
use crate::protocol::MESSAGE_TYPE_KMARKDOWN;

/// Sends one message-create call
///
/// The outbound sender is written against this seam so it can be exercised
/// without a live API.
#[async_trait]
pub trait MessageTransport: Send + Sync {
    async fn create_message(&self, target_id: &str, content: &str) -> ApiResult<SendReceipt>;
}

/// REST client bound to one bot token
#[derive(Clone)]
pub struct KookApiClient {
    client: Client,
    base_url: String,
}

impl KookApiClient {
    /// Create a client for `token`
    pub fn new(config: &ApiConfig, token: &str) -> ApiResult<Self> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            header::HeaderValue::from_str(&format!("Bot {}", token.trim()))?,
        );

        let client = Client::builder()
            .default_headers(headers)
            .timeout(config.request_timeout())
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn get(&self, path: &str) -> ApiResult<ApiEnvelope> {
        let envelope = self
            .client
            .get(self.url(path))
            .send()
            .await?
            .json::<ApiEnvelope>()
            .await?;
        debug!(path, code = envelope.code, "Kook API response");
        Ok(envelope)
    }

    /// Look up the websocket endpoint (`GET /gateway/index?compress=0`)
    ///
    /// The returned URL already carries the token.
    pub async fn gateway_url(&self) -> ApiResult<String> {
        let data: GatewayData = self
            .get("/gateway/index?compress=0")
            .await?
            .into_data("gateway url")?;
        Ok(data.url)
    }

    /// Look up the bot's own identity (`GET /user/me`)
    pub async fn self_user(&self) -> ApiResult<SelfUser> {
        self.get("/user/me").await?.into_data("user")
    }

    /// Post one KMarkdown message (`POST /message/create`)
    ///
    /// A non-zero API code is a rejected receipt, not an error.
    pub async fn create_message(&self, target_id: &str, content: &str) -> ApiResult<SendReceipt> {
        let envelope = self
            .client
            .post(self.url("/message/create"))
            .json(&json!({
                "target_id": target_id,
                "content": content,
                "type": MESSAGE_TYPE_KMARKDOWN,
            }))
            .send()
            .await?
            .json::<ApiEnvelope>()
            .await?;

        if !envelope.is_success() {
            debug!(code = envelope.code, message = %envelope.message, "Message rejected");
            return Ok(SendReceipt::rejected());
        }

        match envelope.into_data::<CreatedMessage>("message id") {
            Ok(created) => Ok(SendReceipt::delivered(created.msg_id)),
            Err(_) => Ok(SendReceipt {
                ok: true,
                message_id: None,
            }),
        }
    }
}

#[async_trait]
impl MessageTransport for KookApiClient {
    async fn create_message(&self, target_id: &str, content: &str) -> ApiResult<SendReceipt> {
        KookApiClient::create_message(self, target_id, content).await
    }
}

// ============================================================================
// Account probe
// ============================================================================

/// Identity reported by a successful probe
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeUser {
    pub id: String,
    pub username: String,
}

/// Outcome of checking a token against `GET /user/me`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeResult {
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<ProbeUser>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ProbeResult {
    fn failed(error: impl Into<String>) -> Self {
        Self {
            ok: false,
            user: None,
            error: Some(error.into()),
        }
    }
}

/// Check that a token is accepted and report the bot identity
///
/// Never fails; problems are reported in the result.
pub async fn probe_account(config: &ApiConfig, token: &str) -> ProbeResult {
    if token.trim().is_empty() {
        return ProbeResult::failed("bot token missing");
    }

    let client = match KookApiClient::new(config, token) {
        Ok(client) => client,
        Err(e) => return ProbeResult::failed(e.to_string()),
    };

    match client.self_user().await {
        Ok(user) => ProbeResult {
            ok: true,
            user: Some(ProbeUser {
                id: user.id,
                username: user
                    .username
                    .filter(|name| !name.is_empty())
                    .unwrap_or_else(|| "bot".to_string()),
            }),
            error: None,
        },
        Err(ApiError::Api { message, .. }) if !message.is_empty() => ProbeResult::failed(message),
        Err(ApiError::Api { .. }) => ProbeResult::failed("Unknown error"),
        Err(e) => ProbeResult::failed(e.to_string()),
    }
}
