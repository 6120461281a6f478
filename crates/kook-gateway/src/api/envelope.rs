//! Response envelope shared by every Kook REST endpoint

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use super::{ApiError, ApiResult};

/// `{code, message, data}` response body
///
/// `data` stays untyped until the code is checked; error responses carry
/// whatever shape the server likes there.
#[derive(Debug, Deserialize)]
pub struct ApiEnvelope {
    pub code: i64,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub data: Value,
}

impl ApiEnvelope {
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.code == 0
    }

    /// Decode `data`, failing on a non-zero code or a missing body
    pub fn into_data<T: DeserializeOwned>(self, what: &'static str) -> ApiResult<T> {
        if !self.is_success() {
            return Err(ApiError::Api {
                code: self.code,
                message: self.message,
            });
        }
        if self.data.is_null() {
            return Err(ApiError::MissingData(what));
        }
        T::deserialize(self.data).map_err(|_| ApiError::MissingData(what))
    }
}

/// `data` of `GET /gateway/index`
#[derive(Debug, Deserialize)]
pub struct GatewayData {
    pub url: String,
}

/// `data` of `GET /user/me`
#[derive(Debug, Clone, Deserialize)]
pub struct SelfUser {
    #[serde(deserialize_with = "lenient_id")]
    pub id: String,
    #[serde(default)]
    pub username: Option<String>,
}

/// `data` of `POST /message/create`
#[derive(Debug, Deserialize)]
pub struct CreatedMessage {
    pub msg_id: String,
}

fn lenient_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => s,
        serde_json::Value::Number(n) => n.to_string(),
        _ => String::new(),
    })
}
