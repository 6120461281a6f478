//! Gateway error types

use kook_common::{AppError, ConfigError};
use kook_core::DomainError;
use std::time::Duration;
use thiserror::Error;
use tokio_tungstenite::tungstenite;

use crate::api::ApiError;

/// Gateway error type
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Socket did not open in time
    #[error("WebSocket connection timed out after {0:?}")]
    ConnectTimeout(Duration),

    /// Websocket transport error
    #[error("WebSocket error: {0}")]
    WebSocket(#[source] Box<tungstenite::Error>),

    /// Gateway URL could not be parsed
    #[error("Invalid gateway URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// REST call failed
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    /// No enabled account could be started
    #[error("No Kook account could be started")]
    NoRunnableAccounts,
}

impl From<tungstenite::Error> for GatewayError {
    fn from(err: tungstenite::Error) -> Self {
        Self::WebSocket(Box::new(err))
    }
}

impl GatewayError {
    /// Check if the reconnect policy should handle this error
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::ConnectTimeout(_) | Self::WebSocket(_) => true,
            Self::Api(e) => e.is_transport(),
            _ => false,
        }
    }
}

impl From<GatewayError> for AppError {
    fn from(err: GatewayError) -> Self {
        match err {
            GatewayError::Config(e) => AppError::Config(e),
            GatewayError::Domain(e) => AppError::Domain(e),
            GatewayError::NoRunnableAccounts => AppError::Config(ConfigError::NoAccounts),
            other => AppError::external(other),
        }
    }
}

/// Gateway result type
pub type GatewayResult<T> = Result<T, GatewayError>;
