//! Application configuration structs
//!
//! Loads configuration from an optional `kook.toml` file layered under
//! `KOOK__`-prefixed environment variables.

use serde::Deserialize;
use std::env;
use std::time::Duration;

use super::accounts::ChannelSection;

/// Environment variable holding the shared bot token fallback
pub const BOT_TOKEN_VAR: &str = "KOOK_BOT_TOKEN";

/// Main application configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub app: AppSettings,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub gateway: GatewaySettings,
    #[serde(default)]
    pub channel: ChannelSection,
    /// Value of `KOOK_BOT_TOKEN` captured at load time
    #[serde(skip)]
    pub env_token: Option<String>,
}

/// General application settings
#[derive(Debug, Clone, Deserialize)]
pub struct AppSettings {
    #[serde(default = "default_app_name")]
    pub name: String,
    #[serde(default)]
    pub env: Environment,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            name: default_app_name(),
            env: Environment::default(),
        }
    }
}

/// Environment type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl Environment {
    #[must_use]
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    #[must_use]
    pub fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }
}

/// REST API configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_api_base_url")]
    pub base_url: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_api_base_url(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl ApiConfig {
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Gateway connection tuning
///
/// The reconnect policy fields are fixed for the lifetime of the process.
#[derive(Debug, Clone, Deserialize)]
pub struct GatewaySettings {
    #[serde(default = "default_heartbeat_interval_ms")]
    pub heartbeat_interval_ms: u64,
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
    #[serde(default = "default_max_reconnect_attempts")]
    pub max_reconnect_attempts: u32,
    #[serde(default = "default_inter_backoff_ms")]
    pub inter_backoff_ms: u64,
    #[serde(default = "default_error_backoff_ms")]
    pub error_backoff_ms: u64,
    #[serde(default = "default_max_pending_events")]
    pub max_pending_events: usize,
}

impl Default for GatewaySettings {
    fn default() -> Self {
        Self {
            heartbeat_interval_ms: default_heartbeat_interval_ms(),
            connect_timeout_ms: default_connect_timeout_ms(),
            max_reconnect_attempts: default_max_reconnect_attempts(),
            inter_backoff_ms: default_inter_backoff_ms(),
            error_backoff_ms: default_error_backoff_ms(),
            max_pending_events: default_max_pending_events(),
        }
    }
}

impl GatewaySettings {
    #[must_use]
    pub fn heartbeat_interval(&self) -> Duration {
        Duration::from_millis(self.heartbeat_interval_ms)
    }

    #[must_use]
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    #[must_use]
    pub fn inter_backoff(&self) -> Duration {
        Duration::from_millis(self.inter_backoff_ms)
    }

    #[must_use]
    pub fn error_backoff(&self) -> Duration {
        Duration::from_millis(self.error_backoff_ms)
    }
}

// Default value functions
fn default_app_name() -> String {
    "kook-gateway".to_string()
}

fn default_api_base_url() -> String {
    "https://www.kookapp.cn/api/v3".to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_heartbeat_interval_ms() -> u64 {
    30_000
}

fn default_connect_timeout_ms() -> u64 {
    10_000
}

fn default_max_reconnect_attempts() -> u32 {
    5
}

fn default_inter_backoff_ms() -> u64 {
    2_000
}

fn default_error_backoff_ms() -> u64 {
    5_000
}

fn default_max_pending_events() -> usize {
    1024
}

impl AppConfig {
    /// Load configuration from `kook.toml` (optional) and the environment
    ///
    /// # Errors
    /// Returns an error if a source cannot be parsed or a value is invalid
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let settings = config::Config::builder()
            .add_source(config::File::with_name("kook").required(false))
            .add_source(
                config::Environment::with_prefix("KOOK")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let mut config: Self = settings.try_deserialize()?;
        config.env_token = env::var(BOT_TOKEN_VAR).ok();
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from a TOML document, without consulting the environment
    pub fn from_toml_str(toml: &str) -> Result<Self, ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::from_str(toml, config::FileFormat::Toml))
            .build()?;

        let config: Self = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Check values that would make the gateway misbehave
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.gateway.heartbeat_interval_ms == 0 {
            return Err(ConfigError::InvalidValue(
                "gateway.heartbeat_interval_ms",
                "must be positive".to_string(),
            ));
        }
        if self.gateway.max_reconnect_attempts == 0 {
            return Err(ConfigError::InvalidValue(
                "gateway.max_reconnect_attempts",
                "must be positive".to_string(),
            ));
        }
        if self.gateway.max_pending_events == 0 {
            return Err(ConfigError::InvalidValue(
                "gateway.max_pending_events",
                "must be positive".to_string(),
            ));
        }
        if self.channel.text_chunk_limit == Some(0) {
            return Err(ConfigError::InvalidValue(
                "channel.text_chunk_limit",
                "must be positive".to_string(),
            ));
        }
        if !is_http_url(&self.api.base_url) {
            return Err(ConfigError::InvalidValue(
                "api.base_url",
                self.api.base_url.clone(),
            ));
        }
        Ok(())
    }
}

fn is_http_url(raw: &str) -> bool {
    url::Url::parse(raw)
        .is_ok_and(|url| matches!(url.scheme(), "http" | "https") && url.host_str().is_some())
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read configuration: {0}")]
    Source(#[from] config::ConfigError),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),

    #[error("Unknown account: {0}")]
    UnknownAccount(String),

    #[error("No Kook accounts configured")]
    NoAccounts,
}
