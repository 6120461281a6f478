//! # kook-common
//!
//! Shared utilities including configuration, account resolution, error handling, and telemetry.

pub mod config;
pub mod error;
pub mod telemetry;

// Re-export commonly used types at crate root
pub use self::config::{
    normalize_allow_entry, AccountConfig, AccountSection, ApiConfig, AppConfig, AppSettings,
    ChannelSection, ConfigError, Environment, GatewaySettings, TokenSource, DEFAULT_ACCOUNT_ID,
};
pub use error::{AppError, AppResult};
pub use telemetry::{
    init_tracing, init_tracing_with_config, try_init_tracing, try_init_tracing_with_config,
    TracingConfig, TracingError,
};
