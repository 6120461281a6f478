//! Configuration structs and account resolution

mod accounts;
mod app_config;

pub use accounts::{
    normalize_allow_entry, AccountConfig, AccountSection, ChannelSection, TokenSource,
    DEFAULT_ACCOUNT_ID,
};
pub use app_config::{ApiConfig, AppConfig, AppSettings, ConfigError, Environment, GatewaySettings};
