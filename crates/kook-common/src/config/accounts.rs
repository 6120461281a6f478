//! Channel section and account resolution
//!
//! A deployment configures either a single bot at the top level of the channel
//! section or several named bots under `accounts`. Per-account values override
//! top-level ones, and the token falls back to `KOOK_BOT_TOKEN`.

use serde::Deserialize;
use std::collections::BTreeMap;

use super::app_config::{AppConfig, ConfigError};

/// Account id used when the section configures a single bot
pub const DEFAULT_ACCOUNT_ID: &str = "default";

/// Default maximum characters per outbound message
pub const DEFAULT_TEXT_CHUNK_LIMIT: usize = 2000;

/// `[channel]` section as written by the operator
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChannelSection {
    pub enabled: Option<bool>,
    pub token: Option<String>,
    pub name: Option<String>,
    #[serde(alias = "allowedUserId")]
    pub allowed_user_id: Option<String>,
    #[serde(alias = "requireMention")]
    pub require_mention: Option<bool>,
    #[serde(alias = "textChunkLimit")]
    pub text_chunk_limit: Option<usize>,
    pub accounts: Option<BTreeMap<String, AccountSection>>,
}

impl ChannelSection {
    /// Whether any top-level field is set
    fn has_top_level_fields(&self) -> bool {
        self.enabled.is_some()
            || self.token.is_some()
            || self.name.is_some()
            || self.allowed_user_id.is_some()
            || self.require_mention.is_some()
            || self.text_chunk_limit.is_some()
    }
}

/// Per-account overrides under `[channel.accounts.<id>]`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AccountSection {
    pub enabled: Option<bool>,
    pub token: Option<String>,
    pub name: Option<String>,
    #[serde(alias = "allowedUserId")]
    pub allowed_user_id: Option<String>,
}

/// Where an account's token came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenSource {
    Config,
    Env,
    None,
}

impl TokenSource {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Config => "config",
            Self::Env => "env",
            Self::None => "none",
        }
    }
}

/// Fully resolved account, ready to start a gateway connection
#[derive(Debug, Clone)]
pub struct AccountConfig {
    pub account_id: String,
    pub name: Option<String>,
    pub enabled: bool,
    pub token: Option<String>,
    pub token_source: TokenSource,
    /// Normalized allow-list entry; `None` allows every author
    pub allowed_user_id: Option<String>,
    pub require_mention: bool,
    pub text_chunk_limit: usize,
}

impl AccountConfig {
    /// Trimmed token, if one is configured
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref().map(str::trim).filter(|t| !t.is_empty())
    }

    /// Whether the account can connect at all
    pub fn is_configured(&self) -> bool {
        self.token().is_some()
    }
}

/// Normalize an allow-list entry
///
/// Trims, strips a leading `kook:` or `user:` (any case) and lowercases.
pub fn normalize_allow_entry(entry: &str) -> String {
    let trimmed = entry.trim();
    let lowered = trimmed.to_lowercase();
    let stripped = ["kook:", "user:"]
        .iter()
        .find_map(|prefix| lowered.strip_prefix(prefix))
        .unwrap_or(&lowered);
    stripped.to_string()
}

fn normalize_account_id(account_id: Option<&str>) -> String {
    match account_id.map(str::trim) {
        Some(id) if !id.is_empty() => id.to_string(),
        _ => DEFAULT_ACCOUNT_ID.to_string(),
    }
}

impl AppConfig {
    /// Ids of all configured accounts
    pub fn list_account_ids(&self) -> Vec<String> {
        match &self.channel.accounts {
            Some(accounts) => accounts.keys().cloned().collect(),
            None if self.channel.has_top_level_fields() || self.env_token.is_some() => {
                vec![DEFAULT_ACCOUNT_ID.to_string()]
            }
            None => Vec::new(),
        }
    }

    /// Account used when the caller does not name one
    pub fn default_account_id(&self) -> String {
        self.channel
            .accounts
            .as_ref()
            .and_then(|accounts| accounts.keys().next().cloned())
            .unwrap_or_else(|| DEFAULT_ACCOUNT_ID.to_string())
    }

    /// Resolve an account, applying per-account overrides and the env token fallback
    pub fn resolve_account(&self, account_id: Option<&str>) -> AccountConfig {
        let account_id = normalize_account_id(account_id);
        let section = &self.channel;
        let account = section
            .accounts
            .as_ref()
            .and_then(|accounts| accounts.get(&account_id));

        let (token, token_source) = if let Some(token) = account.and_then(|a| a.token.clone()) {
            (Some(token), TokenSource::Config)
        } else if let Some(token) = section.token.clone() {
            (Some(token), TokenSource::Config)
        } else if let Some(token) = self.env_token.clone() {
            (Some(token), TokenSource::Env)
        } else {
            (None, TokenSource::None)
        };

        let allowed_user_id = account
            .and_then(|a| a.allowed_user_id.as_deref())
            .or(section.allowed_user_id.as_deref())
            .map(normalize_allow_entry)
            .filter(|id| !id.is_empty());

        AccountConfig {
            name: account.and_then(|a| a.name.clone()).or_else(|| section.name.clone()),
            enabled: account
                .and_then(|a| a.enabled)
                .or(section.enabled)
                .unwrap_or(true),
            token,
            token_source,
            allowed_user_id,
            require_mention: section.require_mention.unwrap_or(true),
            text_chunk_limit: section.text_chunk_limit.unwrap_or(DEFAULT_TEXT_CHUNK_LIMIT),
            account_id,
        }
    }

    /// Resolve a named account, failing if it is not configured
    pub fn account(&self, account_id: &str) -> Result<AccountConfig, ConfigError> {
        if self.list_account_ids().iter().any(|id| id == account_id) {
            Ok(self.resolve_account(Some(account_id)))
        } else {
            Err(ConfigError::UnknownAccount(account_id.to_string()))
        }
    }

    /// All enabled accounts
    pub fn enabled_accounts(&self) -> Result<Vec<AccountConfig>, ConfigError> {
        let accounts: Vec<AccountConfig> = self
            .list_account_ids()
            .iter()
            .map(|id| self.resolve_account(Some(id)))
            .filter(|account| account.enabled)
            .collect();

        if accounts.is_empty() {
            return Err(ConfigError::NoAccounts);
        }
        Ok(accounts)
    }
}
