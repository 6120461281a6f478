//! Account supervisor
//!
//! Starts one connection manager per enabled account and waits for all of
//! them. The managers share nothing but a cancellation token.

use kook_common::AppConfig;
use kook_core::{ReplyRouter, StatusPatch, StatusSink};
use std::sync::Arc;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

use crate::connection::ConnectionManager;
use crate::{GatewayError, GatewayResult};

/// Runs the gateway connections of every enabled account
pub struct Supervisor {
    config: AppConfig,
    router: Arc<dyn ReplyRouter>,
    status_sink: Arc<dyn StatusSink>,
}

impl Supervisor {
    pub fn new(
        config: AppConfig,
        router: Arc<dyn ReplyRouter>,
        status_sink: Arc<dyn StatusSink>,
    ) -> Self {
        Self {
            config,
            router,
            status_sink,
        }
    }

    /// Build a manager for every enabled account
    ///
    /// Accounts that cannot start are reported to the status sink and skipped.
    pub fn managers(&self) -> GatewayResult<Vec<ConnectionManager>> {
        let mut managers = Vec::new();
        for account in self.config.enabled_accounts()? {
            match ConnectionManager::new(
                &account,
                &self.config.api,
                &self.config.gateway,
                self.router.clone(),
                self.status_sink.clone(),
            ) {
                Ok(manager) => managers.push(manager),
                Err(e) => {
                    tracing::error!(account_id = %account.account_id, error = %e, "Account not started");
                    self.status_sink
                        .on_status(&account.account_id, StatusPatch::error(e.to_string()));
                }
            }
        }

        if managers.is_empty() {
            return Err(GatewayError::NoRunnableAccounts);
        }
        Ok(managers)
    }

    /// Run every account until `cancel` fires and all connections have stopped
    pub async fn run(self, cancel: CancellationToken) -> GatewayResult<()> {
        let managers = self.managers()?;
        let mut tasks = JoinSet::new();

        for manager in managers {
            let span = tracing::info_span!("kook", account_id = %manager.account_id());
            tasks.spawn(manager.run(cancel.child_token()).instrument(span));
        }
        tracing::info!(accounts = tasks.len(), "Kook gateway running");

        while let Some(result) = tasks.join_next().await {
            if let Err(e) = result {
                tracing::error!(error = %e, "Connection task failed");
            }
        }
        Ok(())
    }
}

/// Run the gateway for `config` until `cancel` fires
pub async fn run(
    config: AppConfig,
    router: Arc<dyn ReplyRouter>,
    status_sink: Arc<dyn StatusSink>,
    cancel: CancellationToken,
) -> GatewayResult<()> {
    Supervisor::new(config, router, status_sink).run(cancel).await
}
