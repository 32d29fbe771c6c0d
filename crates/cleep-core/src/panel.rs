// ── Parameters panel ──
//
// Keeps a `ParametersView` consistent with the module configuration owned by
// the device. Every mutation follows the same round trip:
//
//   guard locally -> (loading notice) -> one scoped command ->
//   one re-fetch of the canonical config -> merge -> success notice
//
// Any failure aborts the remaining steps. Nothing is patched optimistically:
// the view only changes when a re-fetched config is merged.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use serde_json::json;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::command::{CommandSender, ParametersCommand};
use crate::error::CoreError;
use crate::model::{ModuleConfig, PanelAction, ParametersView, Position, SunTimes};
use crate::notify::{FailurePolicy, Notifier};

/// Name of the module this panel talks to by default.
pub const PARAMETERS_MODULE: &str = "parameters";

/// `set_position` recomputes sun times on the device and needs longer than
/// the default request timeout.
pub const SET_POSITION_TIMEOUT: Duration = Duration::from_secs(30);

const MSG_HOSTNAME_SAVED: &str = "Device name saved";
const MSG_SELECT_POSITION: &str = "Please select position before setting position";
const MSG_POSITION_UNCHANGED: &str = "Position not changed";
const MSG_SETTING_POSITION: &str = "Setting localisation...";
const MSG_POSITION_SAVED: &str = "Localisation saved";
const MSG_AUTH_UPDATED: &str = "Secured access updated";
const MSG_ACCOUNT_CREATED: &str = "Account created";
const MSG_ACCOUNT_DELETED: &str = "Account deleted";

/// How a panel operation settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// The re-fetched config was merged into the view.
    Applied,
    /// The command succeeded but a newer operation had already merged; the
    /// stale config was discarded.
    Superseded,
    /// A local guard stopped the operation before any remote call.
    Skipped,
}

/// Configuration panel for one module, generic over the transport and the
/// notification side-channel.
pub struct ParametersPanel<S, N> {
    module: String,
    sender: S,
    notifier: N,
    failure_policy: FailurePolicy,
    view: watch::Sender<ParametersView>,
    next_ticket: AtomicU64,
    /// Ticket of the last merged config. Only touched under the view lock.
    applied_ticket: AtomicU64,
}

impl<S: CommandSender, N: Notifier> ParametersPanel<S, N> {
    pub fn new(sender: S, notifier: N) -> Self {
        Self::with_module(PARAMETERS_MODULE, sender, notifier)
    }

    /// Panel bound to another module name (renamed or legacy deployments).
    pub fn with_module(module: impl Into<String>, sender: S, notifier: N) -> Self {
        let (view, _) = watch::channel(ParametersView::default());
        Self {
            module: module.into(),
            sender,
            notifier,
            failure_policy: FailurePolicy::default(),
            view,
            next_ticket: AtomicU64::new(0),
            applied_ticket: AtomicU64::new(0),
        }
    }

    pub fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }

    pub fn module(&self) -> &str {
        &self.module
    }

    /// Snapshot of the current view.
    pub fn view(&self) -> ParametersView {
        self.view.borrow().clone()
    }

    /// Receiver notified on every view change.
    pub fn subscribe(&self) -> watch::Receiver<ParametersView> {
        self.view.subscribe()
    }

    pub fn set_pending_account(&self, account: impl Into<String>) {
        let account = account.into();
        self.view.send_modify(|view| view.pending_account = account);
    }

    pub fn set_pending_password(&self, password: SecretString) {
        self.view
            .send_modify(|view| view.pending_password = Some(password));
    }

    // ── Fetching ─────────────────────────────────────────────────────

    /// Fetch the module config and merge it into the view.
    pub async fn initialize(&self) -> Result<SyncOutcome, CoreError> {
        let ticket = self.take_ticket();
        match self.fetch_config().await {
            Ok(config) => Ok(self.apply(ticket, &config, |_| false)),
            Err(e) => {
                self.report_failure(ParametersCommand::GetModuleConfig, &e);
                Err(e)
            }
        }
    }

    /// Current sunrise and sunset. Does not touch the view.
    pub async fn get_sun(&self) -> Result<SunTimes, CoreError> {
        let data = self
            .sender
            .send(ParametersCommand::GetSun.as_ref(), &self.module, None, None)
            .await?;
        serde_json::from_value(data).map_err(|e| CoreError::Api {
            message: format!("invalid get_sun response: {e}"),
            status: None,
        })
    }

    /// Merge an already decoded config. Decoding is all-or-nothing, so a
    /// malformed payload never reaches this point.
    pub fn merge_config(&self, config: &ModuleConfig) -> SyncOutcome {
        let ticket = self.take_ticket();
        self.apply(ticket, config, |_| false)
    }

    // ── Mutations ────────────────────────────────────────────────────

    /// Rename the device. The hostname is expected to be validated already
    /// (see [`is_valid_hostname`](crate::is_valid_hostname)).
    pub async fn set_hostname(&self, hostname: &str) -> Result<SyncOutcome, CoreError> {
        self.mutate(
            ParametersCommand::SetHostname,
            Some(json!({ "hostname": hostname })),
            None,
            MSG_HOSTNAME_SAVED,
            |_| false,
        )
        .await
    }

    /// Move the device. Skipped when a coordinate is unset (zero or NaN) or
    /// when the position is the one already stored.
    #[allow(clippy::float_cmp)]
    pub async fn set_position(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<SyncOutcome, CoreError> {
        if !Position::new(latitude, longitude).is_selected() {
            self.notifier.info(MSG_SELECT_POSITION);
            return Ok(SyncOutcome::Skipped);
        }
        let current = self.view.borrow().position;
        if latitude == current.latitude && longitude == current.longitude {
            self.notifier.info(MSG_POSITION_UNCHANGED);
            return Ok(SyncOutcome::Skipped);
        }

        self.notifier.loading(MSG_SETTING_POSITION);
        self.mutate(
            ParametersCommand::SetPosition,
            Some(json!({ "latitude": latitude, "longitude": longitude })),
            Some(SET_POSITION_TIMEOUT),
            MSG_POSITION_SAVED,
            |_| false,
        )
        .await
    }

    /// Turn secured access on or off. Enabling it twice is the device's call.
    pub async fn set_auth_enabled(&self, enabled: bool) -> Result<SyncOutcome, CoreError> {
        let command = if enabled {
            ParametersCommand::EnableAuth
        } else {
            ParametersCommand::DisableAuth
        };
        self.mutate(command, None, None, MSG_AUTH_UPDATED, |_| false)
            .await
    }

    /// Create an account. The pending form inputs are cleared once the
    /// device confirmed and the new config is merged.
    pub async fn add_auth_account(
        &self,
        account: &str,
        password: &SecretString,
    ) -> Result<SyncOutcome, CoreError> {
        self.mutate(
            ParametersCommand::AddAuthAccount,
            Some(json!({ "account": account, "password": password.expose_secret() })),
            None,
            MSG_ACCOUNT_CREATED,
            ParametersView::clear_pending,
        )
        .await
    }

    /// [`add_auth_account`](Self::add_auth_account) with the pending inputs.
    pub async fn submit_pending_account(&self) -> Result<SyncOutcome, CoreError> {
        let (account, password) = {
            let view = self.view.borrow();
            (view.pending_account.clone(), view.pending_password.clone())
        };
        let password = password.unwrap_or_else(|| SecretString::from(""));
        self.add_auth_account(&account, &password).await
    }

    pub async fn delete_auth_account(&self, account: &str) -> Result<SyncOutcome, CoreError> {
        self.mutate(
            ParametersCommand::DeleteAuthAccount,
            Some(json!({ "account": account })),
            None,
            MSG_ACCOUNT_DELETED,
            |_| false,
        )
        .await
    }

    /// Run an action bound to a view row.
    pub async fn dispatch(&self, action: &PanelAction) -> Result<SyncOutcome, CoreError> {
        match action {
            PanelAction::DeleteAuthAccount { account } => self.delete_auth_account(account).await,
        }
    }

    // ── Round trip ───────────────────────────────────────────────────

    async fn mutate(
        &self,
        command: ParametersCommand,
        params: Option<serde_json::Value>,
        timeout: Option<Duration>,
        success: &str,
        on_confirmed: impl FnOnce(&mut ParametersView) -> bool + Send,
    ) -> Result<SyncOutcome, CoreError> {
        debug!(module = %self.module, %command, "issuing command");

        // Merges are ordered by fetch, so the ticket is taken once the
        // command has landed.
        let result = async {
            self.sender
                .send(command.as_ref(), &self.module, params, timeout)
                .await?;
            let ticket = self.take_ticket();
            Ok::<_, CoreError>((ticket, self.fetch_config().await?))
        }
        .await;

        match result {
            Ok((ticket, config)) => {
                let outcome = self.apply(ticket, &config, on_confirmed);
                self.notifier.success(success);
                Ok(outcome)
            }
            Err(e) => {
                self.report_failure(command, &e);
                Err(e)
            }
        }
    }

    async fn fetch_config(&self) -> Result<ModuleConfig, CoreError> {
        let data = self
            .sender
            .send(
                ParametersCommand::GetModuleConfig.as_ref(),
                &self.module,
                None,
                None,
            )
            .await?;
        ModuleConfig::from_value(&self.module, data)
    }

    /// Merge `config` unless a newer ticket already merged. `on_confirmed`
    /// runs either way: the command itself did succeed. It returns whether
    /// it changed the view; subscribers are only woken on a change.
    fn apply(
        &self,
        ticket: u64,
        config: &ModuleConfig,
        on_confirmed: impl FnOnce(&mut ParametersView) -> bool,
    ) -> SyncOutcome {
        let mut outcome = SyncOutcome::Superseded;
        self.view.send_if_modified(|view| {
            let mut modified = false;
            if ticket > self.applied_ticket.load(Ordering::Relaxed) {
                let report = view.merge(config);
                self.applied_ticket.store(ticket, Ordering::Relaxed);
                if !report.is_empty() {
                    info!(
                        module = %self.module,
                        added = ?report.added,
                        removed = ?report.removed,
                        "auth accounts reconciled"
                    );
                }
                outcome = SyncOutcome::Applied;
                modified = true;
            }
            on_confirmed(view) || modified
        });

        if outcome == SyncOutcome::Superseded {
            debug!(module = %self.module, ticket, "discarding stale config");
        }
        outcome
    }

    fn take_ticket(&self) -> u64 {
        self.next_ticket.fetch_add(1, Ordering::Relaxed) + 1
    }

    fn report_failure(&self, command: ParametersCommand, err: &CoreError) {
        warn!(module = %self.module, %command, error = %err, "panel operation failed");
        if self.failure_policy == FailurePolicy::Notify {
            self.notifier.error(&err.to_string());
        }
    }
}
