// ── Panel view state ──

use std::sync::Arc;

use secrecy::SecretString;
use serde::Serialize;

use super::account::AccountEntry;
use super::module_config::{Country, ModuleConfig, Position, SunTimes};
use crate::reconcile::{ReconcileReport, reconcile};

/// The panel's working copy of the module configuration.
///
/// Scalar fields are 1:1 copies of the last merged [`ModuleConfig`];
/// `auth_accounts` is its reconciled projection. The pending inputs are
/// transient form values and are never serialized.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ParametersView {
    pub hostname: String,
    pub position: Position,
    pub sun: SunTimes,
    pub country: Country,
    pub timezone: Option<String>,
    pub auth_enabled: bool,
    pub auth_accounts: Vec<Arc<AccountEntry>>,
    #[serde(skip)]
    pub pending_account: String,
    #[serde(skip)]
    pub pending_password: Option<SecretString>,
}

impl ParametersView {
    /// Replace every mirrored field with `config`; reconcile the account list.
    pub fn merge(&mut self, config: &ModuleConfig) -> ReconcileReport {
        self.hostname.clone_from(&config.hostname);
        self.position = config.position;
        self.sun = config.sun;
        self.country.clone_from(&config.country);
        self.timezone.clone_from(&config.timezone);
        self.auth_enabled = config.auth_enabled;
        reconcile(&mut self.auth_accounts, &config.auth_accounts, AccountEntry::new)
    }

    /// Identifiers of the displayed accounts, in display order.
    pub fn account_identifiers(&self) -> Vec<&str> {
        self.auth_accounts
            .iter()
            .map(|a| a.identifier.as_str())
            .collect()
    }

    /// Reset the account form. Returns whether anything was pending.
    pub(crate) fn clear_pending(&mut self) -> bool {
        let pending = !self.pending_account.is_empty() || self.pending_password.is_some();
        self.pending_account.clear();
        self.pending_password = None;
        pending
    }
}
