// ── Authentication account rows ──

use serde::Serialize;

use crate::reconcile::Keyed;

/// Action a panel row can trigger. Executed by
/// [`ParametersPanel::dispatch`](crate::ParametersPanel::dispatch).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum PanelAction {
    DeleteAuthAccount { account: String },
}

/// A clickable icon on a row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowAction {
    pub icon: String,
    pub tooltip: String,
    pub action: PanelAction,
}

/// UI-only decoration of a list row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisplayMeta {
    pub icon: String,
    pub label: String,
    pub actions: Vec<RowAction>,
}

/// One configured authentication account, as shown in the panel.
///
/// Entries are never mutated: the reconciler creates and drops them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccountEntry {
    pub identifier: String,
    pub display: DisplayMeta,
}

impl AccountEntry {
    pub fn new(identifier: &str) -> Self {
        Self {
            identifier: identifier.to_owned(),
            display: DisplayMeta {
                icon: "account".into(),
                label: identifier.to_owned(),
                actions: vec![RowAction {
                    icon: "delete".into(),
                    tooltip: "Delete".into(),
                    action: PanelAction::DeleteAuthAccount {
                        account: identifier.to_owned(),
                    },
                }],
            },
        }
    }
}

impl Keyed for AccountEntry {
    fn key(&self) -> &str {
        &self.identifier
    }
}
