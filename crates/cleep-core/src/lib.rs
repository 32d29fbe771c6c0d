//! Client-side synchronization layer between a Cleep device and its
//! settings panels.
//!
//! - **[`ParametersPanel`]** keeps a panel's [`ParametersView`] consistent
//!   with the backend-owned module configuration. Every mutation issues one
//!   scoped command, re-fetches the canonical config and merges it back;
//!   nothing is patched optimistically.
//!
//! - **[`reconcile`](reconcile::reconcile)**: minimal-diff list
//!   synchronization that keeps unchanged entries (same `Arc`) in place.
//!
//! - **[`EventHub`]** / **[`DeviceStore`]**: poll-driven event fan-out and
//!   an injectable device container; [`spawn_clock_sync`] merges the
//!   `parameters.time.now` event into the clock device.
//!
//! - **Seams**: [`CommandSender`], [`EventSource`] and [`Notifier`] are the
//!   traits behind which the transport and toast system live.
//!   `cleep_api::RpcClient` implements the first two.

pub mod command;
pub mod config;
pub mod error;
pub mod events;
pub mod model;
pub mod notify;
pub mod panel;
pub mod reconcile;
pub mod store;
pub mod validate;

#[cfg(test)]
mod testing;

// ── Primary re-exports ──────────────────────────────────────────────
pub use command::{CommandSender, ParametersCommand, connect};
pub use config::{ClientConfig, Credentials, TlsVerification};
pub use error::CoreError;
pub use events::{EventHub, EventSource, ReconnectConfig, Subscription, spawn_clock_sync};
pub use notify::{FailurePolicy, Notice, NoticeLog, Notifier, TracingNotifier};
pub use panel::{PARAMETERS_MODULE, ParametersPanel, SET_POSITION_TIMEOUT, SyncOutcome};
pub use reconcile::{Keyed, ReconcileReport};
pub use store::DeviceStore;
pub use validate::is_valid_hostname;

pub use model::{
    AccountEntry, Country, Device, DisplayMeta, ModuleConfig, ModuleEvent, PanelAction,
    ParametersEvent, ParametersView, Position, RowAction, SunTimes, TimeNow,
};
