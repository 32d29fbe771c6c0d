// ── Domain model ──
//
// Typed mirrors of what the parameters module sends over the wire, plus the
// panel-side view state built from them.

pub mod account;
pub mod device;
pub mod event;
pub mod module_config;
pub mod view;

pub use account::{AccountEntry, DisplayMeta, PanelAction, RowAction};
pub use device::{Device, TimeNow};
pub use event::{ModuleEvent, ParametersEvent};
pub use module_config::{Country, ModuleConfig, Position, SunTimes};
pub use view::ParametersView;

/// Deserialize an `Option<T>` whose key must be present (null allowed).
///
/// Plain `Option` fields treat a missing key as `None`; strict payloads
/// need the key itself to be there.
pub(crate) fn required_nullable<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: serde::Deserialize<'de>,
{
    <Option<T> as serde::Deserialize>::deserialize(deserializer)
}
