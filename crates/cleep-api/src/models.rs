// RPC server request/response types
//
// Every command response is wrapped in the `RpcResponse` envelope. The
// poll channel reuses the same envelope with an event object (or null on
// an idle long-poll) as `data`.

use serde::{Deserialize, Serialize};

// ── Command ──────────────────────────────────────────────────────────

/// Body of `POST /command`.
///
/// ```json
/// { "to": "parameters", "command": "set_hostname", "params": { "hostname": "pi" } }
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct CommandRequest<'a> {
    /// Target module name.
    pub to: &'a str,
    pub command: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<&'a serde_json::Value>,
    /// Server-side command timeout in seconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<f64>,
}

/// Standard RPC response envelope.
///
/// `error == true` means the module rejected the command; `message` then
/// carries the reason and `data` is usually null.
#[derive(Debug, Clone, Deserialize)]
pub struct RpcResponse {
    #[serde(default)]
    pub error: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub data: serde_json::Value,
}

// ── Event polling ────────────────────────────────────────────────────

/// Response of `POST /registerpoll`.
#[derive(Debug, Clone, Deserialize)]
pub struct PollRegistration {
    pub pollkey: String,
}

/// Body of `POST /poll`.
#[derive(Debug, Clone, Serialize)]
pub struct PollRequest<'a> {
    pub pollkey: &'a str,
}

/// An event delivered through the poll channel.
///
/// `params` is kept raw; typed decoding happens in `cleep-core` so an
/// unknown event never breaks the channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PollEvent {
    /// Dotted event name, e.g. `"parameters.time.now"`.
    pub event: String,
    /// Device the event is about, when the emitter targets one.
    #[serde(default)]
    pub device_id: Option<String>,
    #[serde(default)]
    pub params: serde_json::Value,
}
