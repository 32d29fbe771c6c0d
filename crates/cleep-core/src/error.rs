// ── Core error types ──
//
// User-facing errors from cleep-core. Consumers never see HTTP status
// codes or JSON parse failures directly: the `From<cleep_api::Error>` impl
// translates transport-layer errors into domain-appropriate variants.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot connect to device at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("Device request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    // ── Operation errors ─────────────────────────────────────────────
    #[error("Command '{command}' rejected by device: {message}")]
    Rejected { command: String, message: String },

    #[error("Validation failed: {message}")]
    ValidationFailed { message: String },

    // ── Payload errors ───────────────────────────────────────────────
    /// The module config payload was malformed; nothing was merged.
    #[error("Invalid config received from module '{module}': {message}")]
    InvalidConfig { module: String, message: String },

    /// An event payload was malformed; nothing was applied.
    #[error("Invalid '{event}' event: {message}")]
    InvalidEvent { event: String, message: String },

    // ── API errors (wrapped, not exposed raw) ────────────────────────
    #[error("API error: {message}")]
    Api {
        message: String,
        /// HTTP status code (if applicable).
        status: Option<u16>,
    },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<cleep_api::Error> for CoreError {
    fn from(err: cleep_api::Error) -> Self {
        match err {
            cleep_api::Error::Authentication { message } => {
                CoreError::AuthenticationFailed { message }
            }
            cleep_api::Error::Transport(ref e) => {
                if e.is_timeout() {
                    CoreError::Timeout { timeout_secs: 0 }
                } else if e.is_connect() {
                    CoreError::ConnectionFailed {
                        url: e
                            .url()
                            .map_or_else(|| "<unknown>".into(), ToString::to_string),
                        reason: e.to_string(),
                    }
                } else {
                    CoreError::Api {
                        message: e.to_string(),
                        status: e.status().map(|s| s.as_u16()),
                    }
                }
            }
            cleep_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            cleep_api::Error::Timeout { timeout_secs } => CoreError::Timeout { timeout_secs },
            cleep_api::Error::Tls(msg) => CoreError::ConnectionFailed {
                url: String::new(),
                reason: format!("TLS error: {msg}"),
            },
            cleep_api::Error::Http { status, message } => CoreError::Api {
                message,
                status: Some(status),
            },
            cleep_api::Error::Rpc {
                command, message, ..
            } => CoreError::Rejected { command, message },
            cleep_api::Error::PollKeyRejected { message } => CoreError::Api {
                message: format!("event channel closed by device: {message}"),
                status: None,
            },
            cleep_api::Error::Deserialization { message, body: _ } => {
                CoreError::Internal(format!("Deserialization error: {message}"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rpc_rejection_keeps_command_and_message() {
        let err = CoreError::from(cleep_api::Error::Rpc {
            command: "enable_auth".into(),
            module: "parameters".into(),
            message: "Please add account before enabling auth".into(),
        });
        match err {
            CoreError::Rejected { command, message } => {
                assert_eq!(command, "enable_auth");
                assert_eq!(message, "Please add account before enabling auth");
            }
            other => panic!("unexpected mapping: {other:?}"),
        }
    }

    #[test]
    fn api_timeout_maps_to_core_timeout() {
        let err = CoreError::from(cleep_api::Error::Timeout { timeout_secs: 30 });
        assert!(matches!(err, CoreError::Timeout { timeout_secs: 30 }));
    }
}
