use thiserror::Error;

/// Top-level error type for the `cleep-api` crate.
///
/// Covers every failure mode of the RPC server surface: transport,
/// authentication, command rejection, payload decoding and the event
/// polling channel. `cleep-core` maps these into user-facing variants.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// The RPC server refused the request (auth enabled, bad or no credentials).
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Request timed out.
    #[error("Request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    /// TLS handshake or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),

    /// Non-success HTTP status outside the auth range.
    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    // ── RPC ─────────────────────────────────────────────────────────
    /// The module rejected the command (`{"error": true, "message": ...}`).
    #[error("Command '{command}' rejected by module '{module}': {message}")]
    Rpc {
        command: String,
        module: String,
        message: String,
    },

    // ── Events ──────────────────────────────────────────────────────
    /// The poll key was refused or expired; the caller must register again.
    #[error("Event poll key rejected: {message}")]
    PollKeyRejected { message: String },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Returns `true` if this error indicates auth is required or was refused.
    pub fn is_auth_error(&self) -> bool {
        matches!(self, Self::Authentication { .. })
    }

    /// Returns `true` if this is a transient error worth retrying.
    ///
    /// Only the event poll loop retries; commands never do.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            Self::Timeout { .. } | Self::PollKeyRejected { .. } => true,
            Self::Http { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// Returns `true` if the module itself rejected the command.
    pub fn is_rejection(&self) -> bool {
        matches!(self, Self::Rpc { .. })
    }
}
