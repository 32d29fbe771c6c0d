// ── Runtime connection configuration ──
//
// These types describe *how* to reach a Cleep device. They carry
// credential data and connection tuning, but never touch disk.
// The CLI constructs a `ClientConfig` and hands it in.

use std::time::Duration;

use secrecy::SecretString;
use url::Url;

use crate::events::ReconnectConfig;
use crate::notify::FailurePolicy;

/// Basic-auth credentials, only needed once secured access is enabled
/// on the device.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: SecretString,
}

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict).
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(std::path::PathBuf),
    /// Skip verification (self-signed certs). Default for devices on the LAN.
    #[default]
    DangerAcceptInvalid,
}

/// Configuration for talking to a single device.
///
/// Built by the CLI, passed to [`connect`](crate::connect) -- core never
/// reads config files.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// RPC server URL (e.g., `http://cleep.local`).
    pub url: Url,
    /// Credentials for secured access, if enabled.
    pub credentials: Option<Credentials>,
    /// TLS verification strategy.
    pub tls: TlsVerification,
    /// Default request timeout.
    pub timeout: Duration,
    /// Whether failed panel mutations also emit an error notice.
    pub failure_policy: FailurePolicy,
    /// Backoff for the event poll loop.
    pub reconnect: ReconnectConfig,
}

impl ClientConfig {
    /// Config with defaults for everything but the URL.
    pub fn new(url: Url) -> Self {
        Self {
            url,
            credentials: None,
            tls: TlsVerification::default(),
            timeout: Duration::from_secs(30),
            failure_policy: FailurePolicy::default(),
            reconnect: ReconnectConfig::default(),
        }
    }
}
