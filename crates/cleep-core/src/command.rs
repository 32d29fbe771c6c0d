// ── Command API ──
//
// All remote calls flow through the `CommandSender` seam: a named command
// addressed to a module, with optional params and timeout. The HTTP
// `RpcClient` is the production implementation; tests plug in fakes.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use cleep_api::{RpcClient, TlsMode, TransportConfig};
use tracing::debug;

use crate::config::{ClientConfig, TlsVerification};
use crate::error::CoreError;

/// Commands understood by the parameters module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display, strum::AsRefStr, strum::EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum ParametersCommand {
    GetModuleConfig,
    GetModuleDevices,
    GetSun,
    SetHostname,
    SetPosition,
    EnableAuth,
    DisableAuth,
    AddAuthAccount,
    DeleteAuthAccount,
}

/// Transport seam: `send(command, module, params?, timeout?) -> result`.
///
/// Resolves to the command's `data` payload (a config object for
/// `get_module_config`, an acknowledgement otherwise) or to an error when
/// the transport failed or the module rejected the command.
pub trait CommandSender: Send + Sync {
    fn send(
        &self,
        command: &str,
        module: &str,
        params: Option<serde_json::Value>,
        timeout: Option<Duration>,
    ) -> impl Future<Output = Result<serde_json::Value, CoreError>> + Send;
}

impl CommandSender for RpcClient {
    async fn send(
        &self,
        command: &str,
        module: &str,
        params: Option<serde_json::Value>,
        timeout: Option<Duration>,
    ) -> Result<serde_json::Value, CoreError> {
        Ok(self
            .send_command(command, module, params.as_ref(), timeout)
            .await?)
    }
}

impl<T: CommandSender> CommandSender for Arc<T> {
    fn send(
        &self,
        command: &str,
        module: &str,
        params: Option<serde_json::Value>,
        timeout: Option<Duration>,
    ) -> impl Future<Output = Result<serde_json::Value, CoreError>> + Send {
        (**self).send(command, module, params, timeout)
    }
}

/// Build an `RpcClient` from the runtime configuration.
pub fn connect(config: &ClientConfig) -> Result<RpcClient, CoreError> {
    let mut transport = TransportConfig {
        tls: tls_to_transport(&config.tls),
        timeout: config.timeout,
        credentials: None,
    };
    if let Some(creds) = &config.credentials {
        transport = transport.with_credentials(creds.username.clone(), creds.password.clone());
    }
    debug!(url = %config.url, authenticated = config.credentials.is_some(), "building RPC client");
    Ok(RpcClient::new(config.url.clone(), &transport)?)
}

fn tls_to_transport(tls: &TlsVerification) -> TlsMode {
    match tls {
        TlsVerification::SystemDefaults => TlsMode::System,
        TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
        TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
    }
}
