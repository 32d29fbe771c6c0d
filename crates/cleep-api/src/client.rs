// Cleep RPC server HTTP client
//
// Wraps `reqwest::Client` with the RPC server's URL layout, envelope
// unwrapping and basic-auth handling. Commands go through `/command`;
// events are long-polled through `/registerpoll` + `/poll`. Reconnecting is
// left to the caller.

use std::time::Duration;

use secrecy::ExposeSecret;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, trace};
use url::Url;

use crate::error::Error;
use crate::models::{CommandRequest, PollEvent, PollRegistration, PollRequest, RpcResponse};
use crate::transport::{BasicCredentials, TransportConfig};

/// Default long-poll request lifetime. The server answers idle polls
/// before this elapses.
const DEFAULT_POLL_TIMEOUT: Duration = Duration::from_secs(75);

/// Extra time the HTTP request gets on top of a server-side command
/// timeout, so the device's own timeout reply arrives first.
pub const COMMAND_TIMEOUT_MARGIN: Duration = Duration::from_secs(5);

/// Raw HTTP client for a Cleep device's RPC server.
///
/// Handles the `{ error, message, data }` envelope: all command methods
/// return the unwrapped `data` payload, or [`Error::Rpc`] when the module
/// rejected the command.
pub struct RpcClient {
    http: reqwest::Client,
    base_url: Url,
    credentials: Option<BasicCredentials>,
    poll_timeout: Duration,
}

impl RpcClient {
    /// Create a new client from a `TransportConfig`.
    ///
    /// `base_url` is the RPC server root, e.g. `http://cleep.local`.
    pub fn new(base_url: Url, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self {
            http,
            base_url,
            credentials: transport.credentials.clone(),
            poll_timeout: DEFAULT_POLL_TIMEOUT,
        })
    }

    /// Create a client with a pre-built `reqwest::Client` and no credentials.
    pub fn with_client(http: reqwest::Client, base_url: Url) -> Self {
        Self {
            http,
            base_url,
            credentials: None,
            poll_timeout: DEFAULT_POLL_TIMEOUT,
        }
    }

    /// Override the long-poll request lifetime.
    pub fn with_poll_timeout(mut self, timeout: Duration) -> Self {
        self.poll_timeout = timeout;
        self
    }

    /// The RPC server base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── URL builders ─────────────────────────────────────────────────

    /// Build `{base}/{path}`, tolerating a trailing slash on the base.
    pub(crate) fn endpoint(&self, path: &str) -> Result<Url, Error> {
        let base = self.base_url.as_str().trim_end_matches('/');
        Ok(Url::parse(&format!("{base}/{path}"))?)
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Send `command` to `module` and return the unwrapped `data` payload.
    ///
    /// `timeout` sets the server-side command timeout for this call only.
    /// The HTTP request waits [`COMMAND_TIMEOUT_MARGIN`] longer.
    pub async fn send_command(
        &self,
        command: &str,
        module: &str,
        params: Option<&serde_json::Value>,
        timeout: Option<Duration>,
    ) -> Result<serde_json::Value, Error> {
        let url = self.endpoint("command")?;
        let body = CommandRequest {
            to: module,
            command,
            params,
            timeout: timeout.map(|t| t.as_secs_f64()),
        };
        debug!(command, module, ?timeout, "POST {}", url);

        let http_timeout = timeout.map(|t| t + COMMAND_TIMEOUT_MARGIN);
        let response: RpcResponse = self.post(url, &body, http_timeout).await?;
        if response.error {
            return Err(Error::Rpc {
                command: command.to_owned(),
                module: module.to_owned(),
                message: response
                    .message
                    .unwrap_or_else(|| "no message".to_owned()),
            });
        }
        Ok(response.data)
    }

    // ── Event polling ────────────────────────────────────────────────

    /// Register a poll channel and return its key.
    pub async fn register_poll(&self) -> Result<String, Error> {
        let url = self.endpoint("registerpoll")?;
        debug!("POST {}", url);
        let registration: PollRegistration = self.post(url, &serde_json::json!({}), None).await?;
        Ok(registration.pollkey)
    }

    /// Long-poll once. Returns `None` when the server answered an idle poll.
    pub async fn poll(&self, pollkey: &str) -> Result<Option<PollEvent>, Error> {
        let url = self.endpoint("poll")?;
        trace!("POST {}", url);
        let response: RpcResponse = self
            .post(url, &PollRequest { pollkey }, Some(self.poll_timeout))
            .await?;

        if response.error {
            return Err(Error::PollKeyRejected {
                message: response.message.unwrap_or_default(),
            });
        }
        if response.data.is_null() {
            return Ok(None);
        }

        serde_json::from_value(response.data.clone())
            .map(Some)
            .map_err(|e| Error::Deserialization {
                message: format!("invalid poll event: {e}"),
                body: response.data.to_string(),
            })
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// POST a JSON body and decode the JSON response.
    async fn post<T: DeserializeOwned>(
        &self,
        url: Url,
        body: &(impl Serialize + Sync),
        timeout: Option<Duration>,
    ) -> Result<T, Error> {
        let mut builder = self.http.post(url).json(body);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(creds) = &self.credentials {
            builder = builder.basic_auth(&creds.username, Some(creds.password.expose_secret()));
        }

        let resp = builder.send().await.map_err(|e| map_send_error(e, timeout))?;
        self.parse_response(resp, timeout).await
    }

    async fn parse_response<T: DeserializeOwned>(
        &self,
        resp: reqwest::Response,
        timeout: Option<Duration>,
    ) -> Result<T, Error> {
        let status = resp.status();

        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(Error::Authentication {
                message: "secured access enabled, invalid or missing credentials".into(),
            });
        }

        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Http {
                status: status.as_u16(),
                message: preview(&body),
            });
        }

        let body = resp.text().await.map_err(|e| map_send_error(e, timeout))?;
        serde_json::from_str(&body).map_err(|e| Error::Deserialization {
            message: format!("{e} (body preview: {:?})", preview(&body)),
            body: body.clone(),
        })
    }
}

fn map_send_error(err: reqwest::Error, timeout: Option<Duration>) -> Error {
    if err.is_timeout() {
        Error::Timeout {
            timeout_secs: timeout.map_or(0, |t| t.as_secs()),
        }
    } else {
        Error::Transport(err)
    }
}

fn preview(body: &str) -> String {
    body.chars().take(200).collect()
}
