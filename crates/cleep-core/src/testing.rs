#![allow(clippy::unwrap_used)]
// In-memory parameters module used by the unit tests.
//
// Commands mutate a JSON config the way the device does, and every call is
// recorded so tests can assert on the exact command sequence.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use serde_json::{Value, json};
use tokio::sync::oneshot;

use crate::command::CommandSender;
use crate::error::CoreError;

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Call {
    pub command: String,
    pub module: String,
    pub params: Option<Value>,
    pub timeout: Option<Duration>,
}

pub(crate) struct FakeDevice {
    config: Mutex<Value>,
    devices: Mutex<Value>,
    calls: Mutex<Vec<Call>>,
    rejections: Mutex<HashMap<String, String>>,
    held_fetch: Mutex<Option<oneshot::Receiver<()>>>,
    held_commands: Mutex<HashMap<String, oneshot::Receiver<()>>>,
}

pub(crate) fn sample_config() -> Value {
    json!({
        "hostname": "cleep",
        "position": { "latitude": 48.85, "longitude": 2.35 },
        "sun": { "sunrise": 1_700_000_000, "sunset": 1_700_040_000 },
        "country": { "country": "France", "alpha2": "FR" },
        "timezone": "Europe/Paris",
        "authenabled": false,
        "authaccounts": ["admin"],
    })
}

impl FakeDevice {
    pub fn new() -> Self {
        Self::with_config(sample_config())
    }

    pub fn with_config(config: Value) -> Self {
        Self {
            config: Mutex::new(config),
            devices: Mutex::new(json!({})),
            calls: Mutex::new(Vec::new()),
            rejections: Mutex::new(HashMap::new()),
            held_fetch: Mutex::new(None),
            held_commands: Mutex::new(HashMap::new()),
        }
    }

    /// Make `command` fail with `message` from now on.
    pub fn reject(&self, command: &str, message: &str) {
        self.rejections
            .lock()
            .unwrap()
            .insert(command.to_owned(), message.to_owned());
    }

    /// Replace what `get_module_config` returns.
    pub fn set_config(&self, config: Value) {
        *self.config.lock().unwrap() = config;
    }

    pub fn set_devices(&self, devices: Value) {
        *self.devices.lock().unwrap() = devices;
    }

    /// Park the next `get_module_config` until the returned sender fires.
    /// The parked fetch answers with the config as it was when it arrived.
    pub fn hold_next_fetch(&self) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        *self.held_fetch.lock().unwrap() = Some(rx);
        tx
    }

    /// Park the next `command` before the device applies it, until the
    /// returned sender fires.
    pub fn hold_next(&self, command: &str) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.held_commands
            .lock()
            .unwrap()
            .insert(command.to_owned(), rx);
        tx
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn commands(&self) -> Vec<String> {
        self.calls().into_iter().map(|c| c.command).collect()
    }

    fn handle(&self, command: &str, params: Option<&Value>) -> Result<Value, CoreError> {
        if let Some(message) = self.rejections.lock().unwrap().get(command) {
            return Err(CoreError::Rejected {
                command: command.to_owned(),
                message: message.clone(),
            });
        }

        let mut config = self.config.lock().unwrap();
        let param = |key: &str| params.and_then(|p| p.get(key)).cloned().unwrap_or(Value::Null);
        match command {
            "get_module_config" => return Ok(config.clone()),
            "get_module_devices" => return Ok(self.devices.lock().unwrap().clone()),
            "get_sun" => return Ok(config["sun"].clone()),
            "set_hostname" => config["hostname"] = param("hostname"),
            "set_position" => {
                config["position"] = json!({
                    "latitude": param("latitude"),
                    "longitude": param("longitude"),
                });
            }
            "enable_auth" => config["authenabled"] = json!(true),
            "disable_auth" => config["authenabled"] = json!(false),
            "add_auth_account" => {
                let account = param("account");
                config["authaccounts"].as_array_mut().unwrap().push(account);
            }
            "delete_auth_account" => {
                let account = param("account");
                config["authaccounts"]
                    .as_array_mut()
                    .unwrap()
                    .retain(|a| *a != account);
            }
            other => {
                return Err(CoreError::Rejected {
                    command: other.to_owned(),
                    message: "unknown command".into(),
                });
            }
        }
        Ok(json!(true))
    }
}

impl CommandSender for FakeDevice {
    async fn send(
        &self,
        command: &str,
        module: &str,
        params: Option<Value>,
        timeout: Option<Duration>,
    ) -> Result<Value, CoreError> {
        self.calls.lock().unwrap().push(Call {
            command: command.to_owned(),
            module: module.to_owned(),
            params: params.clone(),
            timeout,
        });

        let gate = self.held_commands.lock().unwrap().remove(command);
        if let Some(gate) = gate {
            let _ = gate.await;
        }

        let result = self.handle(command, params.as_ref());

        if command == "get_module_config" {
            let held = self.held_fetch.lock().unwrap().take();
            if let Some(gate) = held {
                let _ = gate.await;
            }
        }
        result
    }
}
