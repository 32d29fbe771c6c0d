// ── Module events ──

use serde::Deserialize;
use serde::de::DeserializeOwned;

use super::device::TimeNow;
use super::module_config::Country;
use crate::error::CoreError;

/// An event received from the device's poll channel.
#[derive(Debug, Clone, PartialEq)]
pub struct ModuleEvent {
    /// Dotted event name, e.g. `parameters.time.now`.
    pub name: String,
    pub device_id: Option<String>,
    pub params: serde_json::Value,
}

impl From<cleep_api::PollEvent> for ModuleEvent {
    fn from(event: cleep_api::PollEvent) -> Self {
        Self {
            name: event.event,
            device_id: event.device_id,
            params: event.params,
        }
    }
}

/// Typed events of the parameters module.
#[derive(Debug, Clone, PartialEq)]
pub enum ParametersEvent {
    /// Emitted every minute for the clock device.
    TimeNow {
        device_id: Option<String>,
        now: TimeNow,
    },
    Sunrise { device_id: Option<String> },
    Sunset { device_id: Option<String> },
    HostnameUpdated { hostname: String },
    CountryUpdated(Country),
}

#[derive(Deserialize)]
struct HostnameParams {
    hostname: String,
}

impl ParametersEvent {
    pub const TIME_NOW: &'static str = "parameters.time.now";
    pub const TIME_SUNRISE: &'static str = "parameters.time.sunrise";
    pub const TIME_SUNSET: &'static str = "parameters.time.sunset";
    pub const HOSTNAME_UPDATE: &'static str = "parameters.hostname.update";
    pub const COUNTRY_UPDATE: &'static str = "parameters.country.update";

    /// Decode a raw event. `Ok(None)` for events of other modules; an error
    /// when a known event carries malformed params.
    pub fn decode(event: &ModuleEvent) -> Result<Option<Self>, CoreError> {
        let decoded = match event.name.as_str() {
            Self::TIME_NOW => Self::TimeNow {
                device_id: event.device_id.clone(),
                now: params(event)?,
            },
            Self::TIME_SUNRISE => Self::Sunrise {
                device_id: event.device_id.clone(),
            },
            Self::TIME_SUNSET => Self::Sunset {
                device_id: event.device_id.clone(),
            },
            Self::HOSTNAME_UPDATE => {
                let HostnameParams { hostname } = params(event)?;
                Self::HostnameUpdated { hostname }
            }
            Self::COUNTRY_UPDATE => Self::CountryUpdated(params(event)?),
            _ => return Ok(None),
        };
        Ok(Some(decoded))
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::TimeNow { .. } => Self::TIME_NOW,
            Self::Sunrise { .. } => Self::TIME_SUNRISE,
            Self::Sunset { .. } => Self::TIME_SUNSET,
            Self::HostnameUpdated { .. } => Self::HOSTNAME_UPDATE,
            Self::CountryUpdated(_) => Self::COUNTRY_UPDATE,
        }
    }
}

fn params<T: DeserializeOwned>(event: &ModuleEvent) -> Result<T, CoreError> {
    T::deserialize(&event.params).map_err(|e| CoreError::InvalidEvent {
        event: event.name.clone(),
        message: e.to_string(),
    })
}
