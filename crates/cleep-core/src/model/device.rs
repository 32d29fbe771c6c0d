// ── Device domain types ──

use serde::{Deserialize, Serialize};

use super::required_nullable;

/// A device known to the dashboard, e.g. the parameters module's clock.
///
/// The time fields are only filled for clock devices, by
/// `get_module_devices` and then by every `parameters.time.now` event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Device {
    pub uuid: String,
    #[serde(default)]
    pub module: Option<String>,
    #[serde(rename = "type", default)]
    pub device_type: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub hour: Option<u32>,
    #[serde(default)]
    pub minute: Option<u32>,
    #[serde(default)]
    pub timestamp: Option<f64>,
    #[serde(default)]
    pub sunrise: Option<i64>,
    #[serde(default)]
    pub sunset: Option<i64>,
}

impl Device {
    pub fn is_clock(&self) -> bool {
        self.device_type == "clock"
    }

    /// Copy the displayed time fields from a time-now payload.
    pub fn apply_time(&mut self, now: &TimeNow) {
        self.hour = Some(now.hour);
        self.minute = Some(now.minute);
        self.timestamp = Some(now.timestamp);
        self.sunrise = now.sunrise;
        self.sunset = now.sunset;
    }
}

/// Params of the `parameters.time.now` event.
///
/// `hour`, `minute`, `timestamp`, `sunrise` and `sunset` are what the
/// dashboard displays: their keys are required (sun times may be null
/// before the device knows its position). The calendar fields are
/// informational.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeNow {
    pub timestamp: f64,
    pub hour: u32,
    pub minute: u32,
    #[serde(deserialize_with = "required_nullable")]
    pub sunrise: Option<i64>,
    #[serde(deserialize_with = "required_nullable")]
    pub sunset: Option<i64>,
    #[serde(default)]
    pub iso: Option<String>,
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub month: Option<u32>,
    #[serde(default)]
    pub day: Option<u32>,
    /// 0 = monday.
    #[serde(default)]
    pub weekday: Option<u32>,
    #[serde(default)]
    pub weekday_literal: Option<String>,
}
