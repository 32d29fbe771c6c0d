// ── Module configuration payload ──

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::required_nullable;
use crate::error::CoreError;

/// Geographic position of the device.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub latitude: f64,
    pub longitude: f64,
}

impl Position {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Both coordinates set. Zero and NaN count as "not selected".
    pub fn is_selected(&self) -> bool {
        is_set(self.latitude) && is_set(self.longitude)
    }
}

fn is_set(coordinate: f64) -> bool {
    coordinate != 0.0 && !coordinate.is_nan()
}

/// Sunrise and sunset as Unix timestamps (seconds). Zero until the device
/// knows its position.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SunTimes {
    pub sunrise: i64,
    pub sunset: i64,
}

impl SunTimes {
    pub fn sunrise_at(&self) -> Option<DateTime<Utc>> {
        timestamp(self.sunrise)
    }

    pub fn sunset_at(&self) -> Option<DateTime<Utc>> {
        timestamp(self.sunset)
    }
}

fn timestamp(secs: i64) -> Option<DateTime<Utc>> {
    if secs == 0 {
        return None;
    }
    DateTime::from_timestamp(secs, 0)
}

/// Configured country.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Country {
    #[serde(default, rename = "country")]
    pub name: Option<String>,
    /// ISO 3166 alpha-2 code.
    #[serde(default, rename = "alpha2")]
    pub code: Option<String>,
}

/// Canonical configuration of a module, as returned by `get_module_config`.
///
/// Every top-level key is required: a payload missing one fails to decode
/// as a whole, so a partial config can never reach the view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModuleConfig {
    pub hostname: String,
    pub position: Position,
    pub sun: SunTimes,
    pub country: Country,
    #[serde(deserialize_with = "required_nullable")]
    pub timezone: Option<String>,
    #[serde(rename = "authenabled")]
    pub auth_enabled: bool,
    #[serde(rename = "authaccounts")]
    pub auth_accounts: Vec<String>,
}

impl ModuleConfig {
    /// Decode the `data` payload of `get_module_config`.
    pub fn from_value(module: &str, value: serde_json::Value) -> Result<Self, CoreError> {
        serde_json::from_value(value).map_err(|e| CoreError::InvalidConfig {
            module: module.to_owned(),
            message: e.to_string(),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    fn payload() -> serde_json::Value {
        json!({
            "hostname": "kitchen",
            "position": { "latitude": 48.85, "longitude": 2.35 },
            "sun": { "sunrise": 1_700_000_000, "sunset": 1_700_040_000, "sunrise_iso": "" },
            "country": { "country": "France", "alpha2": "FR" },
            "timezone": "Europe/Paris",
            "authenabled": true,
            "authaccounts": ["admin", "guest"],
        })
    }

    #[test]
    fn decodes_wire_names() {
        let config = ModuleConfig::from_value("parameters", payload()).unwrap();
        assert_eq!(config.hostname, "kitchen");
        assert_eq!(config.position, Position::new(48.85, 2.35));
        assert_eq!(config.country.name.as_deref(), Some("France"));
        assert_eq!(config.country.code.as_deref(), Some("FR"));
        assert_eq!(config.timezone.as_deref(), Some("Europe/Paris"));
        assert!(config.auth_enabled);
        assert_eq!(config.auth_accounts, vec!["admin", "guest"]);
    }

    #[test]
    fn null_timezone_and_country_are_accepted() {
        let mut value = payload();
        value["timezone"] = serde_json::Value::Null;
        value["country"] = json!({ "country": null, "alpha2": null });
        let config = ModuleConfig::from_value("parameters", value).unwrap();
        assert_eq!(config.timezone, None);
        assert_eq!(config.country, Country::default());
    }

    #[test]
    fn missing_timezone_key_is_rejected() {
        let mut value = payload();
        value.as_object_mut().unwrap().remove("timezone");
        let err = ModuleConfig::from_value("parameters", value).unwrap_err();
        assert!(matches!(err, CoreError::InvalidConfig { ref module, .. } if module == "parameters"));
    }

    #[test]
    fn ill_typed_field_is_rejected() {
        let mut value = payload();
        value["authaccounts"] = json!("admin");
        assert!(ModuleConfig::from_value("parameters", value).is_err());
    }

    #[test]
    fn zero_or_nan_coordinates_are_not_selected() {
        assert!(!Position::new(0.0, 5.0).is_selected());
        assert!(!Position::new(5.0, 0.0).is_selected());
        assert!(!Position::new(f64::NAN, 5.0).is_selected());
        assert!(Position::new(-33.9, 18.4).is_selected());
    }

    #[test]
    fn unknown_sun_times_have_no_datetime() {
        assert_eq!(SunTimes::default().sunrise_at(), None);
        let sun = SunTimes {
            sunrise: 1_700_000_000,
            sunset: 1_700_040_000,
        };
        assert_eq!(sun.sunset_at().unwrap().timestamp(), 1_700_040_000);
    }
}
