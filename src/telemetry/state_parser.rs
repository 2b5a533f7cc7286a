// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Parser for `product-state` objects.

use serde::{Deserialize, Deserializer};

/// Product configuration reported by the device.
///
/// Built from the `product-state` object of `CURRENT-STATE` and
/// `STATE-CHANGE` messages. A `CURRENT-STATE` carries plain values, a
/// `STATE-CHANGE` carries `[previous, current]` pairs; both decode to the
/// current value. Fields the device did not report are `None`.
///
/// # Examples
///
/// ```
/// use dyslink::telemetry::ProductState;
///
/// let json = r#"{"fmod":"AUTO","fnsp":["0004","0006"],"filf":"2150"}"#;
/// let state: ProductState = serde_json::from_str(json).unwrap();
///
/// assert_eq!(state.fan_mode.as_deref(), Some("AUTO"));
/// assert_eq!(state.fan_speed.as_deref(), Some("0006"));
/// assert_eq!(state.filter_life.as_deref(), Some("2150"));
/// assert_eq!(state.oscillation, None);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ProductState {
    /// Fan mode (`FAN`, `OFF`, `AUTO`).
    #[serde(rename = "fmod", default, deserialize_with = "reported")]
    pub fan_mode: Option<String>,

    /// Whether the fan is currently spinning (`FAN`, `OFF`).
    #[serde(rename = "fnst", default, deserialize_with = "reported")]
    pub fan_state: Option<String>,

    /// Fan speed (`0001`-`0010`, or `AUTO`).
    #[serde(rename = "fnsp", default, deserialize_with = "reported")]
    pub fan_speed: Option<String>,

    /// Air quality target code.
    #[serde(rename = "qtar", default, deserialize_with = "reported")]
    pub quality_target: Option<String>,

    /// Oscillation (`ON`, `OFF`).
    #[serde(rename = "oson", default, deserialize_with = "reported")]
    pub oscillation: Option<String>,

    /// Sensor monitoring in standby (`ON`, `OFF`).
    #[serde(rename = "rhtm", default, deserialize_with = "reported")]
    pub standby_monitoring: Option<String>,

    /// Remaining filter life in hours.
    #[serde(rename = "filf", default, deserialize_with = "reported")]
    pub filter_life: Option<String>,

    /// Error code (`NONE` when healthy).
    #[serde(rename = "ercd", default, deserialize_with = "reported")]
    pub error_code: Option<String>,

    /// Warning code (`NONE` when healthy).
    #[serde(rename = "wacd", default, deserialize_with = "reported")]
    pub warning_code: Option<String>,

    /// Night mode (`ON`, `OFF`).
    #[serde(rename = "nmod", default, deserialize_with = "reported")]
    pub night_mode: Option<String>,

    /// Heat mode (`HEAT`, `OFF`).
    #[serde(rename = "hmod", default, deserialize_with = "reported")]
    pub heat_mode: Option<String>,

    /// Heat target in deci-kelvin.
    #[serde(rename = "hmax", default, deserialize_with = "reported")]
    pub heat_target: Option<String>,

    /// Whether the heater is running (`HEAT`, `OFF`).
    #[serde(rename = "hsta", default, deserialize_with = "reported")]
    pub heat_state: Option<String>,

    /// Focused airflow (`ON`, `OFF`).
    #[serde(rename = "ffoc", default, deserialize_with = "reported")]
    pub focused_mode: Option<String>,

    /// Tilt sensor (`OK`, `TILT`).
    #[serde(rename = "tilt", default, deserialize_with = "reported")]
    pub tilt: Option<String>,
}

/// A value as reported in `product-state`: current, or a change pair.
#[derive(Deserialize)]
#[serde(untagged)]
enum Reported {
    Value(String),
    Change(Vec<String>),
}

/// Decodes a reported value, keeping the current side of a change pair.
fn reported<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Reported>::deserialize(deserializer)?;
    Ok(value.and_then(|reported| match reported {
        Reported::Value(value) => Some(value),
        Reported::Change(mut pair) => pair.pop(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_current_state_values() {
        let json = r#"{
            "fmod":"FAN","fnst":"FAN","fnsp":"0005","qtar":"0003","oson":"ON",
            "rhtm":"ON","filf":"4300","ercd":"NONE","nmod":"OFF","wacd":"NONE",
            "hmod":"HEAT","hmax":"2960","hsta":"OFF","ffoc":"ON","tilt":"OK"
        }"#;
        let state: ProductState = serde_json::from_str(json).unwrap();

        assert_eq!(state.fan_mode.as_deref(), Some("FAN"));
        assert_eq!(state.fan_speed.as_deref(), Some("0005"));
        assert_eq!(state.quality_target.as_deref(), Some("0003"));
        assert_eq!(state.heat_target.as_deref(), Some("2960"));
        assert_eq!(state.focused_mode.as_deref(), Some("ON"));
        assert_eq!(state.tilt.as_deref(), Some("OK"));
    }

    #[test]
    fn parse_change_pairs_keeps_current_value() {
        let json = r#"{"oson":["OFF","ON"],"fmod":["FAN","FAN"]}"#;
        let state: ProductState = serde_json::from_str(json).unwrap();

        assert_eq!(state.oscillation.as_deref(), Some("ON"));
        assert_eq!(state.fan_mode.as_deref(), Some("FAN"));
    }

    #[test]
    fn empty_object_is_default() {
        let state: ProductState = serde_json::from_str("{}").unwrap();
        assert_eq!(state, ProductState::default());
    }

    #[test]
    fn empty_change_pair_is_unreported() {
        let state: ProductState = serde_json::from_str(r#"{"oson":[]}"#).unwrap();
        assert_eq!(state.oscillation, None);
    }

    #[test]
    fn unknown_fields_are_ignored() {
        let state: ProductState =
            serde_json::from_str(r#"{"fmod":"OFF","sltm":"OFF","cflr":"0100"}"#).unwrap();
        assert_eq!(state.fan_mode.as_deref(), Some("OFF"));
    }
}
