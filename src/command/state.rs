// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! State-delta and the `STATE-SET` command.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::command::Command;
use crate::types::{FanMode, FanSpeed, HeatSetting, Toggle};

/// Value the device expects in `rstf` to reset the filter life counter.
const RESET_FILTER: &str = "RSTF";

/// A partial device state.
///
/// Only fields that are set are serialized, so the device leaves every other
/// setting untouched. Each constructor describes one logical change.
///
/// # Examples
///
/// ```
/// use dyslink::command::FanState;
/// use dyslink::types::{FanSpeed, HeatSetting};
///
/// let delta = FanState::fan_speed(FanSpeed::new(4).unwrap());
/// assert_eq!(serde_json::to_string(&delta).unwrap(), r#"{"fnsp":"0004"}"#);
///
/// let off = FanState::heat(HeatSetting::Off);
/// assert_eq!(serde_json::to_string(&off).unwrap(), r#"{"hmod":"OFF"}"#);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FanState {
    #[serde(rename = "fmod", skip_serializing_if = "Option::is_none")]
    fan_mode: Option<String>,

    #[serde(rename = "fnsp", skip_serializing_if = "Option::is_none")]
    fan_speed: Option<String>,

    #[serde(rename = "oson", skip_serializing_if = "Option::is_none")]
    oscillation: Option<String>,

    #[serde(rename = "rhtm", skip_serializing_if = "Option::is_none")]
    standby_monitoring: Option<String>,

    #[serde(rename = "ffoc", skip_serializing_if = "Option::is_none")]
    focused_mode: Option<String>,

    #[serde(rename = "hmod", skip_serializing_if = "Option::is_none")]
    heat_mode: Option<String>,

    #[serde(rename = "hmax", skip_serializing_if = "Option::is_none")]
    heat_target: Option<String>,

    #[serde(rename = "rstf", skip_serializing_if = "Option::is_none")]
    reset_filter: Option<String>,
}

impl FanState {
    /// Changes the fan mode.
    #[must_use]
    pub fn fan_mode(mode: FanMode) -> Self {
        Self {
            fan_mode: Some(mode.as_str().to_string()),
            ..Self::default()
        }
    }

    /// Changes the manual fan speed.
    #[must_use]
    pub fn fan_speed(speed: FanSpeed) -> Self {
        Self {
            fan_speed: Some(speed.wire_value()),
            ..Self::default()
        }
    }

    /// Switches oscillation.
    #[must_use]
    pub fn oscillation(state: Toggle) -> Self {
        Self {
            oscillation: Some(state.as_str().to_string()),
            ..Self::default()
        }
    }

    /// Switches sensor monitoring while the fan is in standby.
    #[must_use]
    pub fn standby_monitoring(state: Toggle) -> Self {
        Self {
            standby_monitoring: Some(state.as_str().to_string()),
            ..Self::default()
        }
    }

    /// Switches focused (jet) airflow.
    #[must_use]
    pub fn focused_mode(state: Toggle) -> Self {
        Self {
            focused_mode: Some(state.as_str().to_string()),
            ..Self::default()
        }
    }

    /// Switches heating off, or on towards a target.
    ///
    /// Switching off sends only the heat mode; the stored target is kept.
    #[must_use]
    pub fn heat(setting: HeatSetting) -> Self {
        match setting {
            HeatSetting::Off => Self {
                heat_mode: Some("OFF".to_string()),
                ..Self::default()
            },
            HeatSetting::Heat(target) => Self {
                heat_mode: Some("HEAT".to_string()),
                heat_target: Some(target.wire_value()),
                ..Self::default()
            },
        }
    }

    /// Resets the filter life counter.
    #[must_use]
    pub fn reset_filter() -> Self {
        Self {
            reset_filter: Some(RESET_FILTER.to_string()),
            ..Self::default()
        }
    }

    /// Returns the set fields as a JSON object.
    #[must_use]
    pub fn to_json(&self) -> Map<String, Value> {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        }
    }
}

/// Command applying a [`FanState`] delta.
///
/// # Examples
///
/// ```
/// use dyslink::command::{Command, FanState, StateSetCommand};
/// use dyslink::types::Toggle;
///
/// let cmd = StateSetCommand::new(FanState::oscillation(Toggle::On));
/// assert_eq!(cmd.message_type(), "STATE-SET");
/// assert_eq!(cmd.fields()["mode-reason"], "LAPP");
/// assert_eq!(cmd.fields()["data"]["oson"], "ON");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateSetCommand {
    state: FanState,
}

impl StateSetCommand {
    /// Wraps a state delta.
    #[must_use]
    pub fn new(state: FanState) -> Self {
        Self { state }
    }
}

impl Command for StateSetCommand {
    fn message_type(&self) -> &'static str {
        "STATE-SET"
    }

    fn fields(&self) -> Map<String, Value> {
        let mut fields = Map::new();
        // Change attributed to a local app.
        fields.insert("mode-reason".to_string(), Value::from("LAPP"));
        fields.insert("data".to_string(), Value::Object(self.state.to_json()));
        fields
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::HeatTarget;

    fn keys(state: &FanState) -> Vec<String> {
        state.to_json().keys().cloned().collect()
    }

    #[test]
    fn each_delta_carries_one_change() {
        assert_eq!(keys(&FanState::fan_mode(FanMode::Auto)), ["fmod"]);
        assert_eq!(keys(&FanState::fan_speed(FanSpeed::new(3).unwrap())), ["fnsp"]);
        assert_eq!(keys(&FanState::oscillation(Toggle::On)), ["oson"]);
        assert_eq!(keys(&FanState::standby_monitoring(Toggle::Off)), ["rhtm"]);
        assert_eq!(keys(&FanState::focused_mode(Toggle::On)), ["ffoc"]);
        assert_eq!(keys(&FanState::reset_filter()), ["rstf"]);
    }

    #[test]
    fn heat_on_sets_mode_and_target() {
        let state = FanState::heat(HeatSetting::Heat(HeatTarget::new(68).unwrap()));
        assert_eq!(
            serde_json::to_string(&state).unwrap(),
            r#"{"hmod":"HEAT","hmax":"2932"}"#
        );
    }

    #[test]
    fn heat_off_leaves_target_unset() {
        let state = FanState::heat(HeatSetting::Off);
        assert_eq!(keys(&state), ["hmod"]);
        assert_eq!(state.to_json()["hmod"], "OFF");
    }

    #[test]
    fn default_state_is_empty() {
        assert!(FanState::default().to_json().is_empty());
        assert_eq!(serde_json::to_string(&FanState::default()).unwrap(), "{}");
    }

    #[test]
    fn reset_filter_value() {
        assert_eq!(
            serde_json::to_string(&FanState::reset_filter()).unwrap(),
            r#"{"rstf":"RSTF"}"#
        );
    }
}
