// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Fan mode and on/off switch types.
//!
//! Values are matched exactly as the device spells them; `on` is not `ON`.

use std::fmt;
use std::str::FromStr;

use crate::error::ValueError;

/// Operating mode of the fan.
///
/// # Examples
///
/// ```
/// use dyslink::types::FanMode;
///
/// assert_eq!("AUTO".parse::<FanMode>().unwrap(), FanMode::Auto);
/// assert_eq!(FanMode::Fan.as_str(), "FAN");
/// assert!("auto".parse::<FanMode>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FanMode {
    /// Fan running at the manual speed.
    Fan,
    /// Fan off.
    Off,
    /// Speed chosen by the device from air quality.
    Auto,
}

impl FanMode {
    /// Accepted spellings, for error messages.
    pub const CHOICES: &'static str = "FAN, OFF, AUTO";

    /// Returns the device representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Fan => "FAN",
            Self::Off => "OFF",
            Self::Auto => "AUTO",
        }
    }
}

impl fmt::Display for FanMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FanMode {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "FAN" => Ok(Self::Fan),
            "OFF" => Ok(Self::Off),
            "AUTO" => Ok(Self::Auto),
            _ => Err(ValueError::InvalidChoice {
                what: "fan mode",
                value: s.to_string(),
                expected: Self::CHOICES,
            }),
        }
    }
}

/// An ON/OFF device switch (oscillation, standby monitoring, focused mode).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Toggle {
    /// Switched on.
    On,
    /// Switched off.
    Off,
}

impl Toggle {
    /// Accepted spellings, for error messages.
    pub const CHOICES: &'static str = "ON, OFF";

    /// Parses a switch value, naming the setting in the error.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::InvalidChoice` unless `s` is exactly `ON` or `OFF`.
    ///
    /// # Examples
    ///
    /// ```
    /// use dyslink::types::Toggle;
    ///
    /// assert_eq!(Toggle::parse("ON", "oscillation state").unwrap(), Toggle::On);
    ///
    /// let err = Toggle::parse("yes", "oscillation state").unwrap_err();
    /// assert!(err.to_string().contains("oscillation state"));
    /// ```
    pub fn parse(s: &str, what: &'static str) -> Result<Self, ValueError> {
        match s {
            "ON" => Ok(Self::On),
            "OFF" => Ok(Self::Off),
            _ => Err(ValueError::InvalidChoice {
                what,
                value: s.to_string(),
                expected: Self::CHOICES,
            }),
        }
    }

    /// Returns the device representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::On => "ON",
            Self::Off => "OFF",
        }
    }
}

impl fmt::Display for Toggle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Toggle {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s, "switch state")
    }
}

impl From<bool> for Toggle {
    fn from(value: bool) -> Self {
        if value { Self::On } else { Self::Off }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fan_mode_round_trips_device_spelling() {
        for mode in [FanMode::Fan, FanMode::Off, FanMode::Auto] {
            assert_eq!(mode.as_str().parse::<FanMode>().unwrap(), mode);
        }
    }

    #[test]
    fn fan_mode_is_case_sensitive() {
        for input in ["fan", "Auto", "on", "", " FAN"] {
            let err = input.parse::<FanMode>().unwrap_err();
            assert!(matches!(
                err,
                ValueError::InvalidChoice {
                    what: "fan mode",
                    ..
                }
            ));
        }
    }

    #[test]
    fn toggle_error_names_setting() {
        let err = Toggle::parse("1", "focused mode").unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid focused mode \"1\": expected one of ON, OFF"
        );
    }

    #[test]
    fn toggle_from_bool() {
        assert_eq!(Toggle::from(true), Toggle::On);
        assert_eq!(Toggle::from(false), Toggle::Off);
    }
}
