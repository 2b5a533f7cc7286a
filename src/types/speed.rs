// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Fan speed type.

use std::fmt;
use std::str::FromStr;

use crate::error::ValueError;

/// Manual fan speed (1-10).
///
/// The device expects the speed as a four-digit, zero-padded string
/// (`"0005"`), which is what [`FanSpeed::wire_value`] produces.
///
/// # Examples
///
/// ```
/// use dyslink::types::FanSpeed;
///
/// let speed: FanSpeed = "5".parse().unwrap();
/// assert_eq!(speed.value(), 5);
/// assert_eq!(speed.wire_value(), "0005");
///
/// assert!("11".parse::<FanSpeed>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FanSpeed(u8);

impl FanSpeed {
    /// Minimum speed value.
    pub const MIN: u8 = 1;

    /// Maximum speed value.
    pub const MAX: u8 = 10;

    /// Creates a new fan speed value.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::OutOfRange` if value is outside [1, 10].
    pub fn new(value: u8) -> Result<Self, ValueError> {
        if !(Self::MIN..=Self::MAX).contains(&value) {
            return Err(ValueError::OutOfRange {
                what: "fan speed",
                min: u16::from(Self::MIN),
                max: u16::from(Self::MAX),
                actual: i64::from(value),
            });
        }
        Ok(Self(value))
    }

    /// Returns the speed value.
    #[must_use]
    pub const fn value(&self) -> u8 {
        self.0
    }

    /// Returns the representation sent to the device.
    #[must_use]
    pub fn wire_value(&self) -> String {
        format!("{:04}", self.0)
    }
}

impl fmt::Display for FanSpeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<u8> for FanSpeed {
    type Error = ValueError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl FromStr for FanSpeed {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value: i64 = s.parse().map_err(|_| ValueError::NotANumber {
            what: "fan speed",
            value: s.to_string(),
        })?;
        let out_of_range = || ValueError::OutOfRange {
            what: "fan speed",
            min: u16::from(Self::MIN),
            max: u16::from(Self::MAX),
            actual: value,
        };
        let small = u8::try_from(value).map_err(|_| out_of_range())?;
        Self::new(small)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fan_speed_valid() {
        for v in 1..=10 {
            let speed = FanSpeed::new(v).unwrap();
            assert_eq!(speed.value(), v);
        }
    }

    #[test]
    fn fan_speed_invalid() {
        assert!(FanSpeed::new(0).is_err());
        assert!(FanSpeed::new(11).is_err());
    }

    #[test]
    fn fan_speed_parse_rejects_out_of_range() {
        for input in ["0", "11", "-1", "300", "99999999999"] {
            let err = input.parse::<FanSpeed>().unwrap_err();
            assert!(
                matches!(err, ValueError::OutOfRange { .. }),
                "{input} gave {err:?}"
            );
        }
    }

    #[test]
    fn fan_speed_parse_rejects_text() {
        let err = "fast".parse::<FanSpeed>().unwrap_err();
        assert_eq!(
            err,
            ValueError::NotANumber {
                what: "fan speed",
                value: "fast".to_string()
            }
        );
    }

    #[test]
    fn fan_speed_wire_value_is_padded() {
        assert_eq!(FanSpeed::new(1).unwrap().wire_value(), "0001");
        assert_eq!(FanSpeed::new(10).unwrap().wire_value(), "0010");
    }
}
