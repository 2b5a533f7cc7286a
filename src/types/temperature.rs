// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Temperature conversions and the heating target.
//!
//! The device reports and accepts temperatures in deci-kelvin: kelvin times
//! ten, as an integer (`2932` is 293.2 K, about 68 °F). User-facing values are
//! whole degrees Fahrenheit.

use std::fmt;
use std::str::FromStr;

use crate::error::ValueError;

/// Converts whole degrees Fahrenheit to device deci-kelvin, rounding to the
/// nearest unit.
///
/// # Examples
///
/// ```
/// use dyslink::types::fahrenheit_to_deci_kelvin;
///
/// assert_eq!(fahrenheit_to_deci_kelvin(68), 2932);
/// assert_eq!(fahrenheit_to_deci_kelvin(32), 2732);
/// ```
#[must_use]
pub fn fahrenheit_to_deci_kelvin(fahrenheit: i32) -> i64 {
    // 2731.5 dK is 0 °C; one °F is 50/9 dK.
    #[allow(clippy::cast_possible_truncation)]
    let dk = ((f64::from(fahrenheit) - 32.0) * 50.0 / 9.0 + 2731.5).round() as i64;
    dk
}

/// Converts device deci-kelvin to whole degrees Fahrenheit, rounding to the
/// nearest degree.
///
/// # Examples
///
/// ```
/// use dyslink::types::deci_kelvin_to_fahrenheit;
///
/// assert_eq!(deci_kelvin_to_fahrenheit(2932), 68);
/// assert_eq!(deci_kelvin_to_fahrenheit(2955), 72);
/// ```
#[must_use]
pub fn deci_kelvin_to_fahrenheit(deci_kelvin: i64) -> i64 {
    #[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
    let f = ((deci_kelvin as f64 - 2731.5) * 9.0 / 50.0 + 32.0).round() as i64;
    f
}

/// Heating target in whole degrees Fahrenheit (33-99).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HeatTarget(u8);

impl HeatTarget {
    /// Lowest accepted target.
    pub const MIN: u8 = 33;

    /// Highest accepted target.
    pub const MAX: u8 = 99;

    /// Creates a heating target.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::OutOfRange` if value is outside [33, 99].
    pub fn new(fahrenheit: u8) -> Result<Self, ValueError> {
        if !(Self::MIN..=Self::MAX).contains(&fahrenheit) {
            return Err(ValueError::OutOfRange {
                what: "fan temp",
                min: u16::from(Self::MIN),
                max: u16::from(Self::MAX),
                actual: i64::from(fahrenheit),
            });
        }
        Ok(Self(fahrenheit))
    }

    /// Returns the target in degrees Fahrenheit.
    #[must_use]
    pub const fn fahrenheit(&self) -> u8 {
        self.0
    }

    /// Returns the target in device deci-kelvin.
    #[must_use]
    pub fn deci_kelvin(&self) -> i64 {
        fahrenheit_to_deci_kelvin(i32::from(self.0))
    }

    /// Returns the representation sent to the device.
    #[must_use]
    pub fn wire_value(&self) -> String {
        format!("{:04}", self.deci_kelvin())
    }
}

impl fmt::Display for HeatTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}°F", self.0)
    }
}

/// A requested heating change: switch heating off, or heat to a target.
///
/// Parsed from the user's temperature argument, where `0` means "heat off".
///
/// # Examples
///
/// ```
/// use dyslink::types::HeatSetting;
///
/// assert_eq!("0".parse::<HeatSetting>().unwrap(), HeatSetting::Off);
/// assert!(matches!("68".parse::<HeatSetting>().unwrap(), HeatSetting::Heat(_)));
/// assert!("20".parse::<HeatSetting>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HeatSetting {
    /// Heating off; the stored target is left alone.
    Off,
    /// Heat towards the given target.
    Heat(HeatTarget),
}

impl FromStr for HeatSetting {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value: i64 = s.parse().map_err(|_| ValueError::NotANumber {
            what: "fan temp",
            value: s.to_string(),
        })?;
        if value == 0 {
            return Ok(Self::Off);
        }
        let out_of_range = || ValueError::OutOfRange {
            what: "fan temp",
            min: u16::from(HeatTarget::MIN),
            max: u16::from(HeatTarget::MAX),
            actual: value,
        };
        let small = u8::try_from(value).map_err(|_| out_of_range())?;
        HeatTarget::new(small).map(Self::Heat)
    }
}
