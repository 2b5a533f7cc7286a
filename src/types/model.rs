// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Supported device models.

use std::fmt;
use std::str::FromStr;

use crate::error::DeviceError;

/// Dyson product types this library can control.
///
/// The product type is the first segment of every MQTT topic the device uses
/// (`475/<serial>/command`). It may be given with or without the leading `N`.
///
/// # Examples
///
/// ```
/// use dyslink::types::DeviceModel;
///
/// assert_eq!("475".parse::<DeviceModel>().unwrap(), DeviceModel::N475);
/// assert_eq!("N455".parse::<DeviceModel>().unwrap(), DeviceModel::N455);
/// assert!("520".parse::<DeviceModel>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeviceModel {
    /// Pure Cool Link tower.
    N475,
    /// Pure Cool Link desk.
    N469,
    /// Pure Hot+Cool Link.
    N455,
}

impl DeviceModel {
    /// All supported models.
    pub const ALL: [Self; 3] = [Self::N475, Self::N469, Self::N455];

    /// Returns the product type code used in MQTT topics.
    #[must_use]
    pub const fn product_type(&self) -> &'static str {
        match self {
            Self::N475 => "475",
            Self::N469 => "469",
            Self::N455 => "455",
        }
    }
}

impl fmt::Display for DeviceModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.product_type())
    }
}

impl FromStr for DeviceModel {
    type Err = DeviceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.strip_prefix('N').unwrap_or(s);
        Self::ALL
            .into_iter()
            .find(|model| model.product_type() == code)
            .ok_or_else(|| DeviceError::UnsupportedModel(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_every_supported_model() {
        for model in DeviceModel::ALL {
            assert_eq!(model.product_type().parse::<DeviceModel>().unwrap(), model);
            assert_eq!(format!("N{model}").parse::<DeviceModel>().unwrap(), model);
        }
    }

    #[test]
    fn rejects_unknown_and_empty() {
        assert!("".parse::<DeviceModel>().is_err());
        assert!("N".parse::<DeviceModel>().is_err());
        assert!("438".parse::<DeviceModel>().is_err());
        assert!("n475".parse::<DeviceModel>().is_err());
    }
}
