// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Parser for environment sensor data and device credentials.

use serde::Deserialize;

/// Sensor readings reported in `ENVIRONMENTAL-CURRENT-SENSOR-DATA`.
///
/// Readings are kept as the device sends them: four-digit strings, or `INIT`
/// and `OFF` while a sensor warms up or is disabled.
///
/// # Examples
///
/// ```
/// use dyslink::telemetry::EnvironmentState;
///
/// let json = r#"{"tact":"2955","hact":"0045","pact":"0003","vact":"INIT","sltm":"OFF"}"#;
/// let env: EnvironmentState = serde_json::from_str(json).unwrap();
///
/// assert_eq!(env.temperature.as_deref(), Some("2955"));
/// assert_eq!(env.voc.as_deref(), Some("INIT"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct EnvironmentState {
    /// Temperature in deci-kelvin.
    #[serde(rename = "tact", default)]
    pub temperature: Option<String>,

    /// Relative humidity in percent.
    #[serde(rename = "hact", default)]
    pub humidity: Option<String>,

    /// Particle density index.
    #[serde(rename = "pact", default)]
    pub particle: Option<String>,

    /// Volatile organic compound index.
    #[serde(rename = "vact", default)]
    pub voc: Option<String>,

    /// Minutes left on the sleep timer, or `OFF`.
    #[serde(rename = "sltm", default)]
    pub sleep_timer: Option<String>,
}

impl EnvironmentState {
    /// Returns the VOC index, or 0 when not numeric.
    #[must_use]
    pub fn voc_index(&self) -> u32 {
        numeric(self.voc.as_deref())
    }

    /// Returns the particle index, or 0 when not numeric.
    #[must_use]
    pub fn particle_index(&self) -> u32 {
        numeric(self.particle.as_deref())
    }
}

fn numeric(value: Option<&str>) -> u32 {
    value.and_then(|v| v.parse().ok()).unwrap_or(0)
}

/// Local credentials a device reports after joining a network.
#[derive(Clone, Default, PartialEq, Eq, Deserialize)]
pub struct DeviceCredentials {
    /// Device serial, used as MQTT username and topic segment.
    #[serde(default)]
    pub serial: Option<String>,

    /// Local MQTT password.
    #[serde(default)]
    pub password: Option<String>,

    /// Product type code.
    #[serde(rename = "product-type", default)]
    pub product_type: Option<String>,
}

impl std::fmt::Debug for DeviceCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeviceCredentials")
            .field("serial", &self.serial)
            .field("product_type", &self.product_type)
            .finish_non_exhaustive()
    }
}
