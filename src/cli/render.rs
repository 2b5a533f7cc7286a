// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Text rendering of device messages and discovery results.
//!
//! Each message type has a fixed field table: a label, the reported value,
//! and the rule used to display it. Fields the device did not report, or
//! reported empty, are left out.

use std::fmt;

use crate::discovery::ServiceRecord;
use crate::telemetry::{DeviceCredentials, DeviceMessage, EnvironmentState, ProductState};
use crate::types::deci_kelvin_to_fahrenheit;

/// Filter life the device reports for a new filter, in hours.
const FILTER_LIFE_HOURS: f64 = 4300.0;

const RULE: &str = "--------------";

/// How a reported value is displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// As reported.
    Plain,
    /// Deci-kelvin shown as °F.
    Temperature,
    /// Number shown as a percentage.
    Percent,
    /// Remaining hours shown as a percentage of a new filter.
    FilterLife,
    /// Air quality target code shown by name.
    QualityTarget,
}

struct Field<'a> {
    label: &'static str,
    value: Option<&'a str>,
    format: Format,
}

const fn field<'a>(label: &'static str, value: Option<&'a str>, format: Format) -> Field<'a> {
    Field {
        label,
        value,
        format,
    }
}

fn product_fields(state: &ProductState) -> [Field<'_>; 15] {
    [
        field("FanMode", state.fan_mode.as_deref(), Format::Plain),
        field("FanState", state.fan_state.as_deref(), Format::Plain),
        field("FanSpeed", state.fan_speed.as_deref(), Format::Plain),
        field(
            "QualityTarget",
            state.quality_target.as_deref(),
            Format::QualityTarget,
        ),
        field("Oscillation", state.oscillation.as_deref(), Format::Plain),
        field(
            "StandbyMonitoring",
            state.standby_monitoring.as_deref(),
            Format::Plain,
        ),
        field("FilterLife", state.filter_life.as_deref(), Format::FilterLife),
        field("ErrorCode", state.error_code.as_deref(), Format::Plain),
        field("WarningCode", state.warning_code.as_deref(), Format::Plain),
        field("NightMode", state.night_mode.as_deref(), Format::Plain),
        field("HeatMode", state.heat_mode.as_deref(), Format::Plain),
        field("HeatTarget", state.heat_target.as_deref(), Format::Temperature),
        field("HeatState", state.heat_state.as_deref(), Format::Plain),
        field("FocusedMode", state.focused_mode.as_deref(), Format::Plain),
        field("Tilt", state.tilt.as_deref(), Format::Plain),
    ]
}

fn environment_fields(state: &EnvironmentState) -> [Field<'_>; 5] {
    [
        field("Temperature", state.temperature.as_deref(), Format::Temperature),
        field("Humidity", state.humidity.as_deref(), Format::Percent),
        field("Particle", state.particle.as_deref(), Format::Plain),
        field("VOC", state.voc.as_deref(), Format::Plain),
        field("SleepTimer", state.sleep_timer.as_deref(), Format::Plain),
    ]
}

fn credential_fields(credentials: &DeviceCredentials) -> [Field<'_>; 3] {
    [
        field("Serial", credentials.serial.as_deref(), Format::Plain),
        field("Password", credentials.password.as_deref(), Format::Plain),
        field(
            "ProductType",
            credentials.product_type.as_deref(),
            Format::Plain,
        ),
    ]
}

/// Formats one reported value.
///
/// Values a numeric rule cannot parse are shown as reported.
///
/// # Examples
///
/// ```
/// use dyslink::cli::render::{Format, format_value};
///
/// assert_eq!(format_value(Format::Temperature, "2932"), "68°F");
/// assert_eq!(format_value(Format::Percent, "0045"), "45%");
/// assert_eq!(format_value(Format::FilterLife, "2150"), "50%");
/// assert_eq!(format_value(Format::QualityTarget, "0003"), "Normal");
/// assert_eq!(format_value(Format::Percent, "INIT"), "INIT");
/// ```
#[must_use]
pub fn format_value(format: Format, raw: &str) -> String {
    let number = || raw.parse::<i64>().ok();
    match format {
        Format::Plain => raw.to_string(),
        Format::Temperature => number().map_or_else(
            || raw.to_string(),
            |dk| format!("{}°F", deci_kelvin_to_fahrenheit(dk)),
        ),
        Format::Percent => number().map_or_else(|| raw.to_string(), |v| format!("{v}%")),
        Format::FilterLife => number().map_or_else(
            || raw.to_string(),
            |hours| {
                #[allow(clippy::cast_precision_loss)]
                let percent = (hours as f64 / FILTER_LIFE_HOURS * 100.0).round();
                format!("{percent}%")
            },
        ),
        Format::QualityTarget => match raw {
            "0001" => "High".to_string(),
            "0003" => "Normal".to_string(),
            "0004" => "Low".to_string(),
            other => other.to_string(),
        },
    }
}

fn write_section(f: &mut fmt::Formatter<'_>, header: &str, fields: &[Field<'_>]) -> fmt::Result {
    writeln!(f, "{header}")?;
    writeln!(f, "{RULE}")?;
    for field in fields {
        match field.value {
            Some(value) if !value.is_empty() => {
                writeln!(f, "{}: {}", field.label, format_value(field.format, value))?;
            }
            _ => {}
        }
    }
    Ok(())
}

/// Air quality estimate derived from the VOC and particle indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AirQuality {
    /// Index 0-3.
    Good,
    /// Index 4-6.
    Fair,
    /// Index 7-8.
    Poor,
    /// Index above 8.
    VeryPoor,
}

impl AirQuality {
    /// Buckets the worse of the two indices.
    ///
    /// # Examples
    ///
    /// ```
    /// use dyslink::cli::render::AirQuality;
    ///
    /// assert_eq!(AirQuality::estimate(2, 5), AirQuality::Fair);
    /// assert_eq!(AirQuality::estimate(9, 0), AirQuality::VeryPoor);
    /// ```
    #[must_use]
    pub fn estimate(voc: u32, particle: u32) -> Self {
        match voc.max(particle) {
            0..=3 => Self::Good,
            4..=6 => Self::Fair,
            7..=8 => Self::Poor,
            _ => Self::VeryPoor,
        }
    }

    /// Returns the label shown to users.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Good => "good",
            Self::Fair => "fair",
            Self::Poor => "poor",
            Self::VeryPoor => "very poor",
        }
    }
}

impl fmt::Display for AirQuality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Text form of a device message.
struct MessageText<'a>(&'a DeviceMessage);

impl fmt::Display for MessageText<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            DeviceMessage::ProductState(state) => {
                write_section(f, "Product State:", &product_fields(state))
            }
            DeviceMessage::StateChange(state) => {
                write_section(f, "State Change:", &product_fields(state))
            }
            DeviceMessage::EnvironmentState(state) => {
                write_section(f, "Environment State:", &environment_fields(state))?;
                let quality = AirQuality::estimate(state.voc_index(), state.particle_index());
                writeln!(f, "Air Quality Estimate: {quality}")
            }
            DeviceMessage::Credentials(credentials) => {
                write_section(f, "Device Credentials:", &credential_fields(credentials))
            }
            DeviceMessage::Other {
                message_type,
                fields,
            } => {
                writeln!(f, "Message ({message_type}):")?;
                writeln!(f, "{RULE}")?;
                for (key, value) in fields.iter().filter(|(_, value)| !value.is_empty()) {
                    writeln!(f, "{key}: {value}")?;
                }
                Ok(())
            }
        }
    }
}

/// Text form of a discovered device.
struct RecordText<'a>(&'a ServiceRecord);

impl fmt::Display for RecordText<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let record = self.0;
        for ip in &record.addresses {
            writeln!(f, "Name: {}", record.name)?;
            writeln!(f, "Host: {}", record.hostname)?;
            writeln!(f, "IP: {ip}")?;
            writeln!(f, "Port: {}", record.port)?;
            writeln!(f, "Address: {}", record.connection_string(*ip))?;
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Renders a device message as text, one `Label: value` line per field.
#[must_use]
pub fn render_message(message: &DeviceMessage) -> String {
    MessageText(message).to_string()
}

/// Renders a discovered device, one block per address.
#[must_use]
pub fn render_service_record(record: &ServiceRecord) -> String {
    RecordText(record).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn environment(voc: &str, particle: &str) -> EnvironmentState {
        EnvironmentState {
            voc: Some(voc.to_string()),
            particle: Some(particle.to_string()),
            ..EnvironmentState::default()
        }
    }

    fn estimate_line(state: EnvironmentState) -> String {
        render_message(&DeviceMessage::EnvironmentState(state))
            .lines()
            .last()
            .unwrap_or_default()
            .to_string()
    }

    #[test]
    fn product_state_skips_unreported_fields() {
        let state = ProductState {
            fan_mode: Some("AUTO".to_string()),
            fan_speed: Some(String::new()),
            filter_life: Some("2150".to_string()),
            quality_target: Some("0004".to_string()),
            heat_target: Some("2932".to_string()),
            ..ProductState::default()
        };

        assert_eq!(
            render_message(&DeviceMessage::ProductState(state)),
            "Product State:\n\
             --------------\n\
             FanMode: AUTO\n\
             QualityTarget: Low\n\
             FilterLife: 50%\n\
             HeatTarget: 68°F\n"
        );
    }

    #[test]
    fn environment_state_layout() {
        let state = EnvironmentState {
            temperature: Some("2955".to_string()),
            humidity: Some("0045".to_string()),
            particle: Some("0002".to_string()),
            voc: Some("0001".to_string()),
            sleep_timer: Some("OFF".to_string()),
        };

        assert_eq!(
            render_message(&DeviceMessage::EnvironmentState(state)),
            "Environment State:\n\
             --------------\n\
             Temperature: 72°F\n\
             Humidity: 45%\n\
             Particle: 0002\n\
             VOC: 0001\n\
             SleepTimer: OFF\n\
             Air Quality Estimate: good\n"
        );
    }

    #[test]
    fn air_quality_boundaries() {
        assert_eq!(AirQuality::estimate(3, 0), AirQuality::Good);
        assert_eq!(AirQuality::estimate(0, 4), AirQuality::Fair);
        assert_eq!(AirQuality::estimate(6, 6), AirQuality::Fair);
        assert_eq!(AirQuality::estimate(7, 2), AirQuality::Poor);
        assert_eq!(AirQuality::estimate(1, 8), AirQuality::Poor);
        assert_eq!(AirQuality::estimate(9, 9), AirQuality::VeryPoor);
    }

    #[test]
    fn air_quality_uses_worse_index() {
        assert_eq!(
            estimate_line(environment("0002", "0007")),
            "Air Quality Estimate: poor"
        );
        assert_eq!(
            estimate_line(environment("0010", "0001")),
            "Air Quality Estimate: very poor"
        );
    }

    #[test]
    fn unparseable_index_counts_as_zero() {
        assert_eq!(
            estimate_line(environment("INIT", "0005")),
            "Air Quality Estimate: fair"
        );
        assert_eq!(
            estimate_line(EnvironmentState::default()),
            "Air Quality Estimate: good"
        );
    }

    #[test]
    fn non_numeric_values_shown_raw() {
        assert_eq!(format_value(Format::Temperature, "OFF"), "OFF");
        assert_eq!(format_value(Format::FilterLife, "INIT"), "INIT");
        assert_eq!(format_value(Format::QualityTarget, "0002"), "0002");
    }

    #[test]
    fn filter_life_rounds() {
        assert_eq!(format_value(Format::FilterLife, "4300"), "100%");
        assert_eq!(format_value(Format::FilterLife, "0000"), "0%");
        assert_eq!(format_value(Format::FilterLife, "0022"), "1%");
    }

    #[test]
    fn credentials_layout() {
        let credentials = DeviceCredentials {
            serial: Some("AB1-EU-XYZ".to_string()),
            password: Some("secret".to_string()),
            product_type: None,
        };

        assert_eq!(
            render_message(&DeviceMessage::Credentials(credentials)),
            "Device Credentials:\n--------------\nSerial: AB1-EU-XYZ\nPassword: secret\n"
        );
    }

    #[test]
    fn other_message_lists_fields() {
        let message = DeviceMessage::Other {
            message_type: "HELLO".to_string(),
            fields: vec![
                ("empty".to_string(), String::new()),
                ("version".to_string(), "21.04".to_string()),
            ],
        };

        assert_eq!(
            render_message(&message),
            "Message (HELLO):\n--------------\nversion: 21.04\n"
        );
    }

    #[test]
    fn service_record_block_per_address() {
        let record = ServiceRecord::new(
            "fan._dyson_mqtt._tcp.local.",
            "fan.local.",
            vec!["192.168.1.20".parse().unwrap()],
            1883,
        );

        assert_eq!(
            render_service_record(&record),
            "Name: fan._dyson_mqtt._tcp.local.\n\
             Host: fan.local.\n\
             IP: 192.168.1.20\n\
             Port: 1883\n\
             Address: tcp://192.168.1.20:1883\n\n"
        );
    }

    #[test]
    fn state_change_has_own_header() {
        let state = ProductState {
            fan_speed: Some("0004".to_string()),
            ..ProductState::default()
        };

        assert_eq!(
            render_message(&DeviceMessage::StateChange(state)),
            "State Change:\n--------------\nFanSpeed: 0004\n"
        );
    }

    #[test]
    fn message_text_streams_into_formatter() {
        let state = ProductState {
            night_mode: Some("ON".to_string()),
            ..ProductState::default()
        };
        let message = DeviceMessage::ProductState(state);

        let streamed = format!(">{}<", MessageText(&message));
        assert_eq!(
            streamed,
            ">Product State:\n--------------\nNightMode: ON\n<"
        );
    }

    #[test]
    fn service_record_with_two_addresses() {
        let record = ServiceRecord::new(
            "fan._dyson_mqtt._tcp.local.",
            "fan.local.",
            vec!["fe80::1".parse().unwrap(), "10.0.0.5".parse().unwrap()],
            1883,
        );

        let text = render_service_record(&record);
        let blocks: Vec<&str> = text.split("\n\n").filter(|b| !b.is_empty()).collect();
        assert_eq!(blocks.len(), 2);
        assert!(blocks[0].contains("IP: 10.0.0.5"));
        assert!(blocks[1].contains("Address: tcp://[fe80::1]:1883"));
    }
}
