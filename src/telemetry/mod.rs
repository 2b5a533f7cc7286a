// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Parsing of messages published by Dyson devices.
//!
//! Devices publish JSON messages on `<model>/<serial>/status/current`. The
//! `msg` field names the message type:
//!
//! - `CURRENT-STATE` - Full product state, in answer to a state request
//! - `STATE-CHANGE` - Product state after a change, pushed unprompted
//! - `ENVIRONMENTAL-CURRENT-SENSOR-DATA` - Sensor readings
//! - `DEVICE-CREDENTIALS` - Local credentials after a network join
//!
//! Any other type is kept as an [`DeviceMessage::Other`].
//!
//! # Examples
//!
//! ```
//! use dyslink::telemetry::{DeviceMessage, parse_message};
//!
//! let payload = r#"{"msg":"ENVIRONMENTAL-CURRENT-SENSOR-DATA","data":{"hact":"0040"}}"#;
//!
//! match parse_message(payload).unwrap() {
//!     DeviceMessage::EnvironmentState(env) => {
//!         assert_eq!(env.humidity.as_deref(), Some("0040"));
//!     }
//!     other => panic!("unexpected message {other:?}"),
//! }
//! ```

mod sensor_parser;
mod state_parser;

pub use sensor_parser::{DeviceCredentials, EnvironmentState};
pub use state_parser::ProductState;

use serde_json::{Map, Value};

use crate::error::ParseError;

/// A decoded message from a Dyson device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceMessage {
    /// Full product state from `CURRENT-STATE`.
    ProductState(ProductState),

    /// Product state after a change, from `STATE-CHANGE`.
    StateChange(ProductState),

    /// Sensor readings from `ENVIRONMENTAL-CURRENT-SENSOR-DATA`.
    EnvironmentState(EnvironmentState),

    /// Credentials from `DEVICE-CREDENTIALS`.
    Credentials(DeviceCredentials),

    /// Any other message type.
    Other {
        /// The `msg` field.
        message_type: String,
        /// Top-level fields other than `msg`, rendered as text, in key order.
        fields: Vec<(String, String)>,
    },
}

impl DeviceMessage {
    /// Returns the `msg` type this message was decoded from.
    #[must_use]
    pub fn message_type(&self) -> &str {
        match self {
            Self::ProductState(_) => "CURRENT-STATE",
            Self::StateChange(_) => "STATE-CHANGE",
            Self::EnvironmentState(_) => "ENVIRONMENTAL-CURRENT-SENSOR-DATA",
            Self::Credentials(_) => "DEVICE-CREDENTIALS",
            Self::Other { message_type, .. } => message_type,
        }
    }
}

/// Parses a status payload into a device message.
///
/// # Errors
///
/// Returns `ParseError` if:
/// - The payload is not a JSON object
/// - The `msg` field is missing
/// - A known message type carries a malformed body
pub fn parse_message(payload: &str) -> Result<DeviceMessage, ParseError> {
    let Value::Object(mut object) = serde_json::from_str::<Value>(payload)? else {
        return Err(ParseError::MissingField("msg".to_string()));
    };

    let message_type = match object.remove("msg") {
        Some(Value::String(message_type)) => message_type,
        _ => return Err(ParseError::MissingField("msg".to_string())),
    };

    match message_type.as_str() {
        "CURRENT-STATE" => {
            let state = take_object(&mut object, "product-state")?;
            Ok(DeviceMessage::ProductState(serde_json::from_value(state)?))
        }
        "STATE-CHANGE" => {
            let state = take_object(&mut object, "product-state")?;
            Ok(DeviceMessage::StateChange(serde_json::from_value(state)?))
        }
        "ENVIRONMENTAL-CURRENT-SENSOR-DATA" => {
            let data = take_object(&mut object, "data")?;
            Ok(DeviceMessage::EnvironmentState(serde_json::from_value(
                data,
            )?))
        }
        "DEVICE-CREDENTIALS" => Ok(DeviceMessage::Credentials(serde_json::from_value(
            Value::Object(object),
        )?)),
        _ => Ok(DeviceMessage::Other {
            message_type,
            fields: text_fields(object),
        }),
    }
}

fn take_object(object: &mut Map<String, Value>, key: &str) -> Result<Value, ParseError> {
    object
        .remove(key)
        .ok_or_else(|| ParseError::MissingField(key.to_string()))
}

fn text_fields(object: Map<String, Value>) -> Vec<(String, String)> {
    let mut fields: Vec<(String, String)> = object
        .into_iter()
        .filter_map(|(key, value)| {
            let text = match value {
                Value::Null => return None,
                Value::String(s) => s,
                other => other.to_string(),
            };
            Some((key, text))
        })
        .collect();
    fields.sort_by(|a, b| a.0.cmp(&b.0));
    fields
}
