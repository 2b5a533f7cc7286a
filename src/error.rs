// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the `dyslink` library.
//!
//! This module provides the error hierarchy used across the library: value
//! validation, MQTT and mDNS communication, message decoding, and device
//! configuration.

use thiserror::Error;

/// The main error type for this library.
#[derive(Debug, Error)]
pub enum Error {
    /// Error occurred during value validation.
    #[error("value error: {0}")]
    Value(#[from] ValueError),

    /// Error occurred during protocol communication.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// Error occurred while decoding a device message.
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// Error occurred during device operations.
    #[error("device error: {0}")]
    Device(#[from] DeviceError),
}

/// Errors related to value validation and constraints.
///
/// These errors occur when a command argument does not describe a legal
/// device setting.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValueError {
    /// A numeric value is outside the allowed range.
    #[error("invalid {what} {actual}: must be between {min} and {max}")]
    OutOfRange {
        /// What the value describes (e.g. "fan speed").
        what: &'static str,
        /// Minimum allowed value.
        min: u16,
        /// Maximum allowed value.
        max: u16,
        /// The actual value that was provided.
        actual: i64,
    },

    /// A value is not a number.
    #[error("invalid {what} {value:?}: not a number")]
    NotANumber {
        /// What the value describes.
        what: &'static str,
        /// The text that was provided.
        value: String,
    },

    /// A value is not one of a fixed set of choices.
    #[error("invalid {what} {value:?}: expected one of {expected}")]
    InvalidChoice {
        /// What the value describes (e.g. "oscillation state").
        what: &'static str,
        /// The text that was provided.
        value: String,
        /// The accepted choices, for display.
        expected: &'static str,
    },
}

/// Errors related to protocol communication (MQTT and mDNS).
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// MQTT request could not be queued.
    #[error("MQTT error: {0}")]
    Mqtt(#[from] rumqttc::ClientError),

    /// mDNS browsing failed.
    #[error("mDNS error: {0}")]
    Discovery(#[from] mdns_sd::Error),

    /// Connection to the device failed.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// Request timed out.
    #[error("request timed out after {0} ms")]
    Timeout(u64),

    /// Invalid URL or address.
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    /// The device rejected the supplied credentials.
    #[error("authentication failed")]
    AuthenticationFailed,

    /// Internal channel was closed.
    #[error("channel closed: {0}")]
    ChannelClosed(String),
}

/// Errors related to decoding device messages.
#[derive(Debug, Error)]
pub enum ParseError {
    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// Expected field is missing from the message.
    #[error("missing field in message: {0}")]
    MissingField(String),

    /// Payload is not valid UTF-8.
    #[error("payload on {0} is not valid UTF-8")]
    InvalidUtf8(String),
}

/// Errors related to device configuration.
#[derive(Debug, Error)]
pub enum DeviceError {
    /// The product type is not one this library can talk to.
    #[error("unsupported device model: {0:?}")]
    UnsupportedModel(String),

    /// Device configuration is invalid.
    #[error("invalid device configuration: {0}")]
    InvalidConfiguration(String),
}

/// A specialized Result type for this library.
pub type Result<T> = std::result::Result<T, Error>;
