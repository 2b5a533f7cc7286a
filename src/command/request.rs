// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! State request and network join commands.

use serde_json::{Map, Value};

use crate::command::Command;

/// Asks the device to publish its product and environment state.
///
/// The device answers with two messages: `CURRENT-STATE` and
/// `ENVIRONMENTAL-CURRENT-SENSOR-DATA`.
///
/// # Examples
///
/// ```
/// use dyslink::command::{Command, RequestCurrentStateCommand};
///
/// let cmd = RequestCurrentStateCommand;
/// assert_eq!(cmd.message_type(), "REQUEST-CURRENT-STATE");
/// assert!(cmd.fields().is_empty());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RequestCurrentStateCommand;

impl Command for RequestCurrentStateCommand {
    fn message_type(&self) -> &'static str {
        "REQUEST-CURRENT-STATE"
    }

    fn fields(&self) -> Map<String, Value> {
        Map::new()
    }
}

/// Asks a device in setup mode to join a wireless network.
#[derive(Clone, PartialEq, Eq)]
pub struct JoinNetworkCommand {
    ssid: String,
    key: String,
}

impl JoinNetworkCommand {
    /// Creates a join request for the given network.
    #[must_use]
    pub fn new(ssid: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            ssid: ssid.into(),
            key: key.into(),
        }
    }
}

// The key stays out of logs.
impl std::fmt::Debug for JoinNetworkCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JoinNetworkCommand")
            .field("ssid", &self.ssid)
            .finish_non_exhaustive()
    }
}

impl Command for JoinNetworkCommand {
    fn message_type(&self) -> &'static str {
        "JOIN-NETWORK"
    }

    fn fields(&self) -> Map<String, Value> {
        let mut fields = Map::new();
        fields.insert("ssid".to_string(), Value::from(self.ssid.as_str()));
        fields.insert("password".to_string(), Value::from(self.key.as_str()));
        fields
    }
}
