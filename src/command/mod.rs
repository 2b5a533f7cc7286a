// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Dyson command definitions.
//!
//! This module provides typed representations of the messages published to a
//! device's command topic.
//!
//! # Available Commands
//!
//! | Command Type | Message | Purpose |
//! |-------------|---------|---------|
//! | [`StateSetCommand`] | `STATE-SET` | Apply a [`FanState`] delta |
//! | [`RequestCurrentStateCommand`] | `REQUEST-CURRENT-STATE` | Ask for product and environment state |
//! | [`JoinNetworkCommand`] | `JOIN-NETWORK` | Bootstrap a device onto a wireless network |
//!
//! # Message Structure
//!
//! Every command is a JSON object with a `msg` type, a UTC `time` stamp, and
//! command-specific fields:
//!
//! ```
//! use chrono::{TimeZone, Utc};
//! use dyslink::command::{Command, RequestCurrentStateCommand};
//!
//! let time = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
//! assert_eq!(
//!     RequestCurrentStateCommand.mqtt_payload(time),
//!     r#"{"msg":"REQUEST-CURRENT-STATE","time":"2024-05-01T12:00:00Z"}"#
//! );
//! ```

mod request;
mod state;

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

pub use request::{JoinNetworkCommand, RequestCurrentStateCommand};
pub use state::{FanState, StateSetCommand};

/// A command that can be published to a Dyson device.
pub trait Command {
    /// Returns the `msg` type, e.g. `"STATE-SET"`.
    fn message_type(&self) -> &'static str;

    /// Returns the fields sent alongside `msg` and `time`.
    fn fields(&self) -> Map<String, Value>;

    /// Returns the JSON payload for the command topic.
    fn mqtt_payload(&self, time: DateTime<Utc>) -> String {
        let mut object = Map::new();
        object.insert("msg".to_string(), Value::from(self.message_type()));
        object.insert(
            "time".to_string(),
            Value::from(time.format("%Y-%m-%dT%H:%M:%SZ").to_string()),
        );
        object.extend(self.fields());
        Value::Object(object).to_string()
    }
}
