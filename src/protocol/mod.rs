// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device session over the Dyson local MQTT protocol.
//!
//! A session publishes [`Command`]s to one device; decoded device messages
//! arrive separately, as [`MessageCallback`]s on the channel returned when the
//! session is opened.
//!
//! - [`Session`]: operations every session offers
//! - [`DeviceClient`]: the MQTT implementation, built with [`DeviceClientBuilder`]

mod mqtt;

pub use mqtt::{DeviceClient, DeviceClientBuilder};

use crate::command::{
    Command, FanState, JoinNetworkCommand, RequestCurrentStateCommand, StateSetCommand,
};
use crate::error::ProtocolError;
use crate::telemetry::DeviceMessage;

/// One delivery on a session's message channel: a decoded message, or the
/// error that prevented decoding or receiving it.
pub type MessageCallback = crate::Result<DeviceMessage>;

/// Operations on an open device session.
#[allow(async_fn_in_trait)]
pub trait Session {
    /// Publishes a command to the device.
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError` if the command cannot be sent.
    async fn send_command<C: Command + Sync>(&self, command: &C) -> Result<(), ProtocolError>;

    /// Applies a state delta.
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError` if the command cannot be sent.
    async fn set_state(&self, state: FanState) -> Result<(), ProtocolError> {
        self.send_command(&StateSetCommand::new(state)).await
    }

    /// Asks the device to publish its current product and environment state.
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError` if the command cannot be sent.
    async fn request_current_state(&self) -> Result<(), ProtocolError> {
        self.send_command(&RequestCurrentStateCommand).await
    }

    /// Asks a device in setup mode to join a wireless network.
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError` if the command cannot be sent.
    async fn wifi_bootstrap(&self, ssid: &str, key: &str) -> Result<(), ProtocolError> {
        self.send_command(&JoinNetworkCommand::new(ssid, key)).await
    }
}
