// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `Dyslink` - Control Dyson air purifiers over the local network.
//!
//! Dyson purifiers run a small MQTT broker. This library connects to it,
//! publishes state changes and decodes the messages the device sends back.
//! It also finds devices through mDNS and backs the `dyslink` command-line
//! tool.
//!
//! # Supported Features
//!
//! - **Fan control**: Mode, speed, oscillation, focused mode
//! - **Heating**: Target temperature in °F, or off
//! - **Monitoring**: Product state, sensor readings, air quality estimate
//! - **Setup**: Discovery and joining a device to a wireless network
//!
//! # Supported Models
//!
//! - 475 (Pure Cool Link tower)
//! - 469 (Pure Cool Link desk)
//! - 455 (Pure Hot+Cool Link)
//!
//! # Quick Start
//!
//! ```no_run
//! use dyslink::command::FanState;
//! use dyslink::protocol::{DeviceClient, Session};
//! use dyslink::types::{DeviceModel, FanSpeed};
//!
//! #[tokio::main]
//! async fn main() -> dyslink::Result<()> {
//!     let (client, mut messages) = DeviceClient::builder()
//!         .address("tcp://192.168.1.20:1883")
//!         .model(DeviceModel::N475)
//!         .credentials("AB1-EU-XYZ", "local-password")
//!         .build()
//!         .await?;
//!
//!     client.set_state(FanState::fan_speed(FanSpeed::new(5)?)).await?;
//!     client.request_current_state().await?;
//!
//!     if let Some(message) = messages.recv().await {
//!         println!("{:?}", message?);
//!     }
//!
//!     client.close().await;
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod command;
pub mod discovery;
pub mod error;
pub mod protocol;
pub mod telemetry;
pub mod types;

pub use command::{Command, FanState};
pub use discovery::{DiscoveryOptions, ServiceRecord};
pub use error::{DeviceError, Error, ParseError, ProtocolError, Result, ValueError};
pub use protocol::{DeviceClient, DeviceClientBuilder, MessageCallback, Session};
pub use telemetry::{DeviceMessage, parse_message};
pub use types::{DeviceModel, FanMode, FanSpeed, HeatSetting, HeatTarget, Toggle};
