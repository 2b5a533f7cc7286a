// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Value types for Dyson device control.
//!
//! Each type ensures values are legal device settings at construction time,
//! so nothing invalid reaches the wire.
//!
//! # Types
//!
//! - [`FanMode`] - FAN/OFF/AUTO
//! - [`Toggle`] - ON/OFF switches (oscillation, standby monitoring, focus)
//! - [`FanSpeed`] - Manual speed (1-10)
//! - [`HeatSetting`] / [`HeatTarget`] - Heating off, or a target of 33-99 °F
//! - [`DeviceModel`] - Supported product types

mod mode;
mod model;
mod speed;
mod temperature;

pub use mode::{FanMode, Toggle};
pub use model::DeviceModel;
pub use speed::FanSpeed;
pub use temperature::{
    HeatSetting, HeatTarget, deci_kelvin_to_fahrenheit, fahrenheit_to_deci_kelvin,
};
