// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Command handlers.
//!
//! Arguments are validated into an [`Action`] before any session is opened,
//! so a rejected value never reaches the device. Handlers that talk to the
//! device are generic over [`Session`].

use std::io::Write;
use std::time::Duration;

use clap::Parser;
use clap::builder::NonEmptyStringValueParser;
use tokio::sync::mpsc;
use tokio::time::{Instant, MissedTickBehavior};

use super::CliError;
use super::registry::CommandKind;
use super::render::{render_message, render_service_record};
use crate::command::FanState;
use crate::discovery::{self, DiscoveryOptions};
use crate::error::{Error, ProtocolError, ValueError};
use crate::protocol::{MessageCallback, Session};
use crate::types::{FanMode, FanSpeed, HeatSetting, Toggle};

/// Messages `get-current-state` waits for: product state and environment state.
const CURRENT_STATE_REPLIES: usize = 2;

/// A validated command, ready to run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Browse for devices.
    Discover,
    /// Run against a connected device.
    Device(DeviceAction),
}

/// A validated command that needs a device session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceAction {
    /// Send network credentials.
    Bootstrap {
        /// Network name.
        ssid: String,
        /// Network key.
        key: String,
    },
    /// Apply a state delta.
    SetState(FanState),
    /// Request and print the current state.
    GetCurrentState,
    /// Print messages until the session ends.
    Monitor,
}

impl Action {
    /// Validates a command's arguments.
    ///
    /// Arity has already been checked, so missing arguments are treated as
    /// empty values.
    ///
    /// # Errors
    ///
    /// Returns `CliError::Value` for a rejected value and
    /// `CliError::BootstrapUsage` for malformed bootstrap flags.
    pub fn prepare(kind: CommandKind, args: &[String]) -> Result<Self, CliError> {
        let first = args.first().map_or("", String::as_str);
        let action = match kind {
            CommandKind::Discover => return Ok(Self::Discover),
            CommandKind::Bootstrap => {
                let (ssid, key) = bootstrap_args(args)?;
                DeviceAction::Bootstrap { ssid, key }
            }
            CommandKind::SetFanMode => DeviceAction::SetState(set_fan_mode(first)?),
            CommandKind::SetSpeed => DeviceAction::SetState(set_speed(first)?),
            CommandKind::SetOscillate => DeviceAction::SetState(set_oscillate(first)?),
            CommandKind::SetMonitor => DeviceAction::SetState(set_monitor(first)?),
            CommandKind::SetTemp => DeviceAction::SetState(set_temp(first)?),
            CommandKind::SetFocusedMode => DeviceAction::SetState(set_focused_mode(first)?),
            CommandKind::ResetFilter => DeviceAction::SetState(FanState::reset_filter()),
            CommandKind::GetCurrentState => DeviceAction::GetCurrentState,
            CommandKind::Monitor => DeviceAction::Monitor,
        };
        Ok(Self::Device(action))
    }
}

/// Builds the delta for `set-fan-mode`.
///
/// # Errors
///
/// Returns `ValueError` unless the value is `FAN`, `OFF` or `AUTO`.
pub fn set_fan_mode(value: &str) -> Result<FanState, ValueError> {
    Ok(FanState::fan_mode(value.parse::<FanMode>()?))
}

/// Builds the delta for `set-speed`.
///
/// # Errors
///
/// Returns `ValueError` unless the value is a whole number from 1 to 10.
pub fn set_speed(value: &str) -> Result<FanState, ValueError> {
    Ok(FanState::fan_speed(value.parse::<FanSpeed>()?))
}

/// Builds the delta for `set-oscillate`.
///
/// # Errors
///
/// Returns `ValueError` unless the value is `ON` or `OFF`.
pub fn set_oscillate(value: &str) -> Result<FanState, ValueError> {
    Ok(FanState::oscillation(Toggle::parse(value, "oscillation state")?))
}

/// Builds the delta for `set-monitor`.
///
/// # Errors
///
/// Returns `ValueError` unless the value is `ON` or `OFF`.
pub fn set_monitor(value: &str) -> Result<FanState, ValueError> {
    Ok(FanState::standby_monitoring(Toggle::parse(
        value,
        "monitor state",
    )?))
}

/// Builds the delta for `set-focused-mode`.
///
/// # Errors
///
/// Returns `ValueError` unless the value is `ON` or `OFF`.
pub fn set_focused_mode(value: &str) -> Result<FanState, ValueError> {
    Ok(FanState::focused_mode(Toggle::parse(value, "focused mode")?))
}

/// Builds the delta for `set-temp`: `0` turns heating off, 33 to 99 °F
/// heats to that target.
///
/// # Errors
///
/// Returns `ValueError` for any other value.
pub fn set_temp(value: &str) -> Result<FanState, ValueError> {
    Ok(FanState::heat(value.parse::<HeatSetting>()?))
}

#[derive(Debug, Parser)]
#[command(
    name = "bootstrap",
    no_binary_name = true,
    disable_help_flag = true,
    override_usage = "dyslink [FLAGS] bootstrap --ssid <SSID> --key <KEY>"
)]
struct BootstrapArgs {
    /// Wireless network name
    #[arg(long, value_parser = NonEmptyStringValueParser::new())]
    ssid: String,

    /// Wireless network key
    #[arg(long, value_parser = NonEmptyStringValueParser::new())]
    key: String,
}

fn bootstrap_args(args: &[String]) -> Result<(String, String), CliError> {
    let parsed = BootstrapArgs::try_parse_from(args)
        .map_err(|e| CliError::BootstrapUsage(e.render().to_string()))?;
    Ok((parsed.ssid, parsed.key))
}

/// Sends a state delta.
///
/// # Errors
///
/// Returns `CliError::Device` if the request cannot be sent.
pub async fn apply_state<S: Session>(session: &S, state: FanState) -> Result<(), CliError> {
    tracing::debug!(?state, "Applying state");
    session.set_state(state).await?;
    Ok(())
}

/// Sends network credentials to a device in setup mode.
///
/// # Errors
///
/// Returns `CliError::Device` if the request cannot be sent.
pub async fn bootstrap<S: Session>(session: &S, ssid: &str, key: &str) -> Result<(), CliError> {
    tracing::info!(%ssid, "Sending network credentials");
    session.wifi_bootstrap(ssid, key).await?;
    Ok(())
}

/// Requests the current state and prints the two replies.
///
/// # Errors
///
/// Returns the first error received, or `ProtocolError::ChannelClosed` if
/// the session ends before both replies arrive.
pub async fn get_current_state<S: Session, W: Write>(
    session: &S,
    messages: &mut mpsc::Receiver<MessageCallback>,
    out: &mut W,
) -> Result<(), CliError> {
    session.request_current_state().await?;

    for _ in 0..CURRENT_STATE_REPLIES {
        let message = messages.recv().await.ok_or_else(|| {
            Error::from(ProtocolError::ChannelClosed(
                "session ended before the device replied".to_string(),
            ))
        })??;
        tracing::debug!(message_type = message.message_type(), "Device replied");
        writeln!(out, "{}", render_message(&message))?;
    }
    out.flush()?;
    Ok(())
}

/// Prints every message until the session ends, requesting the current
/// state once per `interval`.
///
/// The first request goes out one interval after start. Errors on
/// individual messages, lost connections included, are written to `err`
/// and do not stop the loop.
///
/// # Errors
///
/// Returns `ProtocolError::ChannelClosed` once the session ends, and
/// `CliError::Io` if output cannot be written.
pub async fn monitor<S: Session, W: Write, E: Write>(
    session: &S,
    messages: &mut mpsc::Receiver<MessageCallback>,
    interval: Duration,
    out: &mut W,
    err: &mut E,
) -> Result<(), CliError> {
    let mut ticker = tokio::time::interval_at(Instant::now() + interval, interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                if let Err(e) = session.request_current_state().await {
                    tracing::warn!(error = %e, "Current state request failed");
                }
            }
            callback = messages.recv() => match callback {
                Some(Ok(message)) => {
                    tracing::debug!(message_type = message.message_type(), "Device message");
                    writeln!(out, "{}", render_message(&message))?;
                    out.flush()?;
                }
                Some(Err(e)) => {
                    writeln!(err, "{e}")?;
                    writeln!(err)?;
                }
                None => {
                    return Err(ProtocolError::ChannelClosed(
                        "device session ended".to_string(),
                    )
                    .into());
                }
            },
        }
    }
}

/// Browses for devices and prints each one as it resolves.
///
/// # Errors
///
/// Returns `CliError::Device` if discovery cannot start.
pub async fn discover<W: Write>(options: &DiscoveryOptions, out: &mut W) -> Result<(), CliError> {
    let mut records = discovery::browse(options).map_err(Error::from)?;
    while let Some(record) = records.recv().await {
        write!(out, "{}", render_service_record(&record))?;
        out.flush()?;
    }
    Ok(())
}
