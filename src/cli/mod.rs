// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Command-line front end.
//!
//! Global flags are parsed into an immutable [`Config`]. [`run`] then looks
//! the command up in the [`registry`], validates its arguments, opens a
//! device session when the command needs one and hands over to the matching
//! handler in [`handlers`].

pub mod handlers;
pub mod registry;
pub mod render;

use std::io;
use std::time::Duration;

use clap::Parser;
use thiserror::Error;
use tokio::sync::mpsc;

use crate::discovery::DiscoveryOptions;
use crate::error::{Error, ProtocolError, ValueError};
use crate::protocol::{DeviceClient, MessageCallback, Session};
use crate::types::DeviceModel;
use handlers::{Action, DeviceAction};

/// Global command-line flags.
#[derive(Debug, Parser)]
#[command(
    name = "dyslink",
    version,
    about = "Control Dyson purifiers over the local network",
    long_about = None
)]
pub struct Cli {
    /// Device address (e.g. tcp://192.168.1.20:1883)
    #[arg(long, env = "DYSLINK_ADDRESS")]
    pub address: Option<String>,

    /// Device serial, used as the MQTT username
    #[arg(long, env = "DYSLINK_USER")]
    pub user: Option<String>,

    /// Device password
    #[arg(long, env = "DYSLINK_PASS", hide_env_values = true)]
    pub pass: Option<String>,

    /// Device model (475, 469 or 455)
    #[arg(long, env = "DYSLINK_MODEL")]
    pub model: Option<String>,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,

    /// Seconds between state requests while monitoring
    #[arg(
        long,
        value_name = "SECS",
        default_value_t = 10,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub monitor_interval: u64,

    /// Seconds to listen for devices during discovery
    #[arg(
        long,
        value_name = "SECS",
        default_value_t = 15,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub scan_timeout: u64,

    /// Command to run, followed by its arguments
    #[arg(value_name = "COMMAND", trailing_var_arg = true)]
    pub command: Vec<String>,
}

/// Settings shared by every command, fixed at startup.
#[derive(Clone, Default)]
pub struct Config {
    /// Device address.
    pub address: Option<String>,
    /// Device serial.
    pub user: Option<String>,
    /// Device password.
    pub pass: Option<String>,
    /// Device model as given.
    pub model: Option<String>,
    /// Debug logging requested.
    pub debug: bool,
    /// Interval between state requests in `monitor`.
    pub monitor_interval: Duration,
    /// Discovery window.
    pub scan_timeout: Duration,
}

impl From<&Cli> for Config {
    fn from(cli: &Cli) -> Self {
        Self {
            address: cli.address.clone(),
            user: cli.user.clone(),
            pass: cli.pass.clone(),
            model: cli.model.clone(),
            debug: cli.debug,
            monitor_interval: Duration::from_secs(cli.monitor_interval),
            scan_timeout: Duration::from_secs(cli.scan_timeout),
        }
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("address", &self.address)
            .field("user", &self.user)
            .field("model", &self.model)
            .field("debug", &self.debug)
            .field("monitor_interval", &self.monitor_interval)
            .field("scan_timeout", &self.scan_timeout)
            .finish_non_exhaustive()
    }
}

impl Config {
    /// Returns the configured device model.
    ///
    /// # Errors
    ///
    /// Returns `CliError::Usage` if no model is set or it is not supported.
    pub fn device_model(&self) -> Result<DeviceModel, CliError> {
        let model = self
            .model
            .as_deref()
            .filter(|m| !m.is_empty())
            .ok_or_else(|| CliError::Usage("Must supply model type".to_string()))?;
        model
            .parse()
            .map_err(|e: crate::error::DeviceError| CliError::Usage(e.to_string()))
    }

    /// Returns the configured device address.
    ///
    /// # Errors
    ///
    /// Returns `CliError::Usage` if no address is set.
    pub fn device_address(&self) -> Result<&str, CliError> {
        self.address
            .as_deref()
            .filter(|a| !a.is_empty())
            .ok_or_else(|| CliError::Usage("Must supply address".to_string()))
    }

    /// Returns discovery options for this configuration.
    #[must_use]
    pub fn discovery_options(&self) -> DiscoveryOptions {
        DiscoveryOptions::new().with_timeout(self.scan_timeout)
    }

    async fn connect(
        &self,
        model: DeviceModel,
        address: &str,
    ) -> Result<(DeviceClient, mpsc::Receiver<MessageCallback>), CliError> {
        let connection = DeviceClient::builder()
            .address(address)
            .model(model)
            .credentials(
                self.user.clone().unwrap_or_default(),
                self.pass.clone().unwrap_or_default(),
            )
            .build()
            .await?;
        Ok(connection)
    }
}

/// Errors reported by the command-line front end.
#[derive(Debug, Error)]
pub enum CliError {
    /// The command line was incomplete or named an unknown command.
    #[error("{0}")]
    Usage(String),

    /// The bootstrap flags were missing or malformed.
    #[error("{0}")]
    BootstrapUsage(String),

    /// A command argument was rejected.
    #[error(transparent)]
    Value(#[from] ValueError),

    /// The device session or discovery failed.
    #[error(transparent)]
    Device(#[from] Error),

    /// Output could not be written.
    #[error("failed to write output: {0}")]
    Io(#[from] io::Error),
}

impl From<ProtocolError> for CliError {
    fn from(e: ProtocolError) -> Self {
        Self::Device(e.into())
    }
}

impl CliError {
    /// Returns the process exit code for this error.
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::BootstrapUsage(_) => 2,
            _ => 1,
        }
    }

    /// Returns true if the usage text should follow the message.
    #[must_use]
    pub const fn shows_usage(&self) -> bool {
        matches!(self, Self::Usage(_))
    }
}

/// Runs one command.
///
/// # Errors
///
/// Returns `CliError::Usage` for an unknown command, too few arguments, or a
/// missing model or address; otherwise whatever the handler reports.
pub async fn run(config: &Config, command: &str, args: &[String]) -> Result<(), CliError> {
    let descriptor = registry::lookup(command)
        .ok_or_else(|| CliError::Usage(format!("Invalid command {command:?}")))?;

    if !descriptor.arity.check(args.len()) {
        return Err(CliError::Usage(format!(
            "Invalid number of arguments to {}, needs {}",
            descriptor.name, descriptor.arity
        )));
    }

    // Missing model or address is reported before a rejected value.
    if descriptor.connect {
        config.device_model()?;
        config.device_address()?;
    }

    match Action::prepare(descriptor.kind, args)? {
        Action::Discover => {
            handlers::discover(&config.discovery_options(), &mut io::stdout()).await
        }
        Action::Device(action) => {
            let model = config.device_model()?;
            let address = config.device_address()?;

            tracing::debug!(command = descriptor.name, %model, %address, "Running command");

            let (client, mut messages) = config.connect(model, address).await?;
            let result = execute(&client, &mut messages, config, action).await;
            client.close().await;
            result
        }
    }
}

async fn execute<S: Session>(
    session: &S,
    messages: &mut mpsc::Receiver<MessageCallback>,
    config: &Config,
    action: DeviceAction,
) -> Result<(), CliError> {
    match action {
        DeviceAction::Bootstrap { ssid, key } => handlers::bootstrap(session, &ssid, &key).await,
        DeviceAction::SetState(state) => handlers::apply_state(session, state).await,
        DeviceAction::GetCurrentState => {
            handlers::get_current_state(session, messages, &mut io::stdout()).await
        }
        DeviceAction::Monitor => {
            handlers::monitor(
                session,
                messages,
                config.monitor_interval,
                &mut io::stdout(),
                &mut io::stderr(),
            )
            .await
        }
    }
}
