// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Table of commands the CLI understands.

use std::fmt;

/// Identifies a command's handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    /// Browse the network for devices.
    Discover,
    /// Send network credentials to a device in setup mode.
    Bootstrap,
    /// Set the fan mode.
    SetFanMode,
    /// Set the fan speed.
    SetSpeed,
    /// Toggle oscillation.
    SetOscillate,
    /// Toggle standby monitoring.
    SetMonitor,
    /// Set the heating target.
    SetTemp,
    /// Toggle focused mode.
    SetFocusedMode,
    /// Request and print the current state.
    GetCurrentState,
    /// Print every message the device sends.
    Monitor,
    /// Reset the filter life counter.
    ResetFilter,
}

/// Number of positional arguments a command takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    /// No arguments; extras are ignored.
    None,
    /// At least this many arguments; extras are ignored.
    Fixed(usize),
    /// Any number of arguments, checked by the handler.
    Variadic,
}

impl Arity {
    /// Returns true if `count` arguments satisfy this arity.
    ///
    /// # Examples
    ///
    /// ```
    /// use dyslink::cli::registry::Arity;
    ///
    /// assert!(Arity::Fixed(1).check(1));
    /// assert!(!Arity::Fixed(1).check(0));
    /// assert!(Arity::None.check(3));
    /// ```
    #[must_use]
    pub const fn check(self, count: usize) -> bool {
        match self {
            Self::None | Self::Variadic => true,
            Self::Fixed(needed) => count >= needed,
        }
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => f.write_str("no arguments"),
            Self::Fixed(1) => f.write_str("1 argument"),
            Self::Fixed(n) => write!(f, "{n} arguments"),
            Self::Variadic => f.write_str("any arguments"),
        }
    }
}

/// One entry in the command table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandDescriptor {
    /// Name typed on the command line.
    pub name: &'static str,
    /// Handler to run.
    pub kind: CommandKind,
    /// One-line description for the usage listing.
    pub description: &'static str,
    /// Positional arguments expected.
    pub arity: Arity,
    /// Whether a device session is opened before the handler runs.
    pub connect: bool,
}

const fn command(
    name: &'static str,
    kind: CommandKind,
    description: &'static str,
    arity: Arity,
    connect: bool,
) -> CommandDescriptor {
    CommandDescriptor {
        name,
        kind,
        description,
        arity,
        connect,
    }
}

/// Every command, sorted by name.
pub static COMMANDS: &[CommandDescriptor] = &[
    command(
        "bootstrap",
        CommandKind::Bootstrap,
        "Bootstrap a new device",
        Arity::Variadic,
        true,
    ),
    command(
        "discover",
        CommandKind::Discover,
        "Find all Dyson Purifiers",
        Arity::None,
        false,
    ),
    command(
        "get-current-state",
        CommandKind::GetCurrentState,
        "Request the current state from the device",
        Arity::None,
        true,
    ),
    command(
        "monitor",
        CommandKind::Monitor,
        "Monitor all messages",
        Arity::None,
        true,
    ),
    command(
        "reset-filter",
        CommandKind::ResetFilter,
        "Request reset of the filter life",
        Arity::None,
        true,
    ),
    command(
        "set-fan-mode",
        CommandKind::SetFanMode,
        "Set the mode of the fan",
        Arity::Fixed(1),
        true,
    ),
    command(
        "set-focused-mode",
        CommandKind::SetFocusedMode,
        "Set focused mode",
        Arity::Fixed(1),
        true,
    ),
    command(
        "set-monitor",
        CommandKind::SetMonitor,
        "Toggle standby monitoring",
        Arity::Fixed(1),
        true,
    ),
    command(
        "set-oscillate",
        CommandKind::SetOscillate,
        "Toggle oscillation",
        Arity::Fixed(1),
        true,
    ),
    command(
        "set-speed",
        CommandKind::SetSpeed,
        "Set fan speed",
        Arity::Fixed(1),
        true,
    ),
    command(
        "set-temp",
        CommandKind::SetTemp,
        "Set temperature",
        Arity::Fixed(1),
        true,
    ),
];

/// Finds a command by name.
#[must_use]
pub fn lookup(name: &str) -> Option<&'static CommandDescriptor> {
    COMMANDS.iter().find(|descriptor| descriptor.name == name)
}

/// Renders the command listing shown after the flag help.
#[must_use]
pub fn usage_table() -> String {
    let width = COMMANDS
        .iter()
        .map(|descriptor| descriptor.name.len())
        .max()
        .unwrap_or(0);

    let mut out = String::from("Available commands:\n");
    for descriptor in COMMANDS {
        out.push_str(&format!(
            "  {:<width$}  {}\n",
            descriptor.name, descriptor.description
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commands_sorted_and_unique() {
        let names: Vec<&str> = COMMANDS.iter().map(|d| d.name).collect();
        let mut sorted = names.clone();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(names, sorted);
    }

    #[test]
    fn lookup_known_and_unknown() {
        let descriptor = lookup("set-speed").unwrap();
        assert_eq!(descriptor.kind, CommandKind::SetSpeed);
        assert_eq!(descriptor.arity, Arity::Fixed(1));
        assert!(descriptor.connect);

        assert!(lookup("set-sped").is_none());
        assert!(lookup("").is_none());
    }

    #[test]
    fn only_discover_runs_without_a_session() {
        let offline: Vec<&str> = COMMANDS
            .iter()
            .filter(|d| !d.connect)
            .map(|d| d.name)
            .collect();
        assert_eq!(offline, ["discover"]);
    }

    #[test]
    fn fixed_arity_ignores_extras() {
        assert!(Arity::Fixed(1).check(2));
        assert!(Arity::Variadic.check(0));
    }

    #[test]
    fn usage_lists_every_command() {
        let usage = usage_table();
        assert!(usage.starts_with("Available commands:\n"));
        for descriptor in COMMANDS {
            assert!(usage.contains(descriptor.name));
            assert!(usage.contains(descriptor.description));
        }
        assert!(usage.contains("  set-fan-mode       Set the mode of the fan\n"));
    }
}
