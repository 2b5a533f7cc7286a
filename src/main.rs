// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::process::ExitCode;

use clap::{CommandFactory, FromArgMatches};
use dyslink::cli::{self, Cli, Config, registry};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let mut command = Cli::command().after_help(registry::usage_table());

    let parsed = command
        .try_get_matches_from_mut(std::env::args_os())
        .and_then(|matches| Cli::from_arg_matches(&matches));
    let cli = match parsed {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            // Help and version go to stdout and are not failures.
            return if e.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    let filter = if cli.debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config = Config::from(&cli);
    tracing::debug!(?config, "Starting");

    let Some((name, args)) = cli.command.split_first() else {
        eprintln!("Must supply command");
        eprint!("{}", command.render_help());
        return ExitCode::FAILURE;
    };

    match cli::run(&config, name, args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e.to_string().trim_end());
            if e.shows_usage() {
                eprint!("{}", command.render_help());
            }
            ExitCode::from(e.exit_code())
        }
    }
}
