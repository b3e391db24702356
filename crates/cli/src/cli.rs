// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use hl_core::Viewer;

/// Which side of the conversation the user is on.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum Role {
    #[default]
    Client,
    Support,
}

impl Role {
    pub fn viewer(self, user_id: impl Into<String>) -> Viewer {
        match self {
            Role::Client => Viewer::client(user_id),
            Role::Support => Viewer::support(user_id),
        }
    }
}

#[derive(Parser)]
#[command(name = "helpline")]
#[command(about = "Realtime client for the helpline support chat")]
pub struct Cli {
    /// Path to a TOML config file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Join the realtime feed and log activity until interrupted
    Watch {
        /// Bearer credential presented to the broker
        #[arg(long)]
        token: String,

        /// Id of the signed-in user
        #[arg(long)]
        user_id: String,

        #[arg(long, value_enum, default_value_t = Role::Client)]
        role: Role,

        /// Open this thread as soon as it shows up in the feed
        #[arg(long)]
        thread: Option<String>,

        /// Broker URL, overriding the config file
        #[arg(long)]
        url: Option<String>,
    },

    /// Print the effective configuration
    Config {
        /// Broker URL, overriding the config file
        #[arg(long)]
        url: Option<String>,
    },
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
