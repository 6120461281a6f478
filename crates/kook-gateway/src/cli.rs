//! Command-line interface

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(
    name = "kook-gateway",
    version,
    about = "Kook realtime gateway client",
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Connect every enabled account and relay replies until Ctrl-C (default)
    Run,

    /// Check account tokens against the REST API and print one JSON line per account
    Probe {
        /// Only probe this account
        #[arg(long, short)]
        account: Option<String>,
    },
}

impl Cli {
    /// Selected subcommand, `run` when none was given
    pub fn into_command(self) -> Command {
        self.command.unwrap_or(Command::Run)
    }
}
