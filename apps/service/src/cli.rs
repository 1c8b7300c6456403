use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(author, version, about = "Periodic HTTPS uptime checks with mail alerts", long_about = None)]
pub struct Cli {
    /// Path to the config file (defaults to $XDG_CONFIG_HOME/downtrack/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Check every target on a fixed interval until interrupted
    Run,
    /// Run a single check cycle and print its summary
    Check,
    /// Start watching a URL for a subscriber
    Add {
        #[arg(long)]
        email: String,
        #[arg(long)]
        url: String,
    },
    /// Stop watching a URL for a subscriber
    Remove {
        #[arg(long)]
        email: String,
        #[arg(long)]
        url: String,
    },
    /// Mark a subscriber verified so their targets are checked
    Verify {
        #[arg(long)]
        email: String,
    },
    /// Show the URLs watched for a subscriber
    List {
        #[arg(long)]
        email: String,
    },
}

impl Cli {
    /// `run` when no subcommand was given
    pub fn selected(&self) -> Command {
        self.command.clone().unwrap_or(Command::Run)
    }
}
