//! CLI commands

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Herald - in-process event bus demo
#[derive(Parser, Debug)]
#[command(name = "herald")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Config file (defaults to herald.{jsonc,json,yml,yaml} lookup)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Seconds to wait for handlers after publishing
    #[arg(long, global = true)]
    pub settle: Option<u64>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Publish one order-created event to the order subscribers (default)
    Run,

    /// Publish an event to the order subscribers under any key
    Publish {
        /// Event key, e.g. order.created
        key: String,

        /// JSON object payload (defaults to a fresh order identifier)
        #[arg(long)]
        payload: Option<String>,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show resolved configuration
    Show,
}
