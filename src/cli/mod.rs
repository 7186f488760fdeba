//! CLI module for FlyPal.

pub mod commands;
mod output;
pub mod preflight;

pub use output::Output;

use clap::{Parser, Subcommand};

/// FlyPal - Real time flight updates at your fingertips
///
/// Ask about a flight by its number (e.g. "Where is AA123 now?") and FlyPal
/// answers from live ADS-B telemetry.
#[derive(Parser, Debug)]
#[command(name = "flypal")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true, env = "FLYPAL_CONFIG")]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start an interactive chat session
    Chat,

    /// Ask a single question in a fresh session
    Ask {
        /// The question to ask
        question: String,
    },

    /// Fetch a flight's telemetry and print the facts FlyPal would index
    Facts {
        /// Flight callsign (e.g. AA123)
        callsign: String,

        /// Also print the raw telemetry JSON
        #[arg(long)]
        raw: bool,
    },

    /// Start an HTTP server exposing the chat session
    Serve {
        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Port to bind to
        #[arg(short, long, default_value = "3000")]
        port: u16,
    },

    /// Check configuration and connectivity to external services
    Doctor,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Open configuration file in editor
    Edit,

    /// Show configuration file path
    Path,
}
