//! Command-line interface definitions using clap
//!
//! This module defines the CLI structure for visitrack using clap's derive macros.

use clap::{Parser, Subcommand};

/// visitrack - Visitor geolocation tracker
#[derive(Parser)]
#[command(name = "visitrack")]
#[command(version)]
#[command(about = "Visitor geolocation tracker and CSV-backed logging sink", long_about = None)]
pub struct Cli {
    /// Path to the configuration file
    #[arg(long, short = 'c', global = true, default_value = "config.toml")]
    pub config: String,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// Run the logging sink server (default)
    Serve,

    /// Resolve the current location through the provider chain and print it
    Locate,

    /// Resolve the location and send one visitor record to the sink
    Report {
        /// URL of the visited page
        page_url: String,

        /// Visitor user agent
        #[arg(long)]
        user_agent: Option<String>,

        /// Visitor language (e.g. "en-US"); defaults to $LANG
        #[arg(long)]
        language: Option<String>,

        /// Screen size as <width>x<height>
        #[arg(long)]
        screen: Option<String>,

        /// Referring page; empty means "Direct"
        #[arg(long, default_value = "")]
        referrer: String,

        /// Override the configured sink URL
        #[arg(long)]
        sink: Option<String>,

        /// Print the record instead of sending it
        #[arg(long)]
        dry_run: bool,
    },

    /// Show visitor statistics from the sheet
    Stats {
        /// Sheet file (default: configured sheet path)
        #[arg(long)]
        sheet: Option<String>,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },
}

/// Configuration management commands
#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Generate example configuration file
    Generate {
        /// Output path (default: config.example.toml)
        output_path: Option<String>,

        /// Overwrite an existing file without asking
        #[arg(long)]
        force: bool,
    },
}
