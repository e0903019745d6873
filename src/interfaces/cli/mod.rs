//! CLI interface module
//!
//! This module provides command-line interface functionality for visitrack.

pub mod commands;

use crate::cli::{Commands, ConfigCommands};
use crate::errors::VisitrackError;
use commands::{config_generate, locate, report, show_stats};
use std::fmt;

#[derive(Debug)]
pub enum CliError {
    ParseError(String),
    CommandError(String),
}

impl CliError {
    /// Format as simple output
    pub fn format_simple(&self) -> String {
        match self {
            CliError::ParseError(msg) => format!("Parse error: {}", msg),
            CliError::CommandError(msg) => format!("Command error: {}", msg),
        }
    }

    /// Format as colored output
    pub fn format_colored(&self) -> String {
        use colored::Colorize;
        match self {
            CliError::ParseError(msg) => {
                format!("{} {}", "Parse error:".yellow().bold(), msg.white())
            }
            CliError::CommandError(msg) => {
                format!("{} {}", "Command error:".red().bold(), msg.white())
            }
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for CliError {}

impl From<VisitrackError> for CliError {
    fn from(err: VisitrackError) -> Self {
        match err {
            VisitrackError::Validation(msg) => CliError::ParseError(msg),
            other => CliError::CommandError(other.to_string()),
        }
    }
}

/// Run a CLI command from clap-parsed input
pub async fn run_cli_command(cmd: Commands) -> Result<(), CliError> {
    match cmd {
        Commands::Locate => locate().await,

        Commands::Report {
            page_url,
            user_agent,
            language,
            screen,
            referrer,
            sink,
            dry_run,
        } => {
            report(commands::ReportArgs {
                page_url,
                user_agent,
                language,
                screen,
                referrer,
                sink,
                dry_run,
            })
            .await
        }

        Commands::Stats { sheet } => show_stats(sheet).await,

        Commands::Config { action } => match action {
            ConfigCommands::Generate { output_path, force } => {
                config_generate(output_path, force).await
            }
        },

        Commands::Serve => Err(CliError::CommandError(
            "serve is handled by server mode".to_string(),
        )),
    }
}
