//! Stats command

use colored::Colorize;

use crate::config::get_config;
use crate::errors::VisitrackError;
use crate::interfaces::cli::CliError;
use crate::storage::VisitorSheet;

/// Print visitor statistics of the sheet as JSON
pub async fn show_stats(sheet_path: Option<String>) -> Result<(), CliError> {
    let path = sheet_path.unwrap_or_else(|| get_config().sheet.path.clone());
    let sheet = VisitorSheet::open(&path);

    let stats = sheet.stats()?;
    eprintln!("{} {}", "Visitor sheet:".dimmed(), path.blue());
    println!(
        "{}",
        serde_json::to_string_pretty(&stats).map_err(VisitrackError::from)?
    );

    Ok(())
}
