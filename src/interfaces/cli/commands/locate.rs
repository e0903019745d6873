//! Locate command

use crate::config::get_config;
use crate::errors::VisitrackError;
use crate::interfaces::cli::CliError;
use crate::services::geoip::LocationResolver;

/// Resolve the current location and print it as JSON
pub async fn locate() -> Result<(), CliError> {
    let config = get_config();
    let resolver = LocationResolver::with_default_providers(config.tracker.lookup_timeout());

    let record = resolver.resolve().await;
    let json = serde_json::to_string_pretty(&record).map_err(VisitrackError::from)?;
    println!("{}", json);

    Ok(())
}
