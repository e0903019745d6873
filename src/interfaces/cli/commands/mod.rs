//! CLI command implementations

mod config_gen;
mod locate;
mod report;
mod stats;

pub use config_gen::config_generate;
pub use locate::locate;
pub use report::{ReportArgs, language_from_locale, report};
pub use stats::show_stats;
