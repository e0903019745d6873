//! Report command

use std::sync::Arc;

use colored::Colorize;

use crate::analytics::{
    HttpSink, ScreenSize, StdoutSink, VisitorContext, VisitorReporter, VisitorSink,
};
use crate::config::get_config;
use crate::interfaces::cli::CliError;
use crate::services::geoip::LocationResolver;

/// Arguments of `visitrack report`
#[derive(Debug, Clone, Default)]
pub struct ReportArgs {
    pub page_url: String,
    pub user_agent: Option<String>,
    pub language: Option<String>,
    pub screen: Option<String>,
    pub referrer: String,
    pub sink: Option<String>,
    pub dry_run: bool,
}

/// Convert a POSIX locale (`en_US.UTF-8`) into a language tag (`en-US`)
pub fn language_from_locale(locale: &str) -> Option<String> {
    let base = locale.split(['.', '@']).next()?.trim();
    if base.is_empty() || base == "C" || base == "POSIX" {
        return None;
    }
    Some(base.replace('_', "-"))
}

/// Send one visitor record for the given page
pub async fn report(args: ReportArgs) -> Result<(), CliError> {
    let config = get_config();
    let timeout = config.tracker.lookup_timeout();

    let screen = args
        .screen
        .as_deref()
        .map(str::parse::<ScreenSize>)
        .transpose()?;
    let language = args
        .language
        .or_else(|| {
            std::env::var("LANG")
                .ok()
                .and_then(|l| language_from_locale(&l))
        })
        .unwrap_or_default();
    let user_agent = args
        .user_agent
        .unwrap_or_else(|| format!("visitrack/{}", env!("CARGO_PKG_VERSION")));

    let context = VisitorContext::new(args.page_url)
        .with_user_agent(user_agent)
        .with_language(language)
        .with_screen(screen)
        .with_referrer(args.referrer);

    let sink: Arc<dyn VisitorSink> = if args.dry_run {
        Arc::new(StdoutSink)
    } else {
        let url = args
            .sink
            .unwrap_or_else(|| config.tracker.sink_url.clone());
        Arc::new(HttpSink::from_url(&url, timeout)?)
    };

    eprintln!(
        "{} {} {}",
        "Reporting visit to".yellow(),
        context.page_url.blue(),
        format!("via {} sink", sink.name()).dimmed()
    );

    let resolver = Arc::new(LocationResolver::with_default_providers(timeout));
    let reporter = VisitorReporter::new(resolver, sink).with_delay(config.tracker.report_delay());

    reporter
        .spawn(context)
        .await
        .map_err(|e| CliError::CommandError(format!("Report task failed: {}", e)))?;

    eprintln!("{}", "Done.".green());
    Ok(())
}
