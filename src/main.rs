use clap::Parser;
use colored::Colorize;
use std::process;

use visitrack::cli::Cli;
use visitrack::config::{get_config, init_config_from};
use visitrack::runtime::modes::{self, Mode};
use visitrack::system::init_logging;

#[actix_web::main]
async fn main() {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_config_from(&cli.config);
    let config = get_config();

    // 日志 guard 需要存活到进程结束
    let _guard = init_logging(&config.logging);

    match modes::detect_mode(cli.command.as_ref()) {
        #[cfg(feature = "server")]
        Mode::Server => {
            if let Err(e) = modes::run_server().await {
                eprintln!("{} {}", "Server error:".red(), e);
                process::exit(1);
            }
        }
        #[cfg(feature = "cli")]
        Mode::Cli => {
            let Some(command) = cli.command else {
                process::exit(1);
            };
            if let Err(e) = modes::run_cli(command).await {
                eprintln!("{}", e.format_colored());
                process::exit(1);
            }
        }
        Mode::Unknown => {
            eprintln!("No execution mode is enabled in this build");
            process::exit(1);
        }
    }
}
