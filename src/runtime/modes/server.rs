//! Server mode
//!
//! This module contains the logging sink HTTP server startup logic.

use actix_cors::Cors;
use actix_web::{
    App, HttpServer,
    middleware::{Compress, DefaultHeaders},
    web,
};
use anyhow::Result;
use std::sync::Arc;
use tracing::{info, warn};

use crate::api::services::sink_routes;
use crate::config::{ServerConfig, get_config};
use crate::storage::VisitorSheet;

/// Build CORS middleware from configuration
///
/// - empty origins: browser's default same-origin policy
/// - `*`: any origin
/// - otherwise: only the listed origins
pub fn build_cors_middleware(server_config: &ServerConfig) -> Cors {
    let origins = &server_config.cors_allowed_origins;
    if origins.is_empty() {
        return Cors::default();
    }

    let cors = if origins.iter().any(|o| o == "*") {
        Cors::default().allow_any_origin()
    } else {
        origins
            .iter()
            .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
    };

    cors.allowed_methods(vec!["GET", "POST"])
        .allowed_header(actix_web::http::header::CONTENT_TYPE)
        .max_age(3600usize)
}

/// Run the logging sink HTTP server
///
/// **Note**: Logging system must be initialized before calling this function
pub async fn run_server() -> Result<()> {
    let config = get_config();
    let server_config = config.server.clone();

    let sheet = Arc::new(VisitorSheet::open(&config.sheet.path));
    info!("Visitor sheet: {}", sheet.path().display());

    if server_config.cors_allowed_origins.is_empty() {
        warn!(
            "CORS allowed_origins is empty. \
            Cross-origin reports are only accepted in no-cors mode."
        );
    }

    let cors_config = server_config.clone();
    let server = HttpServer::new(move || {
        App::new()
            .wrap(build_cors_middleware(&cors_config))
            .wrap(Compress::default())
            .wrap(
                DefaultHeaders::new()
                    .add(("Cache-Control", "no-cache, no-store, must-revalidate")),
            )
            .app_data(web::Data::new(sheet.clone()))
            .app_data(web::PayloadConfig::new(64 * 1024))
            .service(sink_routes())
    })
    .keep_alive(std::time::Duration::from_secs(30))
    .client_request_timeout(std::time::Duration::from_millis(5000));

    let bind_address = format!("{}:{}", server_config.host, server_config.port);
    warn!("Starting server at http://{}", bind_address);

    server.bind(bind_address)?.run().await?;

    info!("Server stopped");
    Ok(())
}
