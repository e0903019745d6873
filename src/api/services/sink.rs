use actix_web::{HttpResponse, Responder, web};
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, trace, warn};

use crate::analytics::VisitorRecord;
use crate::storage::VisitorSheet;

/// `GET /` 的响应文本
pub const STATUS_TEXT: &str = "Visitor Tracking API is running. Use POST to send data.";

/// `POST /` 的响应体
///
/// 无论成功失败状态码都是 200，结果写在 `result` 字段中。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SinkResponse {
    pub result: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SinkResponse {
    pub fn success() -> Self {
        Self {
            result: "success",
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            result: "error",
            error: Some(message.into()),
        }
    }
}

/// Sink Service
///
/// 接收访客记录并追加到表格；表格写入在阻塞线程池中执行。
pub struct SinkService;

impl SinkService {
    pub async fn append_visitor(
        sheet: web::Data<Arc<VisitorSheet>>,
        body: web::Bytes,
    ) -> impl Responder {
        trace!("Received visitor record ({} bytes)", body.len());

        let record: VisitorRecord = match serde_json::from_slice(&body) {
            Ok(record) => record,
            Err(e) => {
                warn!("Rejected malformed visitor record: {}", e);
                return HttpResponse::Ok().json(SinkResponse::error(e.to_string()));
            }
        };

        let sheet = sheet.get_ref().clone();
        match web::block(move || sheet.append(&record)).await {
            Ok(Ok(())) => HttpResponse::Ok().json(SinkResponse::success()),
            Ok(Err(e)) => {
                error!("Failed to append visitor record: {}", e);
                HttpResponse::Ok().json(SinkResponse::error(e.to_string()))
            }
            Err(e) => {
                error!("Sheet append task failed: {}", e);
                HttpResponse::Ok().json(SinkResponse::error(e.to_string()))
            }
        }
    }

    pub async fn status() -> impl Responder {
        HttpResponse::Ok()
            .content_type("text/plain; charset=utf-8")
            .body(STATUS_TEXT)
    }

    pub async fn stats(sheet: web::Data<Arc<VisitorSheet>>) -> impl Responder {
        let sheet = sheet.get_ref().clone();
        match web::block(move || sheet.stats()).await {
            Ok(Ok(stats)) => HttpResponse::Ok().json(stats),
            Ok(Err(e)) => {
                error!("Failed to compute visitor stats: {}", e);
                HttpResponse::InternalServerError().json(SinkResponse::error(e.to_string()))
            }
            Err(e) => {
                error!("Visitor stats task failed: {}", e);
                HttpResponse::InternalServerError().json(SinkResponse::error(e.to_string()))
            }
        }
    }
}

pub fn sink_routes() -> actix_web::Scope {
    web::scope("")
        .route("/", web::post().to(SinkService::append_visitor))
        .route("/", web::get().to(SinkService::status))
        .route("/stats", web::get().to(SinkService::stats))
}
