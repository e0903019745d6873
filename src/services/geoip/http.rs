//! HTTP 传输层
//!
//! provider 与 sink 只依赖 [`HttpClient`]，便于在测试中替换。
//! 默认实现基于 ureq（同步），在 `spawn_blocking` 中执行。

use std::time::{Duration, Instant};

use async_trait::async_trait;
use tracing::{trace, warn};
use ureq::Agent;

use crate::errors::{Result, VisitrackError};

/// HTTP 响应（状态码 + 文本响应体）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpReply {
    pub status: u16,
    pub body: String,
}

impl HttpReply {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// 200 OK
    pub fn ok(body: impl Into<String>) -> Self {
        Self::new(200, body)
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[async_trait]
pub trait HttpClient: Send + Sync {
    /// GET 请求，非 2xx 状态码不视为错误，由调用方判断
    ///
    /// 到达 `deadline` 时底层请求必须被终止，而不只是停止等待。
    async fn get(&self, url: &str, deadline: Instant) -> Result<HttpReply>;

    /// POST JSON，忽略响应
    async fn post_json(&self, url: &str, body: &serde_json::Value) -> Result<()>;
}

/// 基于 ureq Agent 的 HTTP 客户端
///
/// `timeout_global` 覆盖整个请求（DNS、连接、读写）。GET 按调用方给出的
/// deadline 逐个请求设置剩余时间，上层超时放弃等待时，阻塞线程上的请求
/// 也在同一时刻被 ureq 终止并释放连接。Agent 级超时只作用于 POST。
#[derive(Clone)]
pub struct UreqClient {
    agent: Agent,
}

impl UreqClient {
    pub fn new(timeout: Duration) -> Self {
        let agent = Agent::config_builder()
            .timeout_global(Some(timeout))
            .http_status_as_error(false)
            .build()
            .into();

        Self { agent }
    }

    fn get_sync(agent: &Agent, url: &str, deadline: Instant) -> Result<HttpReply> {
        // 在阻塞线程上计算，线程池排队的时间也计入预算
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            return Err(VisitrackError::timeout(format!(
                "deadline passed before GET {}",
                url
            )));
        }

        let mut resp = agent
            .get(url)
            .config()
            .timeout_global(Some(remaining))
            .build()
            .call()?;
        let status = resp.status().as_u16();
        let body = resp.body_mut().read_to_string()?;

        trace!("GET {} -> {} ({} bytes)", url, status, body.len());
        Ok(HttpReply { status, body })
    }

    fn post_json_sync(agent: &Agent, url: &str, body: &serde_json::Value) -> Result<()> {
        let resp = agent.post(url).send_json(body)?;
        trace!("POST {} -> {}", url, resp.status().as_u16());
        Ok(())
    }
}

#[async_trait]
impl HttpClient for UreqClient {
    async fn get(&self, url: &str, deadline: Instant) -> Result<HttpReply> {
        let agent = self.agent.clone();
        let url = url.to_string();

        tokio::task::spawn_blocking(move || Self::get_sync(&agent, &url, deadline))
            .await
            .unwrap_or_else(|e| {
                warn!("HTTP spawn_blocking failed: {}", e);
                Err(VisitrackError::network(format!("request task failed: {}", e)))
            })
    }

    async fn post_json(&self, url: &str, body: &serde_json::Value) -> Result<()> {
        let agent = self.agent.clone();
        let url = url.to_string();
        let body = body.clone();

        tokio::task::spawn_blocking(move || Self::post_json_sync(&agent, &url, &body))
            .await
            .unwrap_or_else(|e| {
                warn!("HTTP spawn_blocking failed: {}", e);
                Err(VisitrackError::network(format!("request task failed: {}", e)))
            })
    }
}
