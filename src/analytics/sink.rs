use std::sync::Arc;
use std::time::Duration;

use tracing::trace;

use super::VisitorRecord;
use crate::errors::VisitrackError;
use crate::services::geoip::{HttpClient, UreqClient};

/// 访客记录 Sink
#[async_trait::async_trait]
pub trait VisitorSink: Send + Sync {
    /// 发送单条访客记录
    async fn send(&self, record: &VisitorRecord) -> anyhow::Result<()>;

    /// 获取 sink 名称（用于日志）
    fn name(&self) -> &'static str;
}

/// 通过 HTTP POST 上报（不读取响应）
pub struct HttpSink {
    url: String,
    client: Arc<dyn HttpClient>,
}

impl HttpSink {
    pub fn new(url: impl Into<String>, client: Arc<dyn HttpClient>) -> Self {
        Self {
            url: url.into(),
            client,
        }
    }

    /// 校验上报地址并使用 ureq 客户端
    pub fn from_url(url: &str, timeout: Duration) -> Result<Self, VisitrackError> {
        let parsed = url::Url::parse(url)
            .map_err(|e| VisitrackError::validation(format!("Invalid sink URL '{}': {}", url, e)))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(VisitrackError::validation(format!(
                "Sink URL must be http or https: {}",
                url
            )));
        }

        Ok(Self::new(parsed.as_str(), Arc::new(UreqClient::new(timeout))))
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait::async_trait]
impl VisitorSink for HttpSink {
    async fn send(&self, record: &VisitorRecord) -> anyhow::Result<()> {
        let body = serde_json::to_value(record)?;
        trace!("Posting visitor record to {}", self.url);
        self.client.post_json(&self.url, &body).await?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "http"
    }
}

pub struct StdoutSink;

#[async_trait::async_trait]
impl VisitorSink for StdoutSink {
    async fn send(&self, record: &VisitorRecord) -> anyhow::Result<()> {
        println!("{}", serde_json::to_string_pretty(record)?);
        Ok(())
    }

    fn name(&self) -> &'static str {
        "stdout"
    }
}
