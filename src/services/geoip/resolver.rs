//! 位置查询 fallback 链
//!
//! 严格按顺序逐个尝试 provider（不并发），第一个成功者直接返回；
//! 每次尝试都有独立的超时，超时即丢弃该次请求。

use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use super::catalog::catalog_providers;
use super::http::UreqClient;
use super::provider::{LocationProvider, LocationRecord};

/// 单个 provider 的默认超时
pub const DEFAULT_LOOKUP_TIMEOUT: Duration = Duration::from_millis(5000);

/// 本机 IANA 时区名
pub fn system_timezone() -> Option<String> {
    match iana_time_zone::get_timezone() {
        Ok(tz) if !tz.trim().is_empty() => Some(tz),
        Ok(_) => None,
        Err(e) => {
            debug!("Local timezone is not resolvable: {}", e);
            None
        }
    }
}

#[derive(Clone)]
pub struct LocationResolver {
    providers: Vec<Arc<dyn LocationProvider>>,
    timeout: Duration,
    local_timezone: Option<String>,
}

impl LocationResolver {
    pub fn new(providers: Vec<Arc<dyn LocationProvider>>, timeout: Duration) -> Self {
        Self {
            providers,
            timeout,
            local_timezone: system_timezone(),
        }
    }

    /// 使用内置 provider 列表和 ureq 客户端
    ///
    /// 客户端的全局超时与单次尝试超时一致，超时后底层请求随之终止。
    pub fn with_default_providers(timeout: Duration) -> Self {
        let client = Arc::new(UreqClient::new(timeout));
        Self::new(catalog_providers(client), timeout)
    }

    /// 覆盖 fallback 记录使用的本机时区
    pub fn with_local_timezone(mut self, timezone: Option<String>) -> Self {
        self.local_timezone = timezone;
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn provider_names(&self) -> Vec<&str> {
        self.providers.iter().map(|p| p.name()).collect()
    }

    /// 查询访客位置，永不失败
    pub async fn resolve(&self) -> LocationRecord {
        for provider in &self.providers {
            let name = provider.name();
            debug!("Trying {}...", name);

            // 超时后 attempt future 被 drop，迟到的结果不会被采用；
            // 同一 deadline 也传给 HTTP 层，阻塞线程上的请求同时被终止
            let deadline = Instant::now() + self.timeout;
            match tokio::time::timeout(self.timeout, provider.attempt(deadline)).await {
                Ok(Ok(record)) => {
                    info!("Successfully retrieved location data from {}", name);
                    return record;
                }
                Ok(Err(e)) => {
                    warn!("{} failed: {}", name, e);
                }
                Err(_) => {
                    warn!(
                        "{} failed: no response within {}ms",
                        name,
                        self.timeout.as_millis()
                    );
                }
            }
        }

        warn!("All location providers failed, using fallback data");
        LocationRecord::fallback(self.local_timezone.clone())
    }
}
