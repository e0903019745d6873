//! 访客上报
//!
//! 一次上报 = 查询位置 + 合并上下文 + 单次 POST。
//! 结果不返回给调用方，失败只记录日志，不重试。

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use super::sink::VisitorSink;
use super::{VisitorContext, VisitorRecord};
use crate::services::geoip::LocationResolver;

/// 默认上报延迟
pub const DEFAULT_REPORT_DELAY: Duration = Duration::from_millis(1000);

#[derive(Clone)]
pub struct VisitorReporter {
    resolver: Arc<LocationResolver>,
    sink: Arc<dyn VisitorSink>,
    delay: Duration,
}

impl VisitorReporter {
    pub fn new(resolver: Arc<LocationResolver>, sink: Arc<dyn VisitorSink>) -> Self {
        Self {
            resolver,
            sink,
            delay: DEFAULT_REPORT_DELAY,
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// 立即上报一次
    pub async fn report(&self, context: VisitorContext) {
        let location = self.resolver.resolve().await;
        let record = VisitorRecord::build(location, &context, Utc::now());

        match self.sink.send(&record).await {
            Ok(()) => {
                info!("Visitor tracked via {} sink", self.sink.name());
                debug!("Visitor record: {:?}", record);
            }
            Err(e) => {
                error!(
                    "Error sending visitor record to {} sink: {}",
                    self.sink.name(),
                    e
                );
            }
        }
    }

    /// 延迟后在后台上报，调用方可以忽略返回的句柄
    pub fn spawn(&self, context: VisitorContext) -> JoinHandle<()> {
        let reporter = self.clone();
        tokio::spawn(async move {
            if !reporter.delay.is_zero() {
                tokio::time::sleep(reporter.delay).await;
            }
            reporter.report(context).await;
        })
    }
}
