//! 测试共用的 mock 与样本数据

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{Value, json};

use visitrack::errors::{Result, VisitrackError};
use visitrack::services::geoip::{HttpClient, HttpReply, LocationProvider, LocationRecord};

pub const IPAPI_CO_URL: &str = "https://ipapi.co/json/";
pub const IP_API_COM_URL: &str = "http://ip-api.com/json/";
pub const IPIFY_URL: &str = "https://api.ipify.org?format=json";
pub const TRACE_URL: &str = "https://www.cloudflare.com/cdn-cgi/trace";

// =============================================================================
// 样本响应
// =============================================================================

pub fn ipapi_co_body() -> String {
    json!({
        "ip": "1.2.3.4",
        "city": "Testville",
        "region": "TS",
        "country_name": "Testland",
        "country_code": "TT",
        "latitude": 1.0,
        "longitude": 2.0,
        "timezone": "UTC",
        "org": "TestISP"
    })
    .to_string()
}

pub fn ipapi_co_record() -> LocationRecord {
    LocationRecord {
        ip: "1.2.3.4".to_string(),
        city: "Testville".to_string(),
        region: "TS".to_string(),
        country: "Testland".to_string(),
        country_code: "TT".to_string(),
        latitude: "1.0".to_string(),
        longitude: "2.0".to_string(),
        timezone: "UTC".to_string(),
        isp: "TestISP".to_string(),
    }
}

pub fn ip_api_com_body() -> String {
    json!({
        "status": "success",
        "query": "5.6.7.8",
        "city": "Second City",
        "regionName": "Second Region",
        "country": "Secondland",
        "countryCode": "SL",
        "lat": 10.5,
        "lon": -20.25,
        "timezone": "Europe/Lisbon",
        "isp": "Second ISP"
    })
    .to_string()
}

pub fn ip_api_com_record() -> LocationRecord {
    LocationRecord {
        ip: "5.6.7.8".to_string(),
        city: "Second City".to_string(),
        region: "Second Region".to_string(),
        country: "Secondland".to_string(),
        country_code: "SL".to_string(),
        latitude: "10.5".to_string(),
        longitude: "-20.25".to_string(),
        timezone: "Europe/Lisbon".to_string(),
        isp: "Second ISP".to_string(),
    }
}

pub fn record_with_ip(ip: &str) -> LocationRecord {
    LocationRecord {
        ip: ip.to_string(),
        ..Default::default()
    }
}

// =============================================================================
// Mock HTTP client
// =============================================================================

#[derive(Clone)]
enum Scripted {
    Reply(HttpReply),
    Delayed(Duration, HttpReply),
    Fail(VisitrackError),
}

/// 按 URL 返回预设响应；未配置的 URL 视为连接失败
#[derive(Default)]
pub struct MockHttpClient {
    routes: Mutex<HashMap<String, Scripted>>,
    calls: Mutex<Vec<String>>,
    posts: Mutex<Vec<(String, Value)>>,
    fail_posts: Mutex<bool>,
}

impl MockHttpClient {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn reply(self: Arc<Self>, url: &str, reply: HttpReply) -> Arc<Self> {
        self.routes
            .lock()
            .insert(url.to_string(), Scripted::Reply(reply));
        self
    }

    pub fn delayed(self: Arc<Self>, url: &str, delay: Duration, reply: HttpReply) -> Arc<Self> {
        self.routes
            .lock()
            .insert(url.to_string(), Scripted::Delayed(delay, reply));
        self
    }

    pub fn fail(self: Arc<Self>, url: &str, error: VisitrackError) -> Arc<Self> {
        self.routes
            .lock()
            .insert(url.to_string(), Scripted::Fail(error));
        self
    }

    pub fn fail_posts(self: Arc<Self>) -> Arc<Self> {
        *self.fail_posts.lock() = true;
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    pub fn posts(&self) -> Vec<(String, Value)> {
        self.posts.lock().clone()
    }
}

#[async_trait]
impl HttpClient for MockHttpClient {
    async fn get(&self, url: &str, _deadline: Instant) -> Result<HttpReply> {
        self.calls.lock().push(url.to_string());
        let scripted = self.routes.lock().get(url).cloned();

        match scripted {
            Some(Scripted::Reply(reply)) => Ok(reply),
            Some(Scripted::Delayed(delay, reply)) => {
                tokio::time::sleep(delay).await;
                Ok(reply)
            }
            Some(Scripted::Fail(error)) => Err(error),
            None => Err(VisitrackError::network(format!("connection refused: {}", url))),
        }
    }

    async fn post_json(&self, url: &str, body: &Value) -> Result<()> {
        self.posts.lock().push((url.to_string(), body.clone()));
        if *self.fail_posts.lock() {
            return Err(VisitrackError::network("sink unreachable"));
        }
        Ok(())
    }
}

// =============================================================================
// Mock provider
// =============================================================================

#[derive(Clone)]
pub enum Outcome {
    Succeed(LocationRecord),
    Fail(VisitrackError),
    SucceedAfter(Duration, LocationRecord),
}

/// 预设结果的 provider，调用记录写入共享日志
pub struct ScriptedProvider {
    name: String,
    outcome: Outcome,
    log: Arc<Mutex<Vec<String>>>,
}

impl ScriptedProvider {
    pub fn new(name: &str, outcome: Outcome, log: &Arc<Mutex<Vec<String>>>) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            outcome,
            log: log.clone(),
        })
    }
}

pub fn as_providers(list: Vec<Arc<ScriptedProvider>>) -> Vec<Arc<dyn LocationProvider>> {
    list.into_iter()
        .map(|p| p as Arc<dyn LocationProvider>)
        .collect()
}

#[async_trait]
impl LocationProvider for ScriptedProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn attempt(&self, _deadline: Instant) -> Result<LocationRecord> {
        self.log.lock().push(self.name.clone());
        match &self.outcome {
            Outcome::Succeed(record) => Ok(record.clone()),
            Outcome::Fail(error) => Err(error.clone()),
            Outcome::SucceedAfter(delay, record) => {
                tokio::time::sleep(*delay).await;
                Ok(record.clone())
            }
        }
    }
}
