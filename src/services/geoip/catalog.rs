//! 内置 provider 列表
//!
//! 顺序即优先级：结构化的 GeoIP API 在前，cloudflare trace 兜底。

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use tracing::trace;

use super::http::HttpClient;
use super::parsers::{self, BodyFormat, ResponseBody};
use super::provider::{LocationProvider, LocationRecord};
use crate::errors::{Result, VisitrackError};

pub type ParseFn = fn(&ResponseBody) -> Result<LocationRecord>;
pub type FollowUpFn = fn(&ResponseBody) -> Result<String>;

/// 响应解析方式
#[derive(Clone, Copy)]
pub enum ResponseParser {
    /// 直接从响应体解析
    Direct(ParseFn),
    /// 先从响应体得到二次请求地址，再解析二次请求的 JSON 响应
    FollowUp { next_url: FollowUpFn, parse: ParseFn },
}

/// 单个 provider 的静态描述
pub struct ProviderSpec {
    pub name: &'static str,
    pub url: &'static str,
    pub format: BodyFormat,
    pub parser: ResponseParser,
}

impl fmt::Debug for ProviderSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderSpec")
            .field("name", &self.name)
            .field("url", &self.url)
            .field("format", &self.format)
            .finish()
    }
}

pub static PROVIDERS: [ProviderSpec; 4] = [
    ProviderSpec {
        name: "ipapi.co",
        url: "https://ipapi.co/json/",
        format: BodyFormat::Json,
        parser: ResponseParser::Direct(parsers::parse_ipapi_co),
    },
    ProviderSpec {
        name: "ip-api.com",
        url: "http://ip-api.com/json/",
        format: BodyFormat::Json,
        parser: ResponseParser::Direct(parsers::parse_ip_api_com),
    },
    ProviderSpec {
        name: "ipify + ipwhois",
        url: "https://api.ipify.org?format=json",
        format: BodyFormat::Json,
        parser: ResponseParser::FollowUp {
            next_url: parsers::ipwhois_url_from_ipify,
            parse: parsers::parse_ipwhois,
        },
    },
    ProviderSpec {
        name: "cloudflare-trace",
        url: "https://www.cloudflare.com/cdn-cgi/trace",
        format: BodyFormat::Text,
        parser: ResponseParser::Direct(parsers::parse_cloudflare_trace),
    },
];

/// 通过 HTTP 查询的 provider
pub struct HttpProvider {
    spec: &'static ProviderSpec,
    client: Arc<dyn HttpClient>,
}

impl HttpProvider {
    pub fn new(spec: &'static ProviderSpec, client: Arc<dyn HttpClient>) -> Self {
        Self { spec, client }
    }

    async fn fetch(
        &self,
        url: &str,
        format: BodyFormat,
        deadline: Instant,
    ) -> Result<ResponseBody> {
        let reply = self.client.get(url, deadline).await?;
        if !reply.is_success() {
            return Err(VisitrackError::network(format!(
                "{} returned HTTP {}",
                url, reply.status
            )));
        }

        ResponseBody::read(reply.body, format)
    }
}

#[async_trait]
impl LocationProvider for HttpProvider {
    fn name(&self) -> &str {
        self.spec.name
    }

    async fn attempt(&self, deadline: Instant) -> Result<LocationRecord> {
        let body = self.fetch(self.spec.url, self.spec.format, deadline).await?;

        match self.spec.parser {
            ResponseParser::Direct(parse) => parse(&body),
            ResponseParser::FollowUp { next_url, parse } => {
                let url = next_url(&body)?;
                trace!("{}: follow-up request to {}", self.spec.name, url);
                // 二次请求只剩下本次尝试未用完的时间
                let secondary = self.fetch(&url, BodyFormat::Json, deadline).await?;
                parse(&secondary)
            }
        }
    }
}

/// 按内置顺序构造全部 provider
pub fn catalog_providers(client: Arc<dyn HttpClient>) -> Vec<Arc<dyn LocationProvider>> {
    PROVIDERS
        .iter()
        .map(|spec| Arc::new(HttpProvider::new(spec, client.clone())) as Arc<dyn LocationProvider>)
        .collect()
}
