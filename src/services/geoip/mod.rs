//! GeoIP 服务模块
//!
//! 按优先级依次尝试外部 IP 定位 API，第一个成功的结果即为最终结果：
//! 1. ipapi.co
//! 2. ip-api.com
//! 3. ipify + ipwhois（两次请求）
//! 4. cloudflare trace（纯文本，兜底）
//!
//! 全部失败时返回字段均为 "Unknown" 的 fallback 记录。

mod catalog;
mod http;
pub mod parsers;
mod provider;
mod resolver;

pub use catalog::{HttpProvider, PROVIDERS, ProviderSpec, ResponseParser, catalog_providers};
pub use http::{HttpClient, HttpReply, UreqClient};
pub use parsers::{BodyFormat, ResponseBody};
pub use provider::{LocationProvider, LocationRecord, UNKNOWN};
pub use resolver::{DEFAULT_LOOKUP_TIMEOUT, LocationResolver, system_timezone};
