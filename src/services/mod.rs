//! 业务服务层
//!
//! - `geoip`: 访客位置查询（多 provider fallback 链）

pub mod geoip;

pub use geoip::{
    HttpClient, LocationProvider, LocationRecord, LocationResolver, PROVIDERS, UNKNOWN,
    UreqClient,
};
