//! GeoIP Provider 抽象层
//!
//! 统一的位置查询接口：每个 provider 只暴露一次 `attempt(deadline)`，
//! 由 `LocationResolver` 负责顺序、超时与 fallback。

use std::time::Instant;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::errors::Result;

/// 缺失字段的占位值
pub const UNKNOWN: &str = "Unknown";

/// 访客位置信息
///
/// 所有字段始终存在。provider 无法给出的字段为空字符串，
/// 上报前由 [`LocationRecord::with_unknown_defaults`] 统一替换为 "Unknown"。
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LocationRecord {
    pub ip: String,
    pub city: String,
    pub region: String,
    pub country: String,
    /// ISO 3166-1 alpha-2 国家代码 (e.g., "CN", "US")
    pub country_code: String,
    pub latitude: String,
    pub longitude: String,
    /// IANA 时区名 (e.g., "Asia/Shanghai")
    pub timezone: String,
    pub isp: String,
}

impl LocationRecord {
    /// 所有 provider 都失败时的记录
    ///
    /// 除 timezone 外全部为 "Unknown"；timezone 取本机时区（可解析时）。
    pub fn fallback(local_timezone: Option<String>) -> Self {
        Self {
            ip: UNKNOWN.to_string(),
            city: UNKNOWN.to_string(),
            region: UNKNOWN.to_string(),
            country: UNKNOWN.to_string(),
            country_code: UNKNOWN.to_string(),
            latitude: UNKNOWN.to_string(),
            longitude: UNKNOWN.to_string(),
            timezone: local_timezone
                .filter(|tz| !tz.trim().is_empty())
                .unwrap_or_else(|| UNKNOWN.to_string()),
            isp: UNKNOWN.to_string(),
        }
    }

    /// 将空字段替换为 "Unknown"，其余字段保持不变
    pub fn with_unknown_defaults(mut self) -> Self {
        for field in self.fields_mut() {
            if field.is_empty() {
                *field = UNKNOWN.to_string();
            }
        }
        self
    }

    fn fields_mut(&mut self) -> [&mut String; 9] {
        [
            &mut self.ip,
            &mut self.city,
            &mut self.region,
            &mut self.country,
            &mut self.country_code,
            &mut self.latitude,
            &mut self.longitude,
            &mut self.timezone,
            &mut self.isp,
        ]
    }
}

/// 位置查询 trait
#[async_trait]
pub trait LocationProvider: Send + Sync {
    /// 获取 provider 名称（用于日志）
    fn name(&self) -> &str;

    /// 尝试一次查询
    ///
    /// 网络错误、非 2xx、响应体无法解析都以 `Err` 返回。
    /// 本次尝试发出的所有请求（包括二次请求）共享同一个 `deadline`，
    /// 到期后调用方会 drop 这个 future。
    async fn attempt(&self, deadline: Instant) -> Result<LocationRecord>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_keeps_local_timezone() {
        let record = LocationRecord::fallback(Some("Europe/Berlin".to_string()));
        assert_eq!(record.timezone, "Europe/Berlin");
        assert_eq!(record.ip, UNKNOWN);
        assert_eq!(record.isp, UNKNOWN);
    }

    #[test]
    fn test_fallback_without_timezone() {
        let record = LocationRecord::fallback(None);
        assert_eq!(record, LocationRecord::fallback(Some("  ".to_string())));
        assert_eq!(record.timezone, UNKNOWN);
    }

    #[test]
    fn test_unknown_defaults_only_touch_empty_fields() {
        let record = LocationRecord {
            ip: "1.2.3.4".to_string(),
            city: String::new(),
            region: " ".to_string(),
            country_code: "TT".to_string(),
            latitude: "0".to_string(),
            ..Default::default()
        }
        .with_unknown_defaults();

        assert_eq!(record.ip, "1.2.3.4");
        assert_eq!(record.city, UNKNOWN);
        assert_eq!(record.region, " ");
        assert_eq!(record.country, UNKNOWN);
        assert_eq!(record.country_code, "TT");
        assert_eq!(record.latitude, "0");
        assert_eq!(record.isp, UNKNOWN);
    }

    #[test]
    fn test_serializes_with_camel_case_keys() {
        let json = serde_json::to_value(LocationRecord::fallback(None)).unwrap();
        assert_eq!(json["countryCode"], UNKNOWN);
        assert!(json.get("country_code").is_none());
    }
}
