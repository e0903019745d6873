pub mod reporter;
pub mod sink;

pub use reporter::{DEFAULT_REPORT_DELAY, VisitorReporter};
pub use sink::{HttpSink, StdoutSink, VisitorSink};

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::VisitrackError;
use crate::services::geoip::{LocationRecord, UNKNOWN};

/// 无来源页面时的 referrer
pub const DIRECT_REFERRER: &str = "Direct";

/// 屏幕尺寸，格式 `<width>x<height>`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenSize {
    pub width: u32,
    pub height: u32,
}

impl fmt::Display for ScreenSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

impl FromStr for ScreenSize {
    type Err = VisitrackError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || {
            VisitrackError::validation(format!(
                "Invalid screen size: '{}'. Expected <width>x<height>, e.g. 1920x1080",
                s
            ))
        };

        let (width, height) = s.trim().split_once(['x', 'X']).ok_or_else(invalid)?;
        Ok(Self {
            width: width.trim().parse().map_err(|_| invalid())?,
            height: height.trim().parse().map_err(|_| invalid())?,
        })
    }
}

/// 访客上下文（由调用方提供）
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VisitorContext {
    pub user_agent: String,
    pub language: String,
    pub screen: Option<ScreenSize>,
    pub referrer: String,
    pub page_url: String,
}

impl VisitorContext {
    pub fn new(page_url: impl Into<String>) -> Self {
        Self {
            page_url: page_url.into(),
            ..Default::default()
        }
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    pub fn with_screen(mut self, screen: Option<ScreenSize>) -> Self {
        self.screen = screen;
        self
    }

    pub fn with_referrer(mut self, referrer: impl Into<String>) -> Self {
        self.referrer = referrer.into();
        self
    }
}

/// 上报给 sink 的访客记录
///
/// 字段顺序与 JSON 键名和表格列保持一致。反序列化时缺失的键为空字符串。
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VisitorRecord {
    pub timestamp: String,
    pub ip: String,
    pub city: String,
    pub region: String,
    pub country: String,
    pub country_code: String,
    pub latitude: String,
    pub longitude: String,
    pub timezone: String,
    pub isp: String,
    pub user_agent: String,
    pub language: String,
    pub screen_resolution: String,
    pub referrer: String,
    pub page_url: String,
}

impl VisitorRecord {
    /// 合并位置信息与访客上下文
    ///
    /// 位置字段为空时一律替换为 "Unknown"，与 resolver 自身的 fallback 无关。
    pub fn build(location: LocationRecord, context: &VisitorContext, now: DateTime<Utc>) -> Self {
        let location = location.with_unknown_defaults();
        let or = |value: &str, default: &str| {
            if value.is_empty() {
                default.to_string()
            } else {
                value.to_string()
            }
        };

        Self {
            timestamp: now.to_rfc3339_opts(SecondsFormat::Millis, true),
            ip: location.ip,
            city: location.city,
            region: location.region,
            country: location.country,
            country_code: location.country_code,
            latitude: location.latitude,
            longitude: location.longitude,
            timezone: location.timezone,
            isp: location.isp,
            user_agent: context.user_agent.clone(),
            language: or(&context.language, UNKNOWN),
            screen_resolution: context
                .screen
                .map(|s| s.to_string())
                .unwrap_or_else(|| UNKNOWN.to_string()),
            referrer: or(&context.referrer, DIRECT_REFERRER),
            page_url: context.page_url.clone(),
        }
    }
}
