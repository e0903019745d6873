//! 各 provider 响应体的归一化
//!
//! 纯函数，不涉及网络与超时，方便用固定样本测试。
//! 字符串原样保留，非零数字按 JSON 文本形式保留（1.0 → "1.0"），
//! 0、布尔、null、缺失及其他类型一律为空字符串。

use std::collections::HashMap;
use std::net::IpAddr;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use super::provider::{LocationRecord, UNKNOWN};
use crate::errors::{Result, VisitrackError};

/// 响应体格式
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display, strum::AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum BodyFormat {
    Json,
    Text,
}

/// 按声明格式读取后的响应体
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    Json(Value),
    Text(String),
}

impl ResponseBody {
    pub fn read(raw: String, format: BodyFormat) -> Result<Self> {
        match format {
            BodyFormat::Json => serde_json::from_str(&raw)
                .map(ResponseBody::Json)
                .map_err(|e| VisitrackError::parse(format!("malformed JSON body: {}", e))),
            BodyFormat::Text => Ok(ResponseBody::Text(raw)),
        }
    }

    fn decode<T: DeserializeOwned>(&self) -> Result<T> {
        match self {
            ResponseBody::Json(value) => T::deserialize(value)
                .map_err(|e| VisitrackError::parse(format!("unexpected JSON shape: {}", e))),
            ResponseBody::Text(_) => Err(VisitrackError::parse("expected a JSON body, got text")),
        }
    }

    fn text(&self) -> Result<&str> {
        match self {
            ResponseBody::Text(text) => Ok(text),
            ResponseBody::Json(_) => Err(VisitrackError::parse("expected a text body, got JSON")),
        }
    }
}

fn lenient_string<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => s,
        // 数值 0 与缺失同等对待，合并时变为 "Unknown"
        Some(Value::Number(n)) if n.as_f64() == Some(0.0) => String::new(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    })
}

// ============== ipapi.co ==============

#[derive(Deserialize)]
struct IpapiCoBody {
    #[serde(default, deserialize_with = "lenient_string")]
    ip: String,
    #[serde(default, deserialize_with = "lenient_string")]
    city: String,
    #[serde(default, deserialize_with = "lenient_string")]
    region: String,
    #[serde(default, deserialize_with = "lenient_string")]
    country_name: String,
    #[serde(default, deserialize_with = "lenient_string")]
    country_code: String,
    #[serde(default, deserialize_with = "lenient_string")]
    latitude: String,
    #[serde(default, deserialize_with = "lenient_string")]
    longitude: String,
    #[serde(default, deserialize_with = "lenient_string")]
    timezone: String,
    #[serde(default, deserialize_with = "lenient_string")]
    org: String,
    // 限流等错误时返回 {"error": true, "reason": "..."}
    #[serde(default)]
    error: Option<Value>,
    #[serde(default, deserialize_with = "lenient_string")]
    reason: String,
}

pub fn parse_ipapi_co(body: &ResponseBody) -> Result<LocationRecord> {
    let data: IpapiCoBody = body.decode()?;
    if data.error == Some(Value::Bool(true)) {
        return Err(VisitrackError::parse(format!(
            "ipapi.co reported an error: {}",
            data.reason
        )));
    }

    Ok(LocationRecord {
        ip: data.ip,
        city: data.city,
        region: data.region,
        country: data.country_name,
        country_code: data.country_code,
        latitude: data.latitude,
        longitude: data.longitude,
        timezone: data.timezone,
        isp: data.org,
    })
}

// ============== ip-api.com ==============

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct IpApiComBody {
    #[serde(default, deserialize_with = "lenient_string")]
    query: String,
    #[serde(default, deserialize_with = "lenient_string")]
    city: String,
    #[serde(default, deserialize_with = "lenient_string")]
    region_name: String,
    #[serde(default, deserialize_with = "lenient_string")]
    country: String,
    #[serde(default, deserialize_with = "lenient_string")]
    country_code: String,
    #[serde(default, deserialize_with = "lenient_string")]
    lat: String,
    #[serde(default, deserialize_with = "lenient_string")]
    lon: String,
    #[serde(default, deserialize_with = "lenient_string")]
    timezone: String,
    #[serde(default, deserialize_with = "lenient_string")]
    isp: String,
    // 失败时返回: {"status": "fail", "message": "..."}
    #[serde(default, deserialize_with = "lenient_string")]
    status: String,
    #[serde(default, deserialize_with = "lenient_string")]
    message: String,
}

pub fn parse_ip_api_com(body: &ResponseBody) -> Result<LocationRecord> {
    let data: IpApiComBody = body.decode()?;
    if data.status == "fail" {
        return Err(VisitrackError::parse(format!(
            "ip-api.com returned fail status: {}",
            data.message
        )));
    }

    Ok(LocationRecord {
        ip: data.query,
        city: data.city,
        region: data.region_name,
        country: data.country,
        country_code: data.country_code,
        latitude: data.lat,
        longitude: data.lon,
        timezone: data.timezone,
        isp: data.isp,
    })
}

// ============== ipify + ipwhois ==============

#[derive(Deserialize)]
struct IpifyBody {
    #[serde(default, deserialize_with = "lenient_string")]
    ip: String,
}

/// 从 ipify 响应中取出 IP，生成 ipwhois 查询地址
pub fn ipwhois_url_from_ipify(body: &ResponseBody) -> Result<String> {
    let data: IpifyBody = body.decode()?;
    let ip: IpAddr = data
        .ip
        .trim()
        .parse()
        .map_err(|_| VisitrackError::parse(format!("ipify returned no usable IP: {:?}", data.ip)))?;

    Ok(format!("https://ipwhois.app/json/{}", ip))
}

#[derive(Deserialize)]
struct IpwhoisBody {
    #[serde(default, deserialize_with = "lenient_string")]
    ip: String,
    #[serde(default, deserialize_with = "lenient_string")]
    city: String,
    #[serde(default, deserialize_with = "lenient_string")]
    region: String,
    #[serde(default, deserialize_with = "lenient_string")]
    country: String,
    #[serde(default, deserialize_with = "lenient_string")]
    country_code: String,
    #[serde(default, deserialize_with = "lenient_string")]
    latitude: String,
    #[serde(default, deserialize_with = "lenient_string")]
    longitude: String,
    #[serde(default, deserialize_with = "lenient_string")]
    timezone: String,
    #[serde(default, deserialize_with = "lenient_string")]
    isp: String,
    #[serde(default)]
    success: Option<Value>,
    #[serde(default, deserialize_with = "lenient_string")]
    message: String,
}

pub fn parse_ipwhois(body: &ResponseBody) -> Result<LocationRecord> {
    let data: IpwhoisBody = body.decode()?;
    if data.success == Some(Value::Bool(false)) {
        return Err(VisitrackError::parse(format!(
            "ipwhois reported failure: {}",
            data.message
        )));
    }

    Ok(LocationRecord {
        ip: data.ip,
        city: data.city,
        region: data.region,
        country: data.country,
        country_code: data.country_code,
        latitude: data.latitude,
        longitude: data.longitude,
        timezone: data.timezone,
        isp: data.isp,
    })
}

// ============== cloudflare trace ==============

/// 解析 `key=value` 每行一条的 trace 文本
///
/// 只能得到 IP 和国家代码（`loc`），其余字段固定为 "Unknown"。
pub fn parse_cloudflare_trace(body: &ResponseBody) -> Result<LocationRecord> {
    let pairs: HashMap<&str, &str> = body
        .text()?
        .lines()
        .filter_map(|line| {
            let (key, value) = line.split_once('=')?;
            let (key, value) = (key.trim(), value.trim());
            (!key.is_empty() && !value.is_empty()).then_some((key, value))
        })
        .collect();

    let unknown = || UNKNOWN.to_string();
    Ok(LocationRecord {
        ip: pairs.get("ip").map(|s| s.to_string()).unwrap_or_default(),
        city: unknown(),
        region: unknown(),
        country: unknown(),
        country_code: pairs.get("loc").map(|s| s.to_string()).unwrap_or_else(unknown),
        latitude: unknown(),
        longitude: unknown(),
        timezone: unknown(),
        isp: unknown(),
    })
}
