//! LocationResolver 集成测试
//!
//! 覆盖 provider 顺序、首个成功即返回、超时丢弃、全部失败 fallback，
//! 以及基于内置 provider 列表 + mock HTTP 的端到端场景。

mod common;

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use serde_json::json;
use tokio::time::Instant;

use common::*;
use visitrack::errors::VisitrackError;
use visitrack::services::geoip::{
    DEFAULT_LOOKUP_TIMEOUT, HttpReply, LocationRecord, LocationResolver, UNKNOWN,
    catalog_providers,
};

fn catalog_resolver(client: Arc<MockHttpClient>, timezone: Option<&str>) -> LocationResolver {
    LocationResolver::new(catalog_providers(client), DEFAULT_LOOKUP_TIMEOUT)
        .with_local_timezone(timezone.map(String::from))
}

// =============================================================================
// 顺序与短路
// =============================================================================

#[cfg(test)]
mod ordering_tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_first_success_wins_and_earlier_providers_run_once() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let providers = as_providers(vec![
            ScriptedProvider::new(
                "p0",
                Outcome::Fail(VisitrackError::network("connection reset")),
                &log,
            ),
            ScriptedProvider::new(
                "p1",
                Outcome::Fail(VisitrackError::parse("unexpected JSON shape")),
                &log,
            ),
            ScriptedProvider::new("p2", Outcome::Succeed(record_with_ip("2.2.2.2")), &log),
            ScriptedProvider::new("p3", Outcome::Succeed(record_with_ip("3.3.3.3")), &log),
        ]);

        let resolver = LocationResolver::new(providers, DEFAULT_LOOKUP_TIMEOUT);
        let record = resolver.resolve().await;

        assert_eq!(record, record_with_ip("2.2.2.2"));
        assert_eq!(*log.lock(), vec!["p0", "p1", "p2"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_provider_success_skips_the_rest() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let providers = as_providers(vec![
            ScriptedProvider::new("p0", Outcome::Succeed(ipapi_co_record()), &log),
            ScriptedProvider::new("p1", Outcome::Succeed(record_with_ip("9.9.9.9")), &log),
        ]);

        let record = LocationResolver::new(providers, DEFAULT_LOOKUP_TIMEOUT)
            .resolve()
            .await;

        assert_eq!(record, ipapi_co_record());
        assert_eq!(*log.lock(), vec!["p0"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_resolving_twice_yields_identical_records() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let providers = as_providers(vec![
            ScriptedProvider::new("p0", Outcome::Fail(VisitrackError::network("down")), &log),
            ScriptedProvider::new("p1", Outcome::Succeed(ip_api_com_record()), &log),
        ]);
        let resolver = LocationResolver::new(providers, DEFAULT_LOOKUP_TIMEOUT);

        let first = resolver.resolve().await;
        let second = resolver.resolve().await;

        assert_eq!(first, second);
        assert_eq!(*log.lock(), vec!["p0", "p1", "p0", "p1"]);
    }

    #[tokio::test]
    async fn test_provider_names_follow_catalog_order() {
        let resolver = catalog_resolver(MockHttpClient::new(), None);
        assert_eq!(
            resolver.provider_names(),
            vec!["ipapi.co", "ip-api.com", "ipify + ipwhois", "cloudflare-trace"]
        );
        assert_eq!(resolver.timeout(), Duration::from_millis(5000));
    }
}

// =============================================================================
// 超时
// =============================================================================

#[cfg(test)]
mod timeout_tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_late_response_is_discarded() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let providers = as_providers(vec![
            ScriptedProvider::new(
                "slow",
                Outcome::SucceedAfter(Duration::from_millis(5001), record_with_ip("6.6.6.6")),
                &log,
            ),
            ScriptedProvider::new("fast", Outcome::Succeed(record_with_ip("7.7.7.7")), &log),
        ]);

        let start = Instant::now();
        let record = LocationResolver::new(providers, DEFAULT_LOOKUP_TIMEOUT)
            .resolve()
            .await;

        assert_eq!(record, record_with_ip("7.7.7.7"));
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_millis(5000));
        assert!(elapsed < Duration::from_millis(5100));
    }

    #[tokio::test(start_paused = true)]
    async fn test_response_just_inside_budget_is_used() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let providers = as_providers(vec![ScriptedProvider::new(
            "almost",
            Outcome::SucceedAfter(Duration::from_millis(4999), record_with_ip("8.8.4.4")),
            &log,
        )]);

        let record = LocationResolver::new(providers, DEFAULT_LOOKUP_TIMEOUT)
            .resolve()
            .await;
        assert_eq!(record.ip, "8.8.4.4");
    }

    #[tokio::test(start_paused = true)]
    async fn test_every_provider_timing_out_returns_fallback() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let providers = as_providers(vec![
            ScriptedProvider::new(
                "a",
                Outcome::SucceedAfter(Duration::from_secs(60), record_with_ip("1.1.1.1")),
                &log,
            ),
            ScriptedProvider::new(
                "b",
                Outcome::SucceedAfter(Duration::from_secs(60), record_with_ip("1.0.0.1")),
                &log,
            ),
        ]);

        let start = Instant::now();
        let record = LocationResolver::new(providers, DEFAULT_LOOKUP_TIMEOUT)
            .with_local_timezone(Some("Asia/Tokyo".to_string()))
            .resolve()
            .await;

        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_millis(10_000));
        assert!(elapsed < Duration::from_secs(60));
        assert_eq!(record, LocationRecord::fallback(Some("Asia/Tokyo".to_string())));
    }
}

// =============================================================================
// 端到端：内置 provider + mock HTTP
// =============================================================================

#[cfg(test)]
mod catalog_tests {
    use super::*;

    #[tokio::test]
    async fn test_ipapi_co_success() {
        let client = MockHttpClient::new().reply(IPAPI_CO_URL, HttpReply::ok(ipapi_co_body()));

        let record = catalog_resolver(client.clone(), None).resolve().await;

        assert_eq!(record, ipapi_co_record());
        assert_eq!(client.calls(), vec![IPAPI_CO_URL]);
    }

    #[tokio::test]
    async fn test_all_providers_network_errors_return_fallback() {
        let client = MockHttpClient::new()
            .fail(IPAPI_CO_URL, VisitrackError::network("dns failure"))
            .fail(IP_API_COM_URL, VisitrackError::network("dns failure"))
            .fail(IPIFY_URL, VisitrackError::network("dns failure"))
            .fail(TRACE_URL, VisitrackError::network("dns failure"));

        let record = catalog_resolver(client.clone(), Some("UTC")).resolve().await;

        assert_eq!(
            record,
            LocationRecord {
                ip: UNKNOWN.to_string(),
                city: UNKNOWN.to_string(),
                region: UNKNOWN.to_string(),
                country: UNKNOWN.to_string(),
                country_code: UNKNOWN.to_string(),
                latitude: UNKNOWN.to_string(),
                longitude: UNKNOWN.to_string(),
                timezone: "UTC".to_string(),
                isp: UNKNOWN.to_string(),
            }
        );
        // ipify 失败后不会发起 ipwhois 二次请求
        assert_eq!(
            client.calls(),
            vec![IPAPI_CO_URL, IP_API_COM_URL, IPIFY_URL, TRACE_URL]
        );
    }

    #[tokio::test]
    async fn test_fallback_without_local_timezone() {
        let record = catalog_resolver(MockHttpClient::new(), None).resolve().await;
        assert_eq!(record, LocationRecord::fallback(None));
        assert_eq!(record.timezone, UNKNOWN);
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_provider_timeout_then_ip_api_com() {
        let client = MockHttpClient::new()
            .delayed(
                IPAPI_CO_URL,
                Duration::from_secs(30),
                HttpReply::ok(ipapi_co_body()),
            )
            .reply(IP_API_COM_URL, HttpReply::ok(ip_api_com_body()));

        let start = Instant::now();
        let record = catalog_resolver(client.clone(), None).resolve().await;

        assert_eq!(record, ip_api_com_record());
        assert!(start.elapsed() >= Duration::from_millis(5000));
        assert_eq!(client.calls(), vec![IPAPI_CO_URL, IP_API_COM_URL]);
    }

    #[tokio::test]
    async fn test_non_success_status_moves_to_next_provider() {
        let client = MockHttpClient::new()
            .reply(
                IPAPI_CO_URL,
                HttpReply::new(429, r#"{"error": true, "reason": "RateLimited"}"#),
            )
            .reply(IP_API_COM_URL, HttpReply::ok(ip_api_com_body()));

        let record = catalog_resolver(client, None).resolve().await;
        assert_eq!(record, ip_api_com_record());
    }

    #[tokio::test]
    async fn test_empty_success_body_does_not_break_the_chain() {
        let client = MockHttpClient::new()
            .reply(IPAPI_CO_URL, HttpReply::ok(""))
            .reply(IP_API_COM_URL, HttpReply::ok("<html>oops</html>"))
            .reply(TRACE_URL, HttpReply::ok("ip=203.0.113.9\nloc=DE\n"));

        let record = catalog_resolver(client, None).resolve().await;

        assert_eq!(record.ip, "203.0.113.9");
        assert_eq!(record.country_code, "DE");
        assert_eq!(record.city, UNKNOWN);
    }

    #[tokio::test]
    async fn test_partial_body_is_a_success_with_empty_fields() {
        let client = MockHttpClient::new()
            .reply(IPAPI_CO_URL, HttpReply::ok(json!({"ip": "4.4.4.4"}).to_string()));

        let record = catalog_resolver(client, None).resolve().await;

        assert_eq!(record.ip, "4.4.4.4");
        assert_eq!(record.city, "");
        // 合并阶段才会补 "Unknown"
        assert_eq!(record.with_unknown_defaults().city, UNKNOWN);
    }

    #[tokio::test]
    async fn test_ipify_follow_up_to_ipwhois() {
        let client = MockHttpClient::new()
            .reply(IPAPI_CO_URL, HttpReply::new(503, ""))
            .reply(
                IP_API_COM_URL,
                HttpReply::ok(json!({"status": "fail", "message": "quota"}).to_string()),
            )
            .reply(IPIFY_URL, HttpReply::ok(r#"{"ip":"1.2.3.4"}"#))
            .reply(
                "https://ipwhois.app/json/1.2.3.4",
                HttpReply::ok(
                    json!({
                        "ip": "1.2.3.4",
                        "success": true,
                        "city": "Whoisville",
                        "region": "WR",
                        "country": "Whoisland",
                        "country_code": "WL",
                        "latitude": 3.5,
                        "longitude": 4.5,
                        "timezone": "Pacific/Auckland",
                        "isp": "Whois ISP"
                    })
                    .to_string(),
                ),
            );

        let record = catalog_resolver(client.clone(), None).resolve().await;

        assert_eq!(record.city, "Whoisville");
        assert_eq!(record.country_code, "WL");
        assert_eq!(record.latitude, "3.5");
        assert_eq!(
            client.calls(),
            vec![
                IPAPI_CO_URL,
                IP_API_COM_URL,
                IPIFY_URL,
                "https://ipwhois.app/json/1.2.3.4"
            ]
        );
    }

    #[tokio::test]
    async fn test_ipwhois_failure_fails_whole_provider() {
        let client = MockHttpClient::new()
            .reply(IPIFY_URL, HttpReply::ok(r#"{"ip":"1.2.3.4"}"#))
            .reply("https://ipwhois.app/json/1.2.3.4", HttpReply::new(500, ""))
            .reply(TRACE_URL, HttpReply::ok("ip=1.2.3.4\nloc=TT\n"));

        let record = catalog_resolver(client.clone(), None).resolve().await;

        assert_eq!(record.country_code, "TT");
        assert_eq!(record.country, UNKNOWN);
        assert_eq!(client.calls().last().map(String::as_str), Some(TRACE_URL));
    }

    #[tokio::test(start_paused = true)]
    async fn test_follow_up_shares_the_attempt_budget() {
        let client = MockHttpClient::new()
            .delayed(
                IPIFY_URL,
                Duration::from_millis(3000),
                HttpReply::ok(r#"{"ip":"1.2.3.4"}"#),
            )
            .delayed(
                "https://ipwhois.app/json/1.2.3.4",
                Duration::from_millis(3000),
                HttpReply::ok(r#"{"ip":"1.2.3.4","city":"Late"}"#),
            )
            .reply(TRACE_URL, HttpReply::ok("ip=1.2.3.4\nloc=TT\n"));

        let record = catalog_resolver(client, None).resolve().await;

        assert_ne!(record.city, "Late");
        assert_eq!(record.country_code, "TT");
    }
}
