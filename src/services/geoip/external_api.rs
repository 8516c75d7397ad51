//! ipinfo.io 兼容 API 实现
//!
//! 使用 ureq 同步请求（在 spawn_blocking 中执行），内置 Moka 缓存 + Singleflight 语义。
//! 只缓存成功结果，失败不进入缓存。

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use moka::future::Cache;
use serde_json::Value;
use tracing::trace;
use ureq::Agent;

use super::provider::GeoIpLookup;
use crate::config::GeoIpConfig;
use crate::errors::{AnalyticsError, Result};
use crate::storage::GeoLocation;
use crate::storage::models::UNKNOWN;

/// ipinfo.io 兼容 Provider
///
/// - 有 token：`{base}/{ip}?token={token}`
/// - 无 token：`{base}/{ip}/json`
pub struct IpInfoProvider {
    base_url: String,
    token: Option<String>,
    agent: Agent,
    /// 成功结果缓存；TTL 为 0 时不启用
    cache: Option<Cache<String, GeoLocation>>,
}

impl IpInfoProvider {
    pub fn new(config: &GeoIpConfig) -> Self {
        let agent: Agent = Agent::config_builder()
            .timeout_global(Some(Duration::from_millis(config.timeout_ms)))
            .build()
            .into();

        let cache = (config.cache_ttl_secs > 0 && config.cache_max_capacity > 0).then(|| {
            Cache::builder()
                .time_to_live(Duration::from_secs(config.cache_ttl_secs))
                .max_capacity(config.cache_max_capacity)
                .build()
        });

        Self {
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            token: config.token.clone().filter(|t| !t.is_empty()),
            agent,
            cache,
        }
    }

    /// 构造查询 URL
    pub fn lookup_url(&self, ip: &str) -> String {
        match &self.token {
            Some(token) => format!("{}/{}?token={}", self.base_url, ip, token),
            None => format!("{}/{}/json", self.base_url, ip),
        }
    }

    /// 同步请求（在 spawn_blocking 中调用）
    fn fetch_sync(agent: Agent, url: String) -> Result<GeoLocation> {
        let resp = agent
            .get(&url)
            .header("Accept", "application/json")
            .call()
            .map_err(|e| AnalyticsError::geo_lookup(format!("request failed: {}", e)))?;

        let json: Value = resp
            .into_body()
            .read_json()
            .map_err(|e| AnalyticsError::geo_lookup(format!("response parse failed: {}", e)))?;

        let geo = parse_ipinfo_response(&json);
        trace!(
            "ipinfo lookup: country={}, region={}, city={}",
            geo.country, geo.region, geo.city
        );
        Ok(geo)
    }

    async fn fetch(&self, ip: &str) -> Result<GeoLocation> {
        let url = self.lookup_url(ip);
        let agent = self.agent.clone();

        tokio::task::spawn_blocking(move || Self::fetch_sync(agent, url))
            .await
            .map_err(|e| AnalyticsError::geo_lookup(format!("spawn_blocking failed: {}", e)))?
    }
}

/// 解析 ipinfo.io 响应
///
/// `loc` 形如 `"37.386,-122.0838"`，缺失或无法解析时为 (0, 0)；
/// 缺失的文本字段填 `Unknown`
pub fn parse_ipinfo_response(json: &Value) -> GeoLocation {
    let text = |key: &str| {
        json.get(key)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .unwrap_or(UNKNOWN)
            .to_string()
    };

    let (latitude, longitude) = json
        .get("loc")
        .and_then(Value::as_str)
        .and_then(|loc| loc.split_once(','))
        .and_then(|(lat, lon)| Some((lat.trim().parse::<f64>().ok()?, lon.trim().parse::<f64>().ok()?)))
        .filter(|(lat, lon)| lat.is_finite() && lon.is_finite())
        .unwrap_or((0.0, 0.0));

    GeoLocation {
        country: text("country"),
        region: text("region"),
        city: text("city"),
        latitude,
        longitude,
    }
}

#[async_trait]
impl GeoIpLookup for IpInfoProvider {
    /// 查询 IP 地理位置（带缓存 + Singleflight）
    ///
    /// try_get_with：同一 key 的并发调用只执行一次闭包；返回错误时不写入缓存
    async fn lookup(&self, ip: &str) -> Result<GeoLocation> {
        let Some(cache) = &self.cache else {
            return self.fetch(ip).await;
        };

        cache
            .try_get_with(ip.to_string(), async {
                trace!("GeoIP cache miss for {}, fetching from API", ip);
                self.fetch(ip).await
            })
            .await
            .map_err(|e: Arc<AnalyticsError>| (*e).clone())
    }

    fn name(&self) -> &'static str {
        "ipinfo"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn config(token: Option<&str>) -> GeoIpConfig {
        GeoIpConfig {
            api_base_url: "https://ipinfo.io/".to_string(),
            token: token.map(String::from),
            ..GeoIpConfig::default()
        }
    }

    #[test]
    fn test_lookup_url_with_and_without_token() {
        let with_token = IpInfoProvider::new(&config(Some("abc123")));
        assert_eq!(
            with_token.lookup_url("8.8.8.8"),
            "https://ipinfo.io/8.8.8.8?token=abc123"
        );

        let without_token = IpInfoProvider::new(&config(None));
        assert_eq!(
            without_token.lookup_url("8.8.8.8"),
            "https://ipinfo.io/8.8.8.8/json"
        );

        let empty_token = IpInfoProvider::new(&config(Some("")));
        assert_eq!(
            empty_token.lookup_url("1.1.1.1"),
            "https://ipinfo.io/1.1.1.1/json"
        );
    }

    #[test]
    fn test_parse_full_response() {
        let geo = parse_ipinfo_response(&json!({
            "ip": "8.8.8.8",
            "city": "Mountain View",
            "region": "California",
            "country": "US",
            "loc": "37.4056,-122.0775",
            "org": "AS15169 Google LLC"
        }));
        assert_eq!(geo.country, "US");
        assert_eq!(geo.region, "California");
        assert_eq!(geo.city, "Mountain View");
        assert_eq!(geo.latitude, 37.4056);
        assert_eq!(geo.longitude, -122.0775);
    }

    #[test]
    fn test_parse_sparse_response() {
        let geo = parse_ipinfo_response(&json!({"ip": "1.2.3.4", "country": "AU"}));
        assert_eq!(geo.country, "AU");
        assert_eq!(geo.region, "Unknown");
        assert_eq!(geo.city, "Unknown");
        assert_eq!((geo.latitude, geo.longitude), (0.0, 0.0));

        let garbled = parse_ipinfo_response(&json!({"loc": "north,south"}));
        assert_eq!(garbled.country, "Unknown");
        assert_eq!((garbled.latitude, garbled.longitude), (0.0, 0.0));
    }

    /// 连接被拒绝时返回错误且不写入缓存
    #[tokio::test]
    async fn test_transport_error_is_not_cached() {
        let provider = IpInfoProvider::new(&GeoIpConfig {
            api_base_url: "http://127.0.0.1:9".to_string(),
            timeout_ms: 500,
            ..GeoIpConfig::default()
        });

        assert!(provider.lookup("8.8.8.8").await.is_err());
        let cache = provider.cache.as_ref().unwrap();
        cache.run_pending_tasks().await;
        assert_eq!(cache.entry_count(), 0);
    }

    /// 依赖外部网络服务，CI 环境可能失败
    #[tokio::test]
    #[ignore]
    async fn test_ipinfo_real_lookup() {
        let provider = IpInfoProvider::new(&GeoIpConfig::default());
        let geo = provider.lookup("8.8.8.8").await.unwrap();
        assert_eq!(geo.country, "US");
    }
}
