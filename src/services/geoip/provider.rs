//! GeoIP Provider 抽象层
//!
//! `GeoResolver` 负责策略：私有地址跳过外部查询、查询失败回退到边缘国家码。
//! 具体查询由 `GeoIpLookup` 实现（默认 ipinfo.io 兼容 API）。

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use super::external_api::IpInfoProvider;
use crate::config::GeoIpConfig;
use crate::errors::Result;
use crate::storage::GeoLocation;
use crate::utils::ip::{UNKNOWN_EDGE_COUNTRY, classify_ip};

/// GeoIP 查询 trait
#[async_trait]
pub trait GeoIpLookup: Send + Sync {
    /// 查询公网 IP 的地理位置，任何失败都以错误返回，由调用方回退
    async fn lookup(&self, ip: &str) -> Result<GeoLocation>;

    /// 获取 provider 名称（用于日志）
    fn name(&self) -> &'static str;
}

/// 统一 GeoIP 解析器
#[derive(Clone)]
pub struct GeoResolver {
    inner: Arc<dyn GeoIpLookup>,
}

impl GeoResolver {
    /// 根据 GeoIpConfig 初始化 ipinfo.io provider
    pub fn new(config: &GeoIpConfig) -> Self {
        let inner: Arc<dyn GeoIpLookup> = Arc::new(IpInfoProvider::new(config));
        info!("GeoIP: Initialized with {} provider", inner.name());
        Self { inner }
    }

    /// 使用自定义 provider（测试或替换实现）
    pub fn with_provider(inner: Arc<dyn GeoIpLookup>) -> Self {
        Self { inner }
    }

    /// 解析客户端 IP 的地理位置
    ///
    /// 1. 私有/本地/无法解析的地址 → 直接回退
    /// 2. 公网地址 → 外部查询，失败回退
    /// 3. 回退：边缘国家码存在（且不是 `XX`）时返回仅含国家的位置，否则 `None`
    pub async fn resolve(&self, ip: &str, edge_country: Option<&str>) -> Option<GeoLocation> {
        match classify_ip(ip) {
            Some(false) => match self.inner.lookup(ip.trim()).await {
                Ok(geo) => return Some(geo),
                Err(e) => warn!("GeoIP lookup for {} failed, using fallback: {}", ip, e),
            },
            Some(true) => debug!("GeoIP: skipping private address {}", ip),
            None => debug!("GeoIP: unparseable address {:?}, using fallback", ip),
        }

        Self::fallback(edge_country)
    }

    fn fallback(edge_country: Option<&str>) -> Option<GeoLocation> {
        edge_country
            .map(str::trim)
            .filter(|c| !c.is_empty() && !c.eq_ignore_ascii_case(UNKNOWN_EDGE_COUNTRY))
            .map(GeoLocation::country_only)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::AnalyticsError;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingLookup {
        calls: AtomicUsize,
        fail: bool,
    }

    impl CountingLookup {
        fn new(fail: bool) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                fail,
            })
        }
    }

    #[async_trait]
    impl GeoIpLookup for CountingLookup {
        async fn lookup(&self, _ip: &str) -> Result<GeoLocation> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                Err(AnalyticsError::geo_lookup("upstream returned 500"))
            } else {
                Ok(GeoLocation {
                    country: "US".into(),
                    region: "California".into(),
                    city: "Mountain View".into(),
                    latitude: 37.4,
                    longitude: -122.1,
                })
            }
        }

        fn name(&self) -> &'static str {
            "Counting"
        }
    }

    #[tokio::test]
    async fn test_private_addresses_never_reach_provider() {
        let lookup = CountingLookup::new(false);
        let resolver = GeoResolver::with_provider(lookup.clone());

        for ip in [
            "10.1.2.3",
            "172.20.0.1",
            "192.168.1.1",
            "127.0.0.1",
            "localhost",
            "::1",
            "fd12::1",
            "fe80::1",
        ] {
            assert_eq!(resolver.resolve(ip, None).await, None, "ip {}", ip);
        }
        assert_eq!(lookup.calls.load(Ordering::SeqCst), 0);

        let geo = resolver.resolve("192.168.1.1", Some("DE")).await.unwrap();
        assert_eq!(geo, GeoLocation::country_only("DE"));
        assert_eq!(lookup.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_unparseable_address_uses_fallback() {
        let lookup = CountingLookup::new(false);
        let resolver = GeoResolver::with_provider(lookup.clone());

        assert_eq!(
            resolver.resolve("not-an-ip", Some("FR")).await,
            Some(GeoLocation::country_only("FR"))
        );
        assert_eq!(lookup.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_public_address_uses_provider() {
        let lookup = CountingLookup::new(false);
        let resolver = GeoResolver::with_provider(lookup.clone());

        let geo = resolver.resolve("8.8.8.8", Some("DE")).await.unwrap();
        assert_eq!(geo.city, "Mountain View");
        assert_eq!(lookup.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_provider_failure_falls_back() {
        let lookup = CountingLookup::new(true);
        let resolver = GeoResolver::with_provider(lookup.clone());

        assert_eq!(
            resolver.resolve("8.8.8.8", Some("JP")).await,
            Some(GeoLocation::country_only("JP"))
        );
        assert_eq!(resolver.resolve("8.8.8.8", Some("XX")).await, None);
        assert_eq!(resolver.resolve("8.8.8.8", None).await, None);
        assert_eq!(lookup.calls.load(Ordering::SeqCst), 3);
    }
}
