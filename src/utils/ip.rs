//! IP 地址处理工具
//!
//! 提供统一的客户端 IP 提取功能：
//! - 边缘代理头（CF-Connecting-IP / X-Forwarded-For / X-Real-IP）
//! - 边缘粗粒度国家码（CF-IPCountry）
//! - 私有 IP 自动检测

use std::net::IpAddr;

use actix_web::HttpRequest;
use actix_web::http::header::HeaderMap;

/// 边缘节点注入的客户端 IP
pub const HEADER_CONNECTING_IP: &str = "cf-connecting-ip";
pub const HEADER_FORWARDED_FOR: &str = "x-forwarded-for";
pub const HEADER_REAL_IP: &str = "x-real-ip";
/// 边缘节点注入的国家码，`XX` 表示未知
pub const HEADER_EDGE_COUNTRY: &str = "cf-ipcountry";
pub const UNKNOWN_EDGE_COUNTRY: &str = "XX";

/// 检查 IP 是否为私有地址或 localhost
pub fn is_private_or_local(ip: &IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => v4.is_private() || v4.is_loopback(),
        IpAddr::V6(v6) => {
            // IPv6 私有地址：
            // - fc00::/7 (ULA, RFC 4193): fc00::/8 + fd00::/8
            // - fe80::/10 (Link-local)
            // - ::1 (Loopback)
            v6.is_loopback()
                || (v6.segments()[0] & 0xfe00) == 0xfc00 // fc00::/7 (包含 fc00 和 fd00)
                || (v6.segments()[0] & 0xffc0) == 0xfe80 // fe80::/10 (link-local)
        }
    }
}

/// 字符串形式的私有地址判断，字面量 `localhost` 也视为本地
///
/// 无法解析的字符串返回 `None`，由调用方决定如何处理
pub fn classify_ip(ip: &str) -> Option<bool> {
    let ip = ip.trim();
    if ip.eq_ignore_ascii_case("localhost") {
        return Some(true);
    }
    ip.parse::<IpAddr>()
        .ok()
        .map(|addr| is_private_or_local(&addr))
}

fn header_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|h| h.to_str().ok())
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

/// 从 HeaderMap 提取客户端 IP
///
/// 优先级：CF-Connecting-IP > X-Forwarded-For 第一个条目 > X-Real-IP。
/// 服务部署在边缘代理之后，不回退到 TCP 对端地址。
///
/// X-Forwarded-For 存在时只看第一个条目；第一个条目为空视为没有 IP，
/// 不再继续查看后面的条目或 X-Real-IP。
pub fn extract_client_ip_from_headers(headers: &HeaderMap) -> Option<String> {
    if let Some(ip) = header_value(headers, HEADER_CONNECTING_IP) {
        return Some(ip.to_string());
    }

    if let Some(forwarded) = header_value(headers, HEADER_FORWARDED_FOR) {
        return forwarded
            .split(',')
            .next()
            .map(str::trim)
            .filter(|first| !first.is_empty())
            .map(String::from);
    }

    header_value(headers, HEADER_REAL_IP).map(String::from)
}

/// 从 HttpRequest 提取客户端 IP
pub fn extract_client_ip(req: &HttpRequest) -> Option<String> {
    extract_client_ip_from_headers(req.headers())
}

/// 边缘节点给出的国家码（已过滤哨兵值 `XX`）
pub fn edge_country(headers: &HeaderMap) -> Option<String> {
    header_value(headers, HEADER_EDGE_COUNTRY)
        .filter(|c| !c.eq_ignore_ascii_case(UNKNOWN_EDGE_COUNTRY))
        .map(String::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::header::{HeaderName, HeaderValue};

    fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (k, v) in pairs {
            map.insert(HeaderName::from_static(k), HeaderValue::from_static(v));
        }
        map
    }

    #[test]
    fn test_is_private_or_local_ipv4() {
        // 私有地址
        assert!(is_private_or_local(&"10.0.0.1".parse().unwrap()));
        assert!(is_private_or_local(&"172.16.0.1".parse().unwrap()));
        assert!(is_private_or_local(&"172.31.255.254".parse().unwrap()));
        assert!(is_private_or_local(&"192.168.1.1".parse().unwrap()));
        // localhost
        assert!(is_private_or_local(&"127.0.0.1".parse().unwrap()));
        // 公网地址
        assert!(!is_private_or_local(&"8.8.8.8".parse().unwrap()));
        assert!(!is_private_or_local(&"172.32.0.1".parse().unwrap()));
    }

    #[test]
    fn test_is_private_or_local_ipv6() {
        assert!(is_private_or_local(&"::1".parse().unwrap()));
        assert!(is_private_or_local(&"fd00::1".parse().unwrap()));
        assert!(is_private_or_local(&"fc00::1".parse().unwrap()));
        assert!(is_private_or_local(&"fe80::1".parse().unwrap()));
        assert!(!is_private_or_local(
            &"2001:4860:4860::8888".parse().unwrap()
        ));
    }

    #[test]
    fn test_classify_ip() {
        assert_eq!(classify_ip("localhost"), Some(true));
        assert_eq!(classify_ip("192.168.0.10"), Some(true));
        assert_eq!(classify_ip("8.8.8.8"), Some(false));
        assert_eq!(classify_ip("not-an-ip"), None);
        assert_eq!(classify_ip(""), None);
    }

    #[test]
    fn test_connecting_ip_wins() {
        let map = headers(&[
            ("cf-connecting-ip", "203.0.113.9"),
            ("x-forwarded-for", "198.51.100.1, 10.0.0.1"),
            ("x-real-ip", "192.0.2.1"),
        ]);
        assert_eq!(
            extract_client_ip_from_headers(&map).as_deref(),
            Some("203.0.113.9")
        );
    }

    #[test]
    fn test_forwarded_for_first_entry() {
        let map = headers(&[
            ("x-forwarded-for", " 198.51.100.1 , 10.0.0.1"),
            ("x-real-ip", "192.0.2.1"),
        ]);
        assert_eq!(
            extract_client_ip_from_headers(&map).as_deref(),
            Some("198.51.100.1")
        );
    }

    #[test]
    fn test_forwarded_for_empty_first_entry_yields_none() {
        // 只取第一个条目，空条目不向后查找，也不回退到 X-Real-IP
        let map = headers(&[
            ("x-forwarded-for", ", 198.51.100.1"),
            ("x-real-ip", "192.0.2.1"),
        ]);
        assert_eq!(extract_client_ip_from_headers(&map), None);
    }

    #[test]
    fn test_real_ip_fallback_and_none() {
        let map = headers(&[("x-real-ip", "192.0.2.1")]);
        assert_eq!(
            extract_client_ip_from_headers(&map).as_deref(),
            Some("192.0.2.1")
        );
        assert_eq!(extract_client_ip_from_headers(&HeaderMap::new()), None);
    }

    #[test]
    fn test_edge_country_filters_sentinel() {
        assert_eq!(
            edge_country(&headers(&[("cf-ipcountry", "DE")])).as_deref(),
            Some("DE")
        );
        assert_eq!(edge_country(&headers(&[("cf-ipcountry", "XX")])), None);
        assert_eq!(edge_country(&HeaderMap::new()), None);
    }
}
