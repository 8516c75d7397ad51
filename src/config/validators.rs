//! 启动配置校验
//!
//! 在服务启动前拒绝无法正常工作的配置组合。

use super::StaticConfig;
use crate::errors::{AnalyticsError, Result};

/// 校验静态配置
///
/// - auth.api_key 不能为空（空密钥永远不会通过认证）
/// - database.database_url 不能为空
/// - geoip.api_base_url 必须是 http(s) 地址
/// - ingest.max_batch_size 必须大于 0
pub fn validate_config(config: &StaticConfig) -> Result<()> {
    if config.auth.api_key.trim().is_empty() {
        return Err(AnalyticsError::config(
            "auth.api_key is empty. Set API_KEY or ANALYTICS__AUTH__API_KEY",
        ));
    }

    if config.database.database_url.trim().is_empty() {
        return Err(AnalyticsError::database_config(
            "database.database_url is empty. Set DATABASE_URL",
        ));
    }

    let base = &config.geoip.api_base_url;
    if !(base.starts_with("http://") || base.starts_with("https://")) {
        return Err(AnalyticsError::config(format!(
            "geoip.api_base_url must start with http:// or https://, got '{}'",
            base
        )));
    }

    if config.ingest.max_batch_size == 0 {
        return Err(AnalyticsError::config(
            "ingest.max_batch_size must be greater than 0",
        ));
    }

    Ok(())
}

/// 不阻止启动但值得提示的配置问题
///
/// 配置在日志系统之前加载，所以这里只收集，由启动流程在日志就绪后输出。
pub fn collect_warnings(config: &StaticConfig) -> Vec<String> {
    let mut warnings = Vec::new();

    if config.auth.api_key.len() < 16 {
        warnings.push(
            "auth.api_key is shorter than 16 characters, consider a longer secret".to_string(),
        );
    }

    if config.geoip.token.is_none() {
        warnings.push(
            "geoip.token not set, geolocation will use the anonymous rate-limited endpoint"
                .to_string(),
        );
    }

    warnings
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> StaticConfig {
        let mut config = StaticConfig::default();
        config.auth.api_key = "0123456789abcdef".to_string();
        config
    }

    #[test]
    fn test_valid_config_passes() {
        assert!(validate_config(&valid_config()).is_ok());
    }

    #[test]
    fn test_empty_api_key_rejected() {
        let mut config = valid_config();
        config.auth.api_key = "   ".to_string();
        let err = validate_config(&config).unwrap_err();
        assert_eq!(err.code(), "E001");
    }

    #[test]
    fn test_empty_database_url_rejected() {
        let mut config = valid_config();
        config.database.database_url = String::new();
        let err = validate_config(&config).unwrap_err();
        assert!(err.message().contains("database_url"));
    }

    #[test]
    fn test_bad_geoip_url_rejected() {
        let mut config = valid_config();
        config.geoip.api_base_url = "ipinfo.io".to_string();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_warnings_for_short_key_and_missing_token() {
        let mut config = valid_config();
        config.auth.api_key = "short".to_string();
        let warnings = collect_warnings(&config);
        assert_eq!(warnings.len(), 2);

        config.auth.api_key = "0123456789abcdef".to_string();
        config.geoip.token = Some("tok".to_string());
        assert!(collect_warnings(&config).is_empty());
    }

    #[test]
    fn test_zero_batch_size_rejected() {
        let mut config = valid_config();
        config.ingest.max_batch_size = 0;
        assert!(validate_config(&config).is_err());
    }
}
