use serde::{Deserialize, Serialize};

/// Environment variable prefix for structured overrides, e.g. `ANALYTICS__SERVER__PORT=9999`
pub const ENV_PREFIX: &str = "ANALYTICS";

/// 与 edge 部署时期保持兼容的扁平环境变量 → 配置键映射
pub const LEGACY_ENV_OVERRIDES: &[(&str, &str)] = &[
    ("DATABASE_URL", "database.database_url"),
    ("API_KEY", "auth.api_key"),
    ("IPINFO_TOKEN", "geoip.token"),
    ("DB_CA_CERT", "database.ca_cert"),
];

/// 静态配置（TOML + 环境变量，启动时加载一次）
///
/// - server: 监听地址、端口、worker 数量、健康检查超时
/// - database: 连接串、连接池、TLS 根证书
/// - auth: 共享 API Key
/// - geoip: IP 地理位置服务
/// - ingest: 上报限制
/// - logging: 日志输出
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StaticConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub geoip: GeoIpConfig,
    #[serde(default)]
    pub ingest: IngestConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl StaticConfig {
    /// 从 TOML 文件和环境变量加载配置
    ///
    /// 优先级：扁平 ENV（DATABASE_URL 等）> ANALYTICS__* ENV > config 文件 > 默认值
    pub fn load(path: &str) -> Result<Self, config::ConfigError> {
        use config::{Config, Environment, File};

        let mut builder = Config::builder()
            .add_source(File::with_name(path).required(false))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            );

        for (var, key) in LEGACY_ENV_OVERRIDES {
            builder = builder.set_override_option(*key, std::env::var(var).ok())?;
        }

        let config: StaticConfig = builder.build()?.try_deserialize()?;
        if std::path::Path::new(path).exists() {
            eprintln!("[INFO] Configuration loaded from: {}", path);
        }
        Ok(config)
    }

    /// 生成示例 TOML 配置文件
    pub fn generate_sample_config() -> String {
        let sample_config = Self::default();
        toml::to_string_pretty(&sample_config)
            .unwrap_or_else(|e| format!("Error generating sample config: {}", e))
    }

    /// 保存配置到 TOML 文件
    pub fn save_to_file<P: AsRef<std::path::Path>>(
        &self,
        path: P,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let content = toml::to_string_pretty(self)?;

        if let Some(parent) = path.as_ref().parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, content)?;
        Ok(())
    }
}

/// 服务器配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_server_host")]
    pub host: String,
    #[serde(default = "default_server_port")]
    pub port: u16,
    #[serde(default = "default_cpu_count")]
    pub cpu_count: usize,
    /// 健康检查中数据库探测的超时时间
    #[serde(default = "default_health_timeout_ms")]
    pub health_timeout_ms: u64,
}

/// 数据库连接配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_database_url")]
    pub database_url: String,
    #[serde(default = "default_database_pool_size")]
    pub pool_size: u32,
    #[serde(default = "default_database_timeout")]
    pub timeout: u64,
    /// PEM 格式的 CA 证书内容（仅 PostgreSQL）。设置后启用 verify-full
    #[serde(default)]
    pub ca_cert: Option<String>,
}

/// API 认证配置
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AuthConfig {
    /// `/api/*` 共享密钥，支持 `Bearer <key>` 或直接 `<key>`
    #[serde(default)]
    pub api_key: String,
}

/// IP 地理位置配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeoIpConfig {
    /// ipinfo.io 兼容的 API 地址
    #[serde(default = "default_geoip_api_base_url")]
    pub api_base_url: String,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default = "default_geoip_timeout_ms")]
    pub timeout_ms: u64,
    /// 成功结果的缓存时间，0 表示不缓存
    #[serde(default = "default_geoip_cache_ttl")]
    pub cache_ttl_secs: u64,
    #[serde(default = "default_geoip_cache_capacity")]
    pub cache_max_capacity: u64,
}

/// 上报限制
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestConfig {
    /// 单次 `/api/events` 请求允许的最大事件数
    ///
    /// 默认值高于 1 MiB 请求体能容纳的事件数，实际上限由 `max_body_bytes` 决定
    #[serde(default = "default_max_batch_size")]
    pub max_batch_size: usize,
    /// 请求体大小上限（字节）
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
    #[serde(default)]
    pub file: Option<String>,
    #[serde(default = "default_max_backups")]
    pub max_backups: u32,
    #[serde(default = "default_enable_rotation")]
    pub enable_rotation: bool,
}

// ============================================================
// Default value functions for static config
// ============================================================

fn default_server_host() -> String {
    "127.0.0.1".to_string()
}

fn default_server_port() -> u16 {
    8787
}

fn default_cpu_count() -> usize {
    num_cpus::get()
}

fn default_health_timeout_ms() -> u64 {
    5000
}

fn default_database_url() -> String {
    "sqlite://analytics.db?mode=rwc".to_string()
}

fn default_database_pool_size() -> u32 {
    10
}

fn default_database_timeout() -> u64 {
    10
}

fn default_geoip_api_base_url() -> String {
    "https://ipinfo.io".to_string()
}

fn default_geoip_timeout_ms() -> u64 {
    3000
}

fn default_geoip_cache_ttl() -> u64 {
    15 * 60
}

fn default_geoip_cache_capacity() -> u64 {
    10_000
}

fn default_max_batch_size() -> usize {
    10_000
}

fn default_max_body_bytes() -> usize {
    1024 * 1024
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

fn default_max_backups() -> u32 {
    5
}

fn default_enable_rotation() -> bool {
    true
}

// ============================================================
// Default implementations
// ============================================================

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_server_host(),
            port: default_server_port(),
            cpu_count: default_cpu_count(),
            health_timeout_ms: default_health_timeout_ms(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            database_url: default_database_url(),
            pool_size: default_database_pool_size(),
            timeout: default_database_timeout(),
            ca_cert: None,
        }
    }
}

impl Default for GeoIpConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_geoip_api_base_url(),
            token: None,
            timeout_ms: default_geoip_timeout_ms(),
            cache_ttl_secs: default_geoip_cache_ttl(),
            cache_max_capacity: default_geoip_cache_capacity(),
        }
    }
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            max_batch_size: default_max_batch_size(),
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            file: None,
            max_backups: default_max_backups(),
            enable_rotation: default_enable_rotation(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = StaticConfig::default();
        assert_eq!(config.server.port, 8787);
        assert_eq!(config.server.health_timeout_ms, 5000);
        assert_eq!(config.geoip.timeout_ms, 3000);
        assert_eq!(config.geoip.api_base_url, "https://ipinfo.io");
        assert_eq!(config.ingest.max_batch_size, 10_000);
        assert!(config.auth.api_key.is_empty());
        assert!(config.database.ca_cert.is_none());
    }

    #[test]
    fn test_sample_config_round_trips_through_toml() {
        let sample = StaticConfig::generate_sample_config();
        assert!(sample.contains("[server]"));
        assert!(sample.contains("[geoip]"));

        let parsed: StaticConfig = toml::from_str(&sample).expect("sample config should parse");
        assert_eq!(parsed.server.port, StaticConfig::default().server.port);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let parsed: StaticConfig = toml::from_str(
            r#"
            [auth]
            api_key = "secret"

            [server]
            port = 9000
            "#,
        )
        .expect("partial config should parse");

        assert_eq!(parsed.auth.api_key, "secret");
        assert_eq!(parsed.server.port, 9000);
        assert_eq!(parsed.server.host, "127.0.0.1");
        assert_eq!(parsed.logging.level, "info");
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::TempDir::new().expect("temp dir");
        let path = dir.path().join("analytics.toml");
        std::fs::write(
            &path,
            r#"
            [ingest]
            max_batch_size = 42
            "#,
        )
        .expect("write config");

        let config = StaticConfig::load(path.to_str().expect("utf-8 path")).expect("load config");
        assert_eq!(config.ingest.max_batch_size, 42);
    }
}
