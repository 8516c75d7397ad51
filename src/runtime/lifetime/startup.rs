use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::api::AppState;
use crate::config::{StaticConfig, collect_warnings};
use crate::services::geoip::GeoResolver;
use crate::storage::{AnalyticsStore, SeaOrmStorage, StorageFactory};

pub struct StartupContext {
    pub storage: Arc<SeaOrmStorage>,
    pub state: AppState,
}

/// 安装 rustls 加密后端（ureq 与数据库 TLS 共用），重复安装不视为错误
pub fn install_crypto_provider() {
    if rustls::crypto::ring::default_provider()
        .install_default()
        .is_err()
    {
        debug!("rustls crypto provider already installed");
    }
}

/// 准备服务器启动的上下文
/// 包括存储、GeoIP 解析器和共享状态
pub async fn prepare_server_startup(config: &StaticConfig) -> Result<StartupContext> {
    let start_time = std::time::Instant::now();
    debug!("Starting pre-startup processing...");

    for warning in collect_warnings(config) {
        warn!("{}", warning);
    }

    install_crypto_provider();

    let storage = StorageFactory::create()
        .await
        .context("Failed to create storage backend")?;
    info!("Using storage backend: {}", storage.backend_name());

    let geo = GeoResolver::new(&config.geoip);

    let store: Arc<dyn AnalyticsStore> = storage.clone();
    let state = AppState::new(config, store, geo);

    info!(
        "Pre-startup processing completed in {} ms",
        start_time.elapsed().as_millis()
    );

    Ok(StartupContext { storage, state })
}
