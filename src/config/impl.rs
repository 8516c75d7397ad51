use std::sync::{Arc, OnceLock};

use super::StaticConfig;
use crate::errors::{AnalyticsError, Result};

/// 启动时加载一次，之后只读
static CONFIG: OnceLock<Arc<StaticConfig>> = OnceLock::new();

/// Default configuration file, relative to the working directory
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// Get the global configuration instance
///
/// Returns an Arc pointer to the configuration, which is cheap to clone
/// and doesn't hold any locks.
pub fn get_config() -> Arc<StaticConfig> {
    CONFIG
        .get()
        .expect("Config not initialized. Call init_config() first.")
        .clone()
}

/// Initialize the global configuration
///
/// Loads `path` (missing file is fine) and applies environment overrides.
/// Subsequent calls are no-ops. Validation is left to the execution mode,
/// since `migrate` does not need an API key.
pub fn init_config(path: &str) -> Result<()> {
    if CONFIG.get().is_some() {
        return Ok(());
    }

    let config = StaticConfig::load(path)
        .map_err(|e| AnalyticsError::config(format!("Failed to load {}: {}", path, e)))?;

    let _ = CONFIG.set(Arc::new(config));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_config_loads_once() {
        let dir = tempfile::TempDir::new().expect("temp dir");
        let missing = dir.path().join("absent.toml");

        init_config(missing.to_str().expect("utf-8 path")).expect("first init");
        let first = get_config();

        // 第二次调用不会替换已加载的配置
        init_config("does-not-matter.toml").expect("second init");
        assert!(Arc::ptr_eq(&first, &get_config()));
    }
}
