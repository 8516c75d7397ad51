use anyhow::{Result, anyhow};

use crate::config::StaticConfig;

/// 输出示例配置到 stdout 或指定文件
pub fn run_generate_config(output: Option<&str>) -> Result<()> {
    match output {
        Some(path) => {
            StaticConfig::default()
                .save_to_file(path)
                .map_err(|e| anyhow!("Failed to write {}: {}", path, e))?;
            println!("Sample configuration written to {}", path);
        }
        None => println!("{}", StaticConfig::generate_sample_config()),
    }
    Ok(())
}
