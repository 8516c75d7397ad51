//! Command-line interface definitions using clap

use clap::{Parser, Subcommand};

use crate::config::DEFAULT_CONFIG_PATH;

/// analytics-ingest - Mobile analytics ingestion service
#[derive(Parser, Debug)]
#[command(name = "analytics-ingest")]
#[command(version)]
#[command(about = "Ingestion API for mobile app sessions, events and error reports", long_about = None)]
pub struct Cli {
    /// Configuration file path
    #[arg(long, short = 'c', global = true, default_value = DEFAULT_CONFIG_PATH)]
    pub config: String,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Start the HTTP server (default)
    Serve,

    /// Run database migrations and exit
    Migrate,

    /// Print a sample TOML configuration
    GenerateConfig {
        /// Write to this file instead of stdout
        #[arg(long, short = 'o')]
        output: Option<String>,
    },
}

impl Cli {
    /// 未指定子命令时默认启动服务器
    pub fn command(&self) -> Commands {
        self.command.clone().unwrap_or(Commands::Serve)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_command_is_serve() {
        let cli = Cli::parse_from(["analytics-ingest"]);
        assert_eq!(cli.command(), Commands::Serve);
        assert_eq!(cli.config, DEFAULT_CONFIG_PATH);
    }

    #[test]
    fn test_config_flag_and_subcommand() {
        let cli = Cli::parse_from(["analytics-ingest", "-c", "/etc/analytics.toml", "migrate"]);
        assert_eq!(cli.config, "/etc/analytics.toml");
        assert_eq!(cli.command(), Commands::Migrate);

        let cli = Cli::parse_from(["analytics-ingest", "generate-config", "--config", "x.toml"]);
        assert_eq!(cli.config, "x.toml");
        assert_eq!(cli.command(), Commands::GenerateConfig { output: None });
    }
}
