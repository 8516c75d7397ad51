use clap::Parser;

use analytics_ingest::cli::{Cli, Commands};
use analytics_ingest::config::{get_config, init_config};
use analytics_ingest::runtime::modes;
use analytics_ingest::system::init_logging;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // .env 只补充未设置的环境变量
    dotenvy::dotenv().ok();

    let command = cli.command();
    if let Commands::GenerateConfig { output } = &command {
        return modes::run_generate_config(output.as_deref());
    }

    if let Err(e) = init_config(&cli.config) {
        eprintln!("{}", e.format_colored());
        std::process::exit(1);
    }
    let config = get_config();

    let _guard = match init_logging(&config.logging) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("{}", e.format_colored());
            std::process::exit(1);
        }
    };

    match command {
        Commands::Serve => modes::run_server().await,
        Commands::Migrate => modes::run_migrate().await,
        Commands::GenerateConfig { .. } => Ok(()),
    }
}
