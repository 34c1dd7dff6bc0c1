use clap::Parser;
use tracing::info;

use fairline::cli::{self, Cli, Commands};
use fairline::config::EngineConfig;

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    let config = match EngineConfig::load(&cli.config) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load config: {e}");
            std::process::exit(1);
        }
    };

    config.init_logging();
    info!("fairline starting");

    let result = match &cli.command {
        Commands::Analyze(args) => cli::analyze(args, config).await,
        Commands::Watch(args) => cli::watch(args, config).await,
    };

    if let Err(e) = result {
        eprintln!("{e}");
        std::process::exit(1);
    }
}
