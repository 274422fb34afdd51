use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use pokedex_research::cli::{self, Command};
use pokedex_research::config::Config;
use pokedex_research::workflow;

fn init_tracing(config: &Config) {
    let default_level = if config.verbose {
        "debug"
    } else {
        config.log_level.as_str()
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = cli::Args::parse();
    let config = args.to_config()?;

    init_tracing(&config);

    if let Err(e) = config.validate() {
        eprintln!("❌ 配置无效: {}", e);
        std::process::exit(1);
    }

    match &args.command {
        Command::Research { query, .. } => {
            workflow::launch_research(&config, query, &args.command.research_options()).await
        }
        Command::Interactive => workflow::launch_interactive(&config).await,
        Command::Demo => workflow::launch_demo(&config).await,
    }
}
