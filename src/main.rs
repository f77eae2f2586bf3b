use clap::{Parser, Subcommand};
use home_ctrl::config::{Config, DEFAULT_CONFIG_PATH};
use mimalloc::MiMalloc;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[derive(Debug, Parser)]
#[command(name = "home-ctrl", version, about = "Authenticated key-value home control service")]
struct Cli {
    /// Path to the YAML configuration file
    #[arg(long, env = "HOME_CTRL_CONFIG", default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the HTTP server (default)
    Serve,
    /// Create the database schema and exit
    Migrate,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let cfg = Config::load(&cli.config)?;

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cfg.loglevel.clone()));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_level(true)
                .with_target(false),
        )
        .init();

    info!(
        config = %cli.config.display(),
        database_url = %cfg.database_url,
        address = %cfg.server_address(),
        loglevel = %cfg.loglevel,
        session_ttl_hours = cfg.auth.session_ttl_hours,
    );

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => home_ctrl::app::serve(cfg, cli.config).await?,
        Command::Migrate => home_ctrl::app::migrate(&cfg).await?,
    }
    Ok(())
}
