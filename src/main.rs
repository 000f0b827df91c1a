//! AD User Provisioner - Application entry point
//!
//! CLI-based entry point that dispatches to various commands.

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ad_provisioner::{
    cli::{Cli, Commands},
    commands,
    config::Config,
    errors::{AppError, AppResult},
};

#[tokio::main]
async fn main() {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Initialize tracing (verbose mode sets debug level)
    init_tracing(cli.verbose);

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> AppResult<()> {
    // Explicit env file first; `Config::from_env` also reads `.env`
    if let Some(path) = &cli.config {
        dotenvy::from_path(path).map_err(|e| {
            AppError::invalid_argument(format!("Cannot load env file {}: {}", path, e))
        })?;
    }

    let config = Config::from_env()?;
    tracing::debug!(?config, "Configuration loaded");

    match cli.command {
        Commands::Serve(args) => commands::serve::execute(args, config).await,
        Commands::Password(args) => commands::password::execute(args, config).await,
        Commands::CreateUser(args) => commands::provision::execute(args, config).await,
        Commands::Lookup(args) => commands::directory::lookup(args, config).await,
        Commands::Groups(args) => commands::directory::groups(args, config).await,
        Commands::Ping => commands::directory::ping(config).await,
    }
}

/// Initialize tracing subscriber
fn init_tracing(verbose: bool) {
    let filter = if verbose {
        "debug".to_string()
    } else {
        std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string())
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::new(filter))
        .init();
}
