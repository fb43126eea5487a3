//! Coachlog - conversation history CLI for an AI fitness coach
//!
//! Main entry point for the coachlog binary.

use anyhow::Result;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use coachlog::cli::{Cli, Commands};
use coachlog::commands;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments first so --verbose can shape logging.
    let cli = Cli::parse_args();

    init_tracing(cli.verbose);
    coachlog::metrics::init_metrics_exporter();

    if let Some(dir) = &cli.data_dir {
        tracing::info!("Using data directory override: {}", dir.display());
    }

    let services = commands::build_services(cli.data_dir.as_deref()).await?;

    match cli.command {
        Commands::History { command } => {
            tracing::info!("Starting history command");
            commands::history::handle_history(&services, command).await?;
            Ok(())
        }
        Commands::Search { query, limit, scan } => {
            tracing::info!("Starting search command");
            tracing::debug!("Query: {}", query);
            commands::search::handle_search(&services, &query, limit, scan).await?;
            Ok(())
        }
        Commands::Config { command } => {
            tracing::info!("Starting config command");
            commands::config::handle_config(&services, command).await?;
            Ok(())
        }
    }
}

/// Initialize tracing subscriber with environment filter
fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "coachlog=debug"
    } else {
        "coachlog=info"
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
