//! objective-sync CLI entry point.

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use objective_sync::cli::{commands, Cli, Commands};
use objective_sync::infrastructure::config::ConfigLoader;
use objective_sync::infrastructure::logging::{LogConfig, LoggerImpl};
use objective_sync::Config;

fn load_config(cli: &Cli) -> Result<Config> {
    match &cli.config {
        Some(path) => ConfigLoader::load_from_file(path),
        None => ConfigLoader::load(),
    }
}

/// One-shot commands log to stderr so stdout stays clean for output.
fn init_stderr_logging() {
    let _ = tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();
}

async fn dispatch(cli: Cli) -> Result<()> {
    let config = load_config(&cli)?;
    let json = cli.json;

    // Held until exit so buffered file logs are flushed
    let _logger = if matches!(cli.command, Commands::Run { .. }) {
        Some(LoggerImpl::init(&LogConfig::from_settings(&config.logging)?)?)
    } else {
        init_stderr_logging();
        None
    };

    match cli.command {
        Commands::Run {
            poll_interval_ms,
            capacity,
        } => commands::run::execute(config, poll_interval_ms, capacity, json).await,
        Commands::Status => commands::status::execute(&config, json).await,
        Commands::Complete { name } => {
            commands::progress::set_progress(config, name, true, json).await
        }
        Commands::Reset { name } => {
            commands::progress::set_progress(config, name, false, json).await
        }
        Commands::Completed => commands::progress::list_by_completion(&config, true, json).await,
        Commands::Pending => commands::progress::list_by_completion(&config, false, json).await,
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let json = cli.json;

    if let Err(err) = dispatch(cli).await {
        objective_sync::cli::handle_error(err, json);
    }
}
