mod context;
mod dispatch;
mod health;
mod notifications;
mod settings;
mod telemetry;
mod webserver;

use anyhow::Result;
use clap::Parser;
use context::AppContext;
use settings::Settings;
use std::path::PathBuf;
use tokio::spawn;
use tracing::debug;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Relays push notification requests to Firebase Cloud Messaging
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    /// Settings file to load instead of `settings.toml` in the working directory
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_env("RUST_LOG"))
        .init();

    let cli = Cli::parse();
    let settings = match &cli.config {
        Some(path) => Settings::load_from_path(path)?,
        None => Settings::load()?,
    };

    telemetry::metrics_registry::init_metrics_registry();

    let context = AppContext::from_settings(&settings).await;

    let webserver_task_handle = spawn(async move {
        debug!("starting webserver");
        if let Err(e) = webserver::start(&settings.webserver, context).await {
            log::error!("Error occurred while running webserver: {:?}", e);
        }
    });

    tokio::select! {
        _ = webserver_task_handle => {
            println!("Webserver task completed")
        }
    }

    Ok(())
}
