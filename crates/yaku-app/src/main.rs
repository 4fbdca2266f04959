use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tokio::signal;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};
use yaku_config::Config;

pub mod controller;
pub mod events;
pub mod io;
pub mod state;

#[cfg(test)]
mod tests;

use self::controller::AppController;
use self::io::InputSource;
use self::state::AppState;

#[derive(Parser, Debug, Default)]
#[command(author, version, about = "Translate text through a chain of online providers")]
pub struct Args {
    /// JSON profile; environment variables are used when omitted
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Source language tag (`auto` to detect)
    #[arg(short, long)]
    pub from: Option<String>,

    /// Target language tag
    #[arg(short, long)]
    pub to: Option<String>,

    /// Active provider
    #[arg(short, long)]
    pub provider: Option<String>,

    /// Fallback order, comma separated
    #[arg(long, value_delimiter = ',')]
    pub fallback: Option<Vec<String>>,

    /// Run the background endpoint monitor
    #[arg(long)]
    pub monitor: bool,

    /// Print the available providers and exit
    #[arg(long)]
    pub list_providers: bool,

    /// Text to translate; lines from stdin when empty
    pub text: Vec<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing()?;

    let args = Args::parse();
    let config = load_config(&args)?;

    let (state, status_rx) = AppState::new(config)?;
    let state = Arc::new(state);

    if args.list_providers {
        let active = state.registry.active_name();
        for name in state.registry.names() {
            let marker = if active.as_deref() == Some(name.as_str()) { "*" } else { " " };
            println!("{} {}", marker, name);
        }
        return Ok(());
    }

    let controller = AppController::new(state, status_rx);
    let mut tasks = controller.spawn_tasks();

    let source = if args.text.is_empty() {
        InputSource::Stdin
    } else {
        InputSource::Text(args.text.join(" "))
    };
    let input = controller.spawn_input(source);

    tokio::select! {
        _ = signal::ctrl_c() => {
            tracing::info!("Shutdown requested");
        }
        result = input => {
            match result {
                Ok(Ok(())) => tracing::debug!("Input finished"),
                Ok(Err(e)) => tracing::error!("input loop failed: {e}"),
                Err(e) => tracing::error!("input task panicked: {e}"),
            }
        }
    }

    controller.shutdown();
    while let Some(result) = tasks.join_next().await {
        match result {
            Ok(Ok(())) => {}
            Ok(Err(e)) => tracing::error!("task failed: {e}"),
            Err(e) => tracing::error!("task panicked: {e}"),
        }
    }

    Ok(())
}

/// Human readable output on a terminal, JSON lines otherwise
fn init_tracing() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    let result = if atty::is(atty::Stream::Stderr) {
        registry
            .with(fmt::layer().with_writer(std::io::stderr))
            .try_init()
    } else {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init()
    };

    result.map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))
}

fn load_config(args: &Args) -> anyhow::Result<Config> {
    let mut config = match &args.config {
        Some(path) => {
            let data = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read config {}", path.display()))?;
            Config::from_json(&data)
                .with_context(|| format!("invalid config {}", path.display()))?
        }
        None => Config::new(),
    };

    apply_overrides(&mut config, args);
    Ok(config)
}

pub fn apply_overrides(config: &mut Config, args: &Args) {
    if let Some(from) = &args.from {
        config.translator.from_lang = from.clone();
    }
    if let Some(to) = &args.to {
        config.translator.to_lang = to.clone();
    }
    if let Some(provider) = &args.provider {
        config.translator.active_provider = provider.to_lowercase();
    }
    if let Some(order) = &args.fallback {
        config.translator.fallback_order = order
            .iter()
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty())
            .collect();
    }
    if args.monitor {
        config.monitor.enabled = true;
    }
}
