//! `awtrix-weather run`: the long-running display loop.

use argh::FromArgs;
use tokio::sync::watch;

use crate::config::{ConfigError, DisplayConfig};
use crate::display_loop::DisplayLoop;
use crate::publisher::ConnectError;
use crate::weather::{FetchError, WttrClient};

/// Publish weather and custom messages to the display until stopped
#[derive(FromArgs, Debug)]
#[argh(subcommand, name = "run")]
pub struct RunCommand {
    /// path to the YAML configuration file (optional, uses defaults)
    #[argh(option, short = 'c')]
    pub config: Option<String>,
}

/// Startup failures. Nothing after startup ends the loop.
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("failed to create HTTP client: {0}")]
    HttpClient(#[from] FetchError),
    #[error(transparent)]
    Connect(#[from] ConnectError),
    #[error("failed to install Ctrl+C handler: {0}")]
    Signal(#[from] ctrlc::Error),
}

impl RunCommand {
    pub async fn run(&self) -> Result<(), RunError> {
        let config = match &self.config {
            Some(path) => {
                log::info!("Loading config from: {}", path);
                DisplayConfig::from_file(path)?
            }
            None => {
                log::info!("No config file specified, using defaults");
                DisplayConfig::default()
            }
        };

        if config.show_banner {
            log_banner(&config);
        }

        let source = WttrClient::new(config.http_timeout())?;
        let display = DisplayLoop::connect(source, &config).await?;

        let (shutdown_tx, shutdown_rx) = watch::channel(());
        ctrlc::set_handler(move || {
            log::info!("Received Ctrl+C, shutting down...");
            let _ = shutdown_tx.send(());
        })?;

        display.run(shutdown_rx).await;
        Ok(())
    }
}

fn log_banner(config: &DisplayConfig) {
    let rule = "-".repeat(60);
    log::info!("{}", rule);
    log::info!("awtrix-weather v{}", env!("CARGO_PKG_VERSION"));
    log::info!(
        "Broker: {}:{}  Topics: {}/*",
        config.broker.host,
        config.broker.port,
        config.broker.topic_prefix
    );
    log::info!("Weather: {}", config.weather_url);
    log::info!("Custom messages: {}", config.messages.len());
    log::info!("{}", rule);
}
