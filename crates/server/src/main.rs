mod bootstrap;
mod customers;
mod error;
mod health;

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use orderdesk_core::config::{AppConfig, ConfigOverrides, LoadOptions};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "orderdesk-server", about = "Serve the orderdesk customer/order API")]
struct Args {
    /// Config file to load; it must exist. Defaults to `orderdesk.toml` when present.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    #[arg(long, value_name = "URL")]
    database_url: Option<String>,
    #[arg(long)]
    port: Option<u16>,
    #[arg(long, value_name = "LEVEL")]
    log_level: Option<String>,
}

impl Args {
    fn load_options(self) -> LoadOptions {
        let overrides = ConfigOverrides {
            database_url: self.database_url,
            server_port: self.port,
            log_level: self.log_level,
        };
        LoadOptions::from_flags(self.config, overrides)
    }
}

fn init_logging(config: &AppConfig) {
    use orderdesk_core::config::LogFormat::*;

    // RUST_LOG, when set, takes precedence over logging.level.
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.logging.level.trim().to_ascii_lowercase()));

    match config.logging.format {
        Compact => {
            tracing_subscriber::fmt().with_target(false).with_env_filter(filter).compact().init();
        }
        Pretty => {
            tracing_subscriber::fmt().with_target(false).with_env_filter(filter).pretty().init();
        }
        Json => {
            tracing_subscriber::fmt().with_target(false).with_env_filter(filter).json().init();
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    run(Args::parse().load_options()).await
}

async fn run(options: LoadOptions) -> Result<()> {
    // Load config and initialize logging before any other operations
    let config = AppConfig::load(options)?;
    init_logging(&config);

    let app = bootstrap::bootstrap_with_config(config).await?;

    let address = app.config.listen_address();
    let listener = tokio::net::TcpListener::bind(&address).await?;
    info!(
        event_name = "system.server.started",
        correlation_id = "bootstrap",
        bind_address = %address,
        "orderdesk-server listening"
    );

    axum::serve(listener, app.router()).with_graceful_shutdown(wait_for_shutdown()).await?;

    info!(
        event_name = "system.server.stopping",
        correlation_id = "shutdown",
        "orderdesk-server stopping"
    );
    app.db_pool.close().await;

    Ok(())
}

async fn wait_for_shutdown() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        error!(
            event_name = "system.server.signal_error",
            correlation_id = "shutdown",
            error = %error,
            "failed to listen for shutdown signal"
        );
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::Args;

    #[test]
    fn flags_become_command_line_overrides() {
        let options = Args::try_parse_from([
            "orderdesk-server",
            "--port",
            "9300",
            "--log-level",
            "debug",
        ])
        .expect("parse")
        .load_options();

        assert!(!options.require_file);
        assert_eq!(options.overrides.server_port, Some(9300));
        assert_eq!(options.overrides.log_level.as_deref(), Some("debug"));
        assert!(options.overrides.database_url.is_none());
    }

    #[test]
    fn config_flag_requires_the_named_file() {
        let options = Args::try_parse_from(["orderdesk-server", "--config", "prod.toml"])
            .expect("parse")
            .load_options();

        assert!(options.require_file);
        assert!(options.config_path.is_some());
    }
}
