pub mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use orderdesk_core::config::{ConfigOverrides, LoadOptions};

#[derive(Debug, Parser)]
#[command(
    name = "orderdesk",
    about = "Orderdesk operator CLI",
    long_about = "Prepare the customer/order store and inspect effective configuration.",
    after_help = "Examples:\n  orderdesk migrate\n  orderdesk --config deploy/orderdesk.toml config"
)]
pub struct Cli {
    /// Config file to load; it must exist. Defaults to `orderdesk.toml` when present.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Database URL, taking precedence over file and environment.
    #[arg(long, global = true, value_name = "URL")]
    database_url: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Apply pending database migrations and return structured status output")]
    Migrate,
    #[command(about = "Inspect effective configuration values with source attribution")]
    Config,
}

impl Cli {
    fn load_options(&self) -> LoadOptions {
        let overrides = ConfigOverrides {
            database_url: self.database_url.clone(),
            ..ConfigOverrides::default()
        };
        LoadOptions::from_flags(self.config.clone(), overrides)
    }
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();
    let options = cli.load_options();

    let result = match cli.command {
        Command::Migrate => commands::migrate::run(options),
        Command::Config => commands::config::run(options),
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use clap::Parser;

    use super::Cli;

    #[test]
    fn global_flags_feed_load_options() {
        let cli = Cli::try_parse_from([
            "orderdesk",
            "config",
            "--config",
            "deploy/orderdesk.toml",
            "--database-url",
            "sqlite::memory:",
        ])
        .expect("parse");

        let options = cli.load_options();
        assert!(options.require_file);
        assert_eq!(options.config_path.as_deref(), Some(Path::new("deploy/orderdesk.toml")));
        assert_eq!(options.overrides.database_url.as_deref(), Some("sqlite::memory:"));
    }

    #[test]
    fn no_config_flag_searches_default_locations() {
        let cli = Cli::try_parse_from(["orderdesk", "migrate"]).expect("parse");

        let options = cli.load_options();
        assert!(!options.require_file);
        assert!(options.config_path.is_none());
    }
}
