use orderdesk_core::config::{AppConfig, LoadOptions};
use orderdesk_db::{connect, migrations};

use crate::commands::{CommandResult, ErrorClass};

pub fn run(options: LoadOptions) -> CommandResult {
    let config = match AppConfig::load(options) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::failure(
                "migrate",
                ErrorClass::ConfigValidation,
                format!("configuration issue: {error}"),
            );
        }
    };

    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(error) => {
            return CommandResult::failure(
                "migrate",
                ErrorClass::RuntimeInit,
                format!("failed to initialize async runtime: {error}"),
            );
        }
    };

    let result = runtime.block_on(async {
        let pool = connect(&config.database)
            .await
            .map_err(|error| (ErrorClass::DbConnectivity, error.to_string()))?;
        let applied = migrations::run_pending(&pool)
            .await
            .map_err(|error| (ErrorClass::Migration, error.to_string()));
        pool.close().await;
        applied
    });

    match result {
        Ok(()) => {
            CommandResult::success("migrate", "customer and order collections are up to date")
        }
        Err((class, message)) => CommandResult::failure("migrate", class, message),
    }
}
