use orderdesk_core::config::{AppConfig, LoadOptions, LoadedConfig, SETTINGS};

use crate::commands::{CommandResult, ErrorClass};

pub fn run(options: LoadOptions) -> CommandResult {
    match AppConfig::load_traced(options) {
        Ok(loaded) => CommandResult::text(render(&loaded)),
        Err(error) => CommandResult::failure(
            "config",
            ErrorClass::ConfigValidation,
            format!("config validation failed: {error}"),
        ),
    }
}

fn render(loaded: &LoadedConfig) -> String {
    let mut lines = vec![
        "effective config (source precedence: command line > env > file > default):".to_string(),
    ];
    for setting in &SETTINGS {
        let value = loaded.config.value_of(setting.key).unwrap_or_default();
        lines.push(format!("- {} = {value} (source: {})", setting.key, loaded.source(setting.key)));
    }
    lines.join("\n")
}
