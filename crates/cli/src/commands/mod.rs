pub mod config;
pub mod migrate;

use serde::Serialize;
use serde_json::json;

/// Printed output and process exit code of one command run.
#[derive(Debug, Clone)]
pub struct CommandResult {
    pub exit_code: u8,
    pub output: String,
}

/// Failure categories, each with a fixed exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorClass {
    ConfigValidation,
    RuntimeInit,
    DbConnectivity,
    Migration,
}

impl ErrorClass {
    pub fn exit_code(self) -> u8 {
        match self {
            Self::ConfigValidation => 2,
            Self::RuntimeInit => 3,
            Self::DbConnectivity => 4,
            Self::Migration => 5,
        }
    }
}

impl CommandResult {
    pub fn text(output: impl Into<String>) -> Self {
        Self { exit_code: 0, output: output.into() }
    }

    pub fn success(command: &str, message: impl Into<String>) -> Self {
        let outcome = json!({
            "command": command,
            "status": "ok",
            "message": message.into(),
        });
        Self { exit_code: 0, output: outcome.to_string() }
    }

    pub fn failure(command: &str, class: ErrorClass, message: impl Into<String>) -> Self {
        let outcome = json!({
            "command": command,
            "status": "error",
            "error_class": class,
            "message": message.into(),
        });
        Self { exit_code: class.exit_code(), output: outcome.to_string() }
    }
}
