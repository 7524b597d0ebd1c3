//! Layered service configuration.
//!
//! Every tunable is listed once in [`SETTINGS`] with its dotted file key and
//! the environment variables that may set it. Loading walks that table for
//! each layer (file, env, command-line overrides) and remembers which layer
//! supplied the final value, so operators can ask where a setting came from.

use std::collections::BTreeMap;
use std::env;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use thiserror::Error;
use toml::{Table, Value};

const CONFIG_FILE_CANDIDATES: [&str; 2] = ["orderdesk.toml", "config/orderdesk.toml"];

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub timeout_secs: u64,
}

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub bind_address: String,
    pub port: u16,
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Compact => "compact",
            Self::Pretty => "pretty",
            Self::Json => "json",
        })
    }
}

impl FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

/// A configurable value: its `section.field` key and the env vars that set
/// it, highest priority first.
#[derive(Clone, Copy, Debug)]
pub struct Setting {
    pub key: &'static str,
    pub env_keys: &'static [&'static str],
}

impl Setting {
    fn from_env(&self) -> Option<(&'static str, String)> {
        self.env_keys.iter().find_map(|key| read_env(key).map(|value| (*key, value)))
    }
}

pub const SETTINGS: [Setting; 7] = [
    Setting { key: "database.url", env_keys: &["ORDERDESK_DATABASE_URL"] },
    Setting { key: "database.max_connections", env_keys: &["ORDERDESK_DATABASE_MAX_CONNECTIONS"] },
    Setting { key: "database.timeout_secs", env_keys: &["ORDERDESK_DATABASE_TIMEOUT_SECS"] },
    Setting { key: "server.bind_address", env_keys: &["ORDERDESK_SERVER_BIND_ADDRESS"] },
    Setting { key: "server.port", env_keys: &["ORDERDESK_SERVER_PORT"] },
    Setting { key: "logging.level", env_keys: &["ORDERDESK_LOGGING_LEVEL", "ORDERDESK_LOG_LEVEL"] },
    Setting {
        key: "logging.format",
        env_keys: &["ORDERDESK_LOGGING_FORMAT", "ORDERDESK_LOG_FORMAT"],
    },
];

/// Layer that supplied an effective value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConfigSource {
    Default,
    File(PathBuf),
    Env(&'static str),
    CommandLine,
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Default => f.write_str("default"),
            Self::File(path) => write!(f, "file ({})", path.display()),
            Self::Env(key) => write!(f, "env ({key})"),
            Self::CommandLine => f.write_str("command line"),
        }
    }
}

/// Values passed as command-line flags; they beat every other layer.
#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub database_url: Option<String>,
    pub server_port: Option<u16>,
    pub log_level: Option<String>,
}

impl ConfigOverrides {
    fn entries(&self) -> Vec<(&'static str, String)> {
        let mut entries = Vec::new();
        if let Some(url) = &self.database_url {
            entries.push(("database.url", url.clone()));
        }
        if let Some(port) = self.server_port {
            entries.push(("server.port", port.to_string()));
        }
        if let Some(level) = &self.log_level {
            entries.push(("logging.level", level.clone()));
        }
        entries
    }
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

impl LoadOptions {
    /// Options for a `--config` flag: a named file must exist, no name falls
    /// back to the standard locations.
    pub fn from_flags(config_path: Option<PathBuf>, overrides: ConfigOverrides) -> Self {
        Self { require_file: config_path.is_some(), config_path, overrides }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("config file `{path}` has an invalid `{key}`: `{value}`")]
    InvalidFileValue { path: PathBuf, key: &'static str, value: String },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("environment variable interpolation failed for `{var}`")]
    MissingEnvInterpolation { var: String },
    #[error("unterminated environment interpolation expression")]
    UnterminatedInterpolation,
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

/// Raw text that does not parse as the setting's type.
struct InvalidValue;

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database: DatabaseConfig {
                url: "sqlite://orderdesk.db?mode=rwc".to_string(),
                max_connections: 5,
                timeout_secs: 30,
            },
            server: ServerConfig { bind_address: "127.0.0.1".to_string(), port: 8080 },
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        Self::load_traced(options).map(|loaded| loaded.config)
    }

    /// Loads the config and keeps the source of every value.
    ///
    /// Later layers win: defaults, then the config file, then `ORDERDESK_*`
    /// variables, then command-line overrides. Blank env values are skipped.
    pub fn load_traced(options: LoadOptions) -> Result<LoadedConfig, ConfigError> {
        let mut loaded = LoadedConfig { config: Self::default(), sources: BTreeMap::new() };

        match resolve_config_path(options.config_path.as_deref()) {
            Some(path) => loaded.apply_file(&path)?,
            None if options.require_file => {
                let expected = options
                    .config_path
                    .unwrap_or_else(|| PathBuf::from(CONFIG_FILE_CANDIDATES[0]));
                return Err(ConfigError::MissingConfigFile(expected));
            }
            None => {}
        }

        for setting in &SETTINGS {
            if let Some((env_key, value)) = setting.from_env() {
                loaded.apply(setting.key, &value, ConfigSource::Env(env_key)).map_err(|_| {
                    ConfigError::InvalidEnvOverride { key: env_key.to_string(), value }
                })?;
            }
        }

        for (key, value) in options.overrides.entries() {
            loaded.apply(key, &value, ConfigSource::CommandLine).map_err(|_| {
                ConfigError::Validation(format!("invalid command-line value for {key}: `{value}`"))
            })?;
        }

        loaded.config.validate()?;
        Ok(loaded)
    }

    fn assign(&mut self, key: &str, raw: &str) -> Result<(), InvalidValue> {
        let raw = raw.trim();
        match key {
            "database.url" => self.database.url = raw.to_string(),
            "database.max_connections" => {
                self.database.max_connections = raw.parse().map_err(|_| InvalidValue)?;
            }
            "database.timeout_secs" => {
                self.database.timeout_secs = raw.parse().map_err(|_| InvalidValue)?;
            }
            "server.bind_address" => self.server.bind_address = raw.to_string(),
            "server.port" => self.server.port = raw.parse().map_err(|_| InvalidValue)?,
            "logging.level" => self.logging.level = raw.to_string(),
            "logging.format" => self.logging.format = raw.parse().map_err(|_| InvalidValue)?,
            _ => return Err(InvalidValue),
        }
        Ok(())
    }

    /// Effective value of a [`SETTINGS`] key, rendered for display.
    pub fn value_of(&self, key: &str) -> Option<String> {
        let value = match key {
            "database.url" => self.database.url.clone(),
            "database.max_connections" => self.database.max_connections.to_string(),
            "database.timeout_secs" => self.database.timeout_secs.to_string(),
            "server.bind_address" => self.server.bind_address.clone(),
            "server.port" => self.server.port.to_string(),
            "logging.level" => self.logging.level.clone(),
            "logging.format" => self.logging.format.to_string(),
            _ => return None,
        };
        Some(value)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_database(&self.database)?;
        validate_server(&self.server)?;
        validate_logging(&self.logging)?;
        Ok(())
    }

    pub fn listen_address(&self) -> String {
        format!("{}:{}", self.server.bind_address, self.server.port)
    }
}

/// A loaded config plus the layer each value came from.
#[derive(Clone, Debug)]
pub struct LoadedConfig {
    pub config: AppConfig,
    sources: BTreeMap<&'static str, ConfigSource>,
}

impl LoadedConfig {
    pub fn source(&self, key: &str) -> ConfigSource {
        self.sources.get(key).cloned().unwrap_or(ConfigSource::Default)
    }

    fn apply(
        &mut self,
        key: &'static str,
        raw: &str,
        source: ConfigSource,
    ) -> Result<(), InvalidValue> {
        self.config.assign(key, raw)?;
        self.sources.insert(key, source);
        Ok(())
    }

    fn apply_file(&mut self, path: &Path) -> Result<(), ConfigError> {
        let raw = fs::read_to_string(path)
            .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;
        let table = interpolate_env_vars(&raw)?
            .parse::<Table>()
            .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })?;

        for setting in &SETTINGS {
            let Some(value) = lookup(&table, setting.key) else {
                continue;
            };
            let invalid = || ConfigError::InvalidFileValue {
                path: path.to_path_buf(),
                key: setting.key,
                value: value.to_string(),
            };
            let raw = match value {
                Value::String(text) => text.clone(),
                Value::Integer(number) => number.to_string(),
                _ => return Err(invalid()),
            };
            self.apply(setting.key, &raw, ConfigSource::File(path.to_path_buf()))
                .map_err(|_| invalid())?;
        }

        Ok(())
    }
}

fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    CONFIG_FILE_CANDIDATES.into_iter().map(PathBuf::from).find(|path| path.exists())
}

fn lookup<'a>(table: &'a Table, key: &str) -> Option<&'a Value> {
    let (section, field) = key.split_once('.')?;
    table.get(section)?.get(field)
}

/// Expands `${VAR}` references before the file is parsed.
fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut output = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(start) = rest.find("${") {
        output.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let end = after.find('}').ok_or(ConfigError::UnterminatedInterpolation)?;
        let var = &after[..end];
        let value = env::var(var)
            .map_err(|_| ConfigError::MissingEnvInterpolation { var: var.to_string() })?;
        output.push_str(&value);
        rest = &after[end + 1..];
    }
    output.push_str(rest);

    Ok(output)
}

fn validate_database(database: &DatabaseConfig) -> Result<(), ConfigError> {
    let url = database.url.trim();
    let sqlite_url =
        url.starts_with("sqlite://") || url.starts_with("sqlite::") || url == ":memory:";
    if !sqlite_url {
        return Err(ConfigError::Validation(
            "database.url must be a sqlite URL (`sqlite://...`, `sqlite::...`, or `:memory:`)"
                .to_string(),
        ));
    }
    if database.max_connections == 0 {
        return Err(ConfigError::Validation(
            "database.max_connections must be greater than zero".to_string(),
        ));
    }
    if !(1..=300).contains(&database.timeout_secs) {
        return Err(ConfigError::Validation(
            "database.timeout_secs must be in range 1..=300".to_string(),
        ));
    }
    Ok(())
}

fn validate_server(server: &ServerConfig) -> Result<(), ConfigError> {
    if server.bind_address.trim().is_empty() {
        return Err(ConfigError::Validation("server.bind_address must not be empty".to_string()));
    }
    if server.port == 0 {
        return Err(ConfigError::Validation("server.port must be greater than zero".to_string()));
    }
    Ok(())
}

fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
    match logging.level.trim().to_ascii_lowercase().as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ConfigError::Validation(
            "logging.level must be one of trace|debug|info|warn|error".to_string(),
        )),
    }
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}
