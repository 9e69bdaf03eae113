//! Configuration management for ollama-relay.
//!
//! Configuration is loaded with the following priority (highest to lowest):
//! 1. Command-line arguments
//! 2. Environment variables
//! 3. Configuration file (JSON)
//! 4. Default values

use std::net::IpAddr;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::api::ServerConfig;
use crate::cli::Args;
use crate::relay::{ModelCatalog, DEFAULT_MODEL, DEFAULT_MODELS};
use crate::runner::{
    RunnerSettings, DEFAULT_CHANNEL_CAPACITY, DEFAULT_PROGRAM, DEFAULT_SUBCOMMAND,
};

/// Application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// External program settings.
    pub runner: RunnerSection,
    /// Model list.
    pub models: ModelsSection,
    /// Server configuration.
    pub server: ServerSection,
    /// Logging configuration.
    pub logging: LoggingSection,
}

/// External program section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerSection {
    /// Program to launch.
    pub program: String,
    /// Argument placed before the model identifier.
    pub subcommand: String,
    /// Emissions buffered per run.
    pub channel_capacity: usize,
}

impl Default for RunnerSection {
    fn default() -> Self {
        Self {
            program: DEFAULT_PROGRAM.to_string(),
            subcommand: DEFAULT_SUBCOMMAND.to_string(),
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
        }
    }
}

/// Model list section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelsSection {
    /// Identifiers offered to callers.
    pub available: Vec<String>,
    /// Identifier used when none is given.
    pub default: String,
}

impl Default for ModelsSection {
    fn default() -> Self {
        Self {
            available: DEFAULT_MODELS.iter().map(|m| m.to_string()).collect(),
            default: DEFAULT_MODEL.to_string(),
        }
    }
}

/// Server configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSection {
    /// Host address to bind to.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
    /// Enable graceful shutdown.
    pub graceful_shutdown: bool,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 7860,
            graceful_shutdown: true,
        }
    }
}

/// Logging configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Log level (error, warn, info, debug, trace) or a full filter directive.
    pub level: String,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::Io)?;
        serde_json::from_str(&content).map_err(ConfigError::Json)
    }

    /// Apply environment variable overrides.
    pub fn apply_env(&mut self) {
        self.apply_vars(|key| std::env::var(key).ok());
    }

    /// Apply overrides from an arbitrary variable source.
    pub fn apply_vars<F>(&mut self, var: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(program) = var("OLLAMA_RELAY_PROGRAM") {
            if !program.is_empty() {
                self.runner.program = program;
            }
        }

        if let Some(model) = var("OLLAMA_RELAY_MODEL") {
            if !model.is_empty() {
                self.models.default = model;
            }
        }

        if let Some(host) = var("OLLAMA_RELAY_HOST") {
            self.server.host = host;
        }

        if let Some(port) = var("OLLAMA_RELAY_PORT") {
            if let Ok(port) = port.parse() {
                self.server.port = port;
            }
        }

        if let Some(level) = var("OLLAMA_RELAY_LOG_LEVEL") {
            self.logging.level = level;
        } else if let Some(level) = var("RUST_LOG") {
            self.logging.level = level;
        }
    }

    /// Apply CLI argument overrides.
    pub fn apply_args(&mut self, args: &Args) {
        if let Some(ref program) = args.program {
            self.runner.program = program.clone();
        }

        if let Some(host) = args.host {
            self.server.host = host.to_string();
        }

        if let Some(port) = args.port {
            self.server.port = port;
        }

        if let Some(ref level) = args.log_level {
            self.logging.level = level.clone();
        }
    }

    /// Load configuration with full priority chain.
    ///
    /// Priority: CLI args > env vars > config file > defaults
    pub fn load(args: &Args) -> Result<Self, ConfigError> {
        let mut config = Config::default();

        if let Some(ref path) = args.config {
            config = Config::from_file(path)?;
        }

        config.apply_env();
        config.apply_args(args);

        Ok(config)
    }

    /// Settings for the process runner.
    pub fn runner_settings(&self) -> RunnerSettings {
        RunnerSettings {
            program: self.runner.program.clone(),
            subcommand: self.runner.subcommand.clone(),
            channel_capacity: self.runner.channel_capacity,
        }
    }

    /// The configured model catalog.
    pub fn model_catalog(&self) -> ModelCatalog {
        ModelCatalog::new(self.models.available.clone(), self.models.default.clone())
    }

    /// Convert to ServerConfig for the API server.
    pub fn to_server_config(&self) -> Result<ServerConfig, ConfigError> {
        let host: IpAddr = self
            .server
            .host
            .parse()
            .map_err(|_| ConfigError::InvalidHost(self.server.host.clone()))?;

        let mut server_config = ServerConfig::new(host.to_string(), self.server.port);
        if !self.server.graceful_shutdown {
            server_config = server_config.without_graceful_shutdown();
        }

        Ok(server_config)
    }

    /// Get the log level filter string.
    pub fn log_filter(&self) -> &str {
        &self.logging.level
    }
}

/// Configuration errors.
#[derive(Debug)]
pub enum ConfigError {
    /// IO error reading config file.
    Io(std::io::Error),
    /// JSON parsing error.
    Json(serde_json::Error),
    /// Invalid host address.
    InvalidHost(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "failed to read config file: {}", e),
            Self::Json(e) => write!(f, "failed to parse config file: {}", e),
            Self::InvalidHost(host) => write!(f, "invalid host address: {}", host),
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.runner.program, "ollama");
        assert_eq!(config.runner.subcommand, "run");
        assert_eq!(config.models.default, "phi4:latest");
        assert_eq!(config.models.available.len(), 10);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 7860);
    }

    #[test]
    fn test_config_from_json() {
        let json = r#"{
            "runner": {
                "program": "/usr/local/bin/ollama"
            },
            "models": {
                "available": ["llama3:latest"],
                "default": "llama3:latest"
            },
            "server": {
                "host": "0.0.0.0",
                "port": 8080
            }
        }"#;

        let mut file = NamedTempFile::new().unwrap();
        file.write_all(json.as_bytes()).unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.runner.program, "/usr/local/bin/ollama");
        assert_eq!(config.runner.subcommand, "run"); // Default
        assert_eq!(config.models.available, vec!["llama3:latest"]);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 8080);
    }

    #[test]
    fn test_config_invalid_json() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"{ not json").unwrap();

        let err = Config::from_file(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Json(_)));
    }

    #[test]
    fn test_apply_vars() {
        let mut config = Config::default();
        config.apply_vars(vars(&[
            ("OLLAMA_RELAY_PROGRAM", "/opt/ollama"),
            ("OLLAMA_RELAY_MODEL", "llama3:latest"),
            ("OLLAMA_RELAY_PORT", "9000"),
            ("RUST_LOG", "debug"),
        ]));

        assert_eq!(config.runner.program, "/opt/ollama");
        assert_eq!(config.models.default, "llama3:latest");
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_apply_vars_log_level_precedence() {
        let mut config = Config::default();
        config.apply_vars(vars(&[
            ("OLLAMA_RELAY_LOG_LEVEL", "trace"),
            ("RUST_LOG", "debug"),
        ]));
        assert_eq!(config.logging.level, "trace");
    }

    #[test]
    fn test_apply_vars_bad_port_ignored() {
        let mut config = Config::default();
        config.apply_vars(vars(&[("OLLAMA_RELAY_PORT", "http")]));
        assert_eq!(config.server.port, 7860);
    }

    #[test]
    fn test_apply_args() {
        let mut config = Config::default();
        let args = Args {
            host: Some("192.168.1.1".parse().unwrap()),
            port: Some(5000),
            program: Some("/bin/fake-ollama".to_string()),
            log_level: Some("warn".to_string()),
            ..Args::default()
        };

        config.apply_args(&args);

        assert_eq!(config.server.host, "192.168.1.1");
        assert_eq!(config.server.port, 5000);
        assert_eq!(config.runner.program, "/bin/fake-ollama");
        assert_eq!(config.logging.level, "warn");
    }

    #[test]
    fn test_apply_args_keeps_unset() {
        let mut config = Config::default();
        config.server.port = 8123;
        config.apply_args(&Args::default());
        assert_eq!(config.server.port, 8123);
    }

    #[test]
    fn test_runner_settings_and_catalog() {
        let config = Config::default();
        let settings = config.runner_settings();
        assert_eq!(settings, RunnerSettings::default());

        let catalog = config.model_catalog();
        assert_eq!(catalog, ModelCatalog::default());
    }

    #[test]
    fn test_to_server_config() {
        let config = Config::default();
        let server_config = config.to_server_config().unwrap();

        assert_eq!(server_config.host, "127.0.0.1");
        assert_eq!(server_config.port, 7860);
        assert!(server_config.graceful_shutdown);
    }

    #[test]
    fn test_invalid_host() {
        let mut config = Config::default();
        config.server.host = "not-an-ip".to_string();

        let result = config.to_server_config();
        assert!(result.is_err());
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let json = serde_json::to_string_pretty(&config).unwrap();
        assert!(json.contains("\"program\""));
        assert!(json.contains("\"available\""));
        assert!(json.contains("\"port\""));
    }
}
