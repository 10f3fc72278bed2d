//! Server configuration.
//!
//! Configuration comes from a JSON or TOML file when one is given and exists,
//! and from environment variables otherwise.

use crate::TransportKind;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use vllm_core::{ProviderConfig, ProviderType, parse_model_list};
use vllm_error::{ConfigError, VllmResult};

/// Top-level server configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host for network transports
    #[serde(default = "default_host")]
    pub host: String,
    /// Port for network transports
    #[serde(default = "default_port")]
    pub port: u16,
    /// Transport to serve
    #[serde(default)]
    pub transport: TransportKind,
    /// Log level name (DEBUG, INFO, WARNING, ERROR)
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Connection ceiling for network transports
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Per-request timeout for network transports
    #[serde(default = "default_request_timeout", alias = "request_timeout")]
    pub request_timeout_seconds: u64,
    /// Reject requests that fail provider validation before calling upstream
    #[serde(default)]
    pub validate_requests: bool,
    /// Provider entries; entries without an API key are ignored
    #[serde(default)]
    pub providers: Vec<ProviderConfig>,
}

fn default_host() -> String {
    "localhost".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_log_level() -> String {
    "INFO".to_string()
}

fn default_max_connections() -> u32 {
    100
}

fn default_request_timeout() -> u64 {
    120
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            transport: TransportKind::default(),
            log_level: default_log_level(),
            max_connections: default_max_connections(),
            request_timeout_seconds: default_request_timeout(),
            validate_requests: false,
            providers: Vec::new(),
        }
    }
}

/// Where a loaded configuration came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Parsed from this file
    File(PathBuf),
    /// Built from environment variables; no file was given
    Environment,
    /// The given file does not exist, so the environment was used
    MissingFile(PathBuf),
}

impl ServerConfig {
    /// Loads configuration from `path`, falling back to the environment.
    ///
    /// A path that does not exist is not an error: the environment is used
    /// instead and a warning is logged.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or if an
    /// environment variable holds an invalid value.
    pub fn load(path: Option<&Path>) -> VllmResult<Self> {
        let (config, source) = Self::load_with_source(path)?;
        source.log();
        Ok(config)
    }

    /// Like [`ServerConfig::load`], but reports the source instead of logging it.
    ///
    /// Callers that install a subscriber after reading the configuration use
    /// this to log the fallback once logging is up.
    ///
    /// # Errors
    ///
    /// Same as [`ServerConfig::load`].
    pub fn load_with_source(path: Option<&Path>) -> VllmResult<(Self, ConfigSource)> {
        match path {
            Some(path) if path.exists() => {
                Ok((Self::from_file(path)?, ConfigSource::File(path.to_path_buf())))
            }
            Some(path) => Ok((Self::from_env()?, ConfigSource::MissingFile(path.to_path_buf()))),
            None => Ok((Self::from_env()?, ConfigSource::Environment)),
        }
    }

    /// Parses a `.json` or `.toml` file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, has another extension,
    /// or does not parse.
    pub fn from_file(path: &Path) -> VllmResult<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            ConfigError::new(format!("Failed to read {}: {}", path.display(), e))
        })?;

        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);

        let config: Self = match extension.as_deref() {
            Some("json") => serde_json::from_str(&raw).map_err(|e| {
                ConfigError::new(format!("Invalid JSON in {}: {}", path.display(), e))
            })?,
            Some("toml") => toml::from_str(&raw).map_err(|e| {
                ConfigError::new(format!("Invalid TOML in {}: {}", path.display(), e))
            })?,
            _ => {
                return Err(ConfigError::new(format!(
                    "Unsupported config format: {} (expected .json or .toml)",
                    path.display()
                ))
                .into());
            }
        };

        info!(
            path = %path.display(),
            providers = config.providers.len(),
            "Loaded configuration file"
        );
        Ok(config)
    }

    /// Builds configuration from process environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable holds an invalid value.
    pub fn from_env() -> VllmResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds configuration from an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns a config error if `VLLM_MCP_PORT` is invalid, or a transport
    /// error if `VLLM_MCP_TRANSPORT` names an unknown transport.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> VllmResult<Self> {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        if let Some(host) = var("VLLM_MCP_HOST") {
            config.host = host;
        }
        if let Some(port) = var("VLLM_MCP_PORT") {
            config.port = port
                .trim()
                .parse::<u16>()
                .map_err(|e| ConfigError::new(format!("Invalid VLLM_MCP_PORT '{}': {}", port, e)))?;
        }
        if let Some(transport) = var("VLLM_MCP_TRANSPORT") {
            config.transport = TransportKind::from_name(&transport)?;
        }
        if let Some(level) = var("VLLM_MCP_LOG_LEVEL") {
            config.log_level = level;
        }

        config.providers = [ProviderType::OpenAI, ProviderType::Dashscope]
            .into_iter()
            .map(|provider_type| provider_from_lookup(provider_type, &var))
            .collect();

        debug!(
            configured = config
                .providers
                .iter()
                .filter(|p| p.has_credentials())
                .count(),
            "Built configuration from environment"
        );
        Ok(config)
    }

    /// `tracing` filter directive for the configured log level.
    ///
    /// Accepts DEBUG, INFO, WARNING (or WARN) and ERROR in any case; anything
    /// else falls back to `info`.
    pub fn log_filter(&self) -> &'static str {
        match self.log_level.trim().to_ascii_uppercase().as_str() {
            "TRACE" => "trace",
            "DEBUG" => "debug",
            "WARNING" | "WARN" => "warn",
            "ERROR" | "CRITICAL" => "error",
            _ => "info",
        }
    }
}

impl ConfigSource {
    /// Logs where the configuration came from.
    pub fn log(&self) {
        match self {
            ConfigSource::File(path) => debug!(path = %path.display(), "Configuration source"),
            ConfigSource::Environment => debug!("Configuration from environment"),
            ConfigSource::MissingFile(path) => {
                warn!(path = %path.display(), "Config file not found, using environment");
            }
        }
    }
}

fn provider_from_lookup(
    provider_type: ProviderType,
    var: &impl Fn(&str) -> Option<String>,
) -> ProviderConfig {
    let prefix = provider_type.as_str().to_ascii_uppercase();
    let key = |suffix: &str| format!("{}_{}", prefix, suffix);

    let mut config = ProviderConfig::new(provider_type, var(&key("API_KEY")).unwrap_or_default());
    config.base_url = var(&key("BASE_URL"));
    config.default_model = Some(
        var(&key("DEFAULT_MODEL"))
            .unwrap_or_else(|| provider_type.builtin_default_model().to_string()),
    );
    config.supported_models = Some(
        var(&key("SUPPORTED_MODELS"))
            .map(|raw| parse_model_list(&raw))
            .unwrap_or_else(|| {
                provider_type
                    .builtin_supported_models()
                    .iter()
                    .map(|m| m.to_string())
                    .collect()
            }),
    );
    config
}
