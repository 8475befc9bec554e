use crate::error::{ExplorerError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_API_URL: &str = "http://localhost:8080/api/v1";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Configuration source for tracking where values come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigSource {
    /// Default value
    Default,
    /// Loaded from config file
    File,
    /// Loaded from environment variable
    Environment,
    /// Provided via CLI argument
    Cli,
}

impl ConfigSource {
    /// Returns the precedence level (higher = higher priority)
    pub fn precedence(&self) -> u8 {
        match self {
            ConfigSource::Default => 0,
            ConfigSource::File => 1,
            ConfigSource::Environment => 2,
            ConfigSource::Cli => 3,
        }
    }
}

/// A configuration value with its source
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigValue<T> {
    pub value: T,
    pub source: ConfigSource,
}

impl<T> ConfigValue<T> {
    pub fn new(value: T, source: ConfigSource) -> Self {
        Self { value, source }
    }

    /// Update the value if the new source has higher precedence
    pub fn update(&mut self, value: T, source: ConfigSource) {
        if source.precedence() > self.source.precedence() {
            self.value = value;
            self.source = source;
        }
    }
}

/// Layered configuration for the explorer client
#[derive(Debug, Clone)]
pub struct LayeredConfig {
    /// Base URL of the backend REST API
    pub api_url: ConfigValue<String>,
    /// File holding the last seen event stream timestamp
    pub timestamp_path: ConfigValue<PathBuf>,
    /// Leave the selected condition out of the editing conditions layer
    pub exclude_selected_condition: ConfigValue<bool>,
    /// Per-request timeout for gateway calls
    pub request_timeout_secs: ConfigValue<u64>,
}

impl LayeredConfig {
    /// Create a new configuration with default values
    pub fn with_defaults() -> Self {
        Self {
            api_url: ConfigValue::new(DEFAULT_API_URL.to_string(), ConfigSource::Default),
            timestamp_path: ConfigValue::new(
                env::temp_dir().join("geoexplorer-sse-timestamp"),
                ConfigSource::Default,
            ),
            exclude_selected_condition: ConfigValue::new(false, ConfigSource::Default),
            request_timeout_secs: ConfigValue::new(
                DEFAULT_REQUEST_TIMEOUT_SECS,
                ConfigSource::Default,
            ),
        }
    }

    /// Load configuration from a TOML file
    pub fn load_from_file<P: AsRef<Path>>(mut self, path: P) -> Result<Self> {
        let content =
            fs::read_to_string(path.as_ref()).map_err(|e| ExplorerError::ConfigInvalid {
                key: "file".to_string(),
                reason: format!("Failed to read config file: {}", e),
            })?;

        let file_config: FileConfig =
            toml::from_str(&content).map_err(|e| ExplorerError::ConfigInvalid {
                key: "file".to_string(),
                reason: format!("Failed to parse TOML: {}", e),
            })?;

        if let Some(api_url) = file_config.api_url {
            self.api_url.update(api_url, ConfigSource::File);
        }

        if let Some(timestamp_path) = file_config.timestamp_path {
            self.timestamp_path.update(timestamp_path, ConfigSource::File);
        }

        if let Some(exclude) = file_config.exclude_selected_condition {
            self.exclude_selected_condition.update(exclude, ConfigSource::File);
        }

        if let Some(timeout) = file_config.request_timeout_secs {
            self.request_timeout_secs.update(timeout, ConfigSource::File);
        }

        Ok(self)
    }

    /// Load configuration from environment variables
    pub fn load_from_env(mut self) -> Self {
        // GEOEXPLORER_API_URL
        if let Ok(api_url) = env::var("GEOEXPLORER_API_URL") {
            self.api_url.update(api_url, ConfigSource::Environment);
        }

        // GEOEXPLORER_TIMESTAMP_PATH
        if let Ok(path) = env::var("GEOEXPLORER_TIMESTAMP_PATH") {
            self.timestamp_path.update(PathBuf::from(path), ConfigSource::Environment);
        }

        // GEOEXPLORER_EXCLUDE_SELECTED_CONDITION
        if let Ok(flag) = env::var("GEOEXPLORER_EXCLUDE_SELECTED_CONDITION") {
            match parse_bool(&flag) {
                Ok(exclude) => {
                    self.exclude_selected_condition.update(exclude, ConfigSource::Environment)
                }
                Err(_) => tracing::warn!(
                    "Invalid GEOEXPLORER_EXCLUDE_SELECTED_CONDITION value '{}': expected true or false",
                    flag
                ),
            }
        }

        // GEOEXPLORER_REQUEST_TIMEOUT
        if let Ok(timeout_str) = env::var("GEOEXPLORER_REQUEST_TIMEOUT") {
            match timeout_str.parse::<u64>() {
                Ok(timeout) => self.request_timeout_secs.update(timeout, ConfigSource::Environment),
                Err(_) => tracing::warn!(
                    "Invalid GEOEXPLORER_REQUEST_TIMEOUT value '{}': expected seconds",
                    timeout_str
                ),
            }
        }

        self
    }

    /// Update configuration from CLI arguments
    pub fn update_from_cli(&mut self, overrides: CliConfigOverrides) {
        if let Some(api_url) = overrides.api_url {
            self.api_url.update(api_url, ConfigSource::Cli);
        }

        if let Some(timestamp_path) = overrides.timestamp_path {
            self.timestamp_path.update(timestamp_path, ConfigSource::Cli);
        }

        if let Some(exclude) = overrides.exclude_selected_condition {
            self.exclude_selected_condition.update(exclude, ConfigSource::Cli);
        }

        if let Some(timeout) = overrides.request_timeout_secs {
            self.request_timeout_secs.update(timeout, ConfigSource::Cli);
        }
    }

    /// Get all configuration values as a map for inspection
    pub fn to_inspection_map(&self) -> HashMap<String, (String, ConfigSource)> {
        let mut map = HashMap::new();

        map.insert("api_url".to_string(), (self.api_url.value.clone(), self.api_url.source));

        map.insert(
            "timestamp_path".to_string(),
            (self.timestamp_path.value.display().to_string(), self.timestamp_path.source),
        );

        map.insert(
            "exclude_selected_condition".to_string(),
            (
                self.exclude_selected_condition.value.to_string(),
                self.exclude_selected_condition.source,
            ),
        );

        map.insert(
            "request_timeout_secs".to_string(),
            (self.request_timeout_secs.value.to_string(), self.request_timeout_secs.source),
        );

        map
    }
}

/// Configuration loaded from TOML file
#[derive(Debug, Deserialize, Serialize)]
struct FileConfig {
    api_url: Option<String>,
    timestamp_path: Option<PathBuf>,
    exclude_selected_condition: Option<bool>,
    request_timeout_secs: Option<u64>,
}

/// CLI configuration overrides
#[derive(Debug, Default)]
pub struct CliConfigOverrides {
    pub api_url: Option<String>,
    pub timestamp_path: Option<PathBuf>,
    pub exclude_selected_condition: Option<bool>,
    pub request_timeout_secs: Option<u64>,
}

/// Parse a boolean flag from string
pub fn parse_bool(s: &str) -> Result<bool> {
    match s.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(ExplorerError::ConfigInvalid {
            key: "flag".to_string(),
            reason: format!("Invalid boolean: {}. Use true or false", s),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = LayeredConfig::with_defaults();
        assert_eq!(config.api_url.value, DEFAULT_API_URL);
        assert_eq!(config.api_url.source, ConfigSource::Default);
        assert!(!config.exclude_selected_condition.value);
        assert_eq!(config.request_timeout_secs.value, 30);
    }

    #[test]
    fn test_config_precedence() {
        let mut value = ConfigValue::new(100, ConfigSource::Default);

        // File should override default
        value.update(200, ConfigSource::File);
        assert_eq!(value.value, 200);
        assert_eq!(value.source, ConfigSource::File);

        // Environment should override file
        value.update(300, ConfigSource::Environment);
        assert_eq!(value.value, 300);

        // CLI should override environment
        value.update(400, ConfigSource::Cli);
        assert_eq!(value.value, 400);
        assert_eq!(value.source, ConfigSource::Cli);

        // Lower precedence should not override
        value.update(500, ConfigSource::File);
        assert_eq!(value.value, 400);
        assert_eq!(value.source, ConfigSource::Cli);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
api_url = "https://data.example.org/api/v1"
exclude_selected_condition = true
request_timeout_secs = 5
"#
        )
        .unwrap();

        let config = LayeredConfig::with_defaults().load_from_file(file.path()).unwrap();

        assert_eq!(config.api_url.value, "https://data.example.org/api/v1");
        assert_eq!(config.api_url.source, ConfigSource::File);
        assert!(config.exclude_selected_condition.value);
        assert_eq!(config.request_timeout_secs.value, 5);
        assert_eq!(config.timestamp_path.source, ConfigSource::Default);
    }

    #[test]
    fn test_invalid_file_reported() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "request_timeout_secs = \"soon\"").unwrap();

        let err = LayeredConfig::with_defaults().load_from_file(file.path()).unwrap_err();
        assert!(matches!(err, ExplorerError::ConfigInvalid { .. }));
    }

    #[test]
    fn test_cli_overrides() {
        let mut config = LayeredConfig::with_defaults();

        config.update_from_cli(CliConfigOverrides {
            api_url: Some("http://other:8080/api/v1".to_string()),
            ..Default::default()
        });

        assert_eq!(config.api_url.value, "http://other:8080/api/v1");
        assert_eq!(config.api_url.source, ConfigSource::Cli);
        assert_eq!(config.exclude_selected_condition.source, ConfigSource::Default);
    }

    #[test]
    fn test_parse_bool() {
        assert!(parse_bool("TRUE").unwrap());
        assert!(parse_bool("1").unwrap());
        assert!(!parse_bool("off").unwrap());
        assert!(parse_bool("maybe").is_err());
    }

    #[test]
    fn test_inspection_map() {
        let map = LayeredConfig::with_defaults().to_inspection_map();

        assert_eq!(map.len(), 4);
        let (api_url, source) = &map["api_url"];
        assert_eq!(api_url, DEFAULT_API_URL);
        assert_eq!(*source, ConfigSource::Default);
    }
}
