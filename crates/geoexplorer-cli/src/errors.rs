use console::style;
use geoexplorer_core::ExplorerError;
use std::fmt;

/// Error shown to the user, with suggestions on how to fix it
pub struct CliError {
    pub message: String,
    pub context: Option<String>,
    pub suggestions: Vec<String>,
    pub help_command: Option<String>,
}

impl CliError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            context: None,
            suggestions: Vec::new(),
            help_command: None,
        }
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestions.push(suggestion.into());
        self
    }

    pub fn with_help(mut self, command: impl Into<String>) -> Self {
        self.help_command = Some(command.into());
        self
    }

    pub fn display(&self) {
        eprintln!("{} {}\n", style("✗").red().bold(), style(&self.message).red().bold());

        if let Some(ref context) = self.context {
            eprintln!("{}", context);
            eprintln!();
        }

        if !self.suggestions.is_empty() {
            eprintln!("{}", style("To fix this:").yellow().bold());
            for (i, suggestion) in self.suggestions.iter().enumerate() {
                eprintln!("  {}. {}", i + 1, suggestion);
            }
            eprintln!();
        }

        if let Some(ref help_cmd) = self.help_command {
            eprintln!("{} {}", style("Need help?").cyan(), style(help_cmd).cyan().bold());
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl fmt::Debug for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

/// Backend could not be reached or answered with an error status
pub fn backend_unreachable(status: Option<u16>, detail: &str) -> CliError {
    let message = match status {
        Some(status) => format!("Backend answered with status {}", status),
        None => "Cannot reach the backend".to_string(),
    };
    CliError::new(message)
        .with_context(format!("Error: {}", detail))
        .with_suggestion("Check that the backend is running")
        .with_suggestion("Point at another server: --api-url http://host:8080/api/v1")
        .with_suggestion("Or set GEOEXPLORER_API_URL, or api_url in geoexplorer.toml")
        .with_help("Run: geoexplorer config")
}

/// Requested resource does not exist on the backend
pub fn resource_not_found(resource: &str) -> CliError {
    CliError::new("Not found")
        .with_context(format!("The backend has no {}.", resource))
        .with_suggestion("Check the id and try again")
        .with_suggestion("List what exists: geoexplorer datasets list, geoexplorer working-sets list")
}

/// Input that is not GeoJSON the explorer can use
pub fn invalid_geojson(reason: &str) -> CliError {
    CliError::new("Invalid GeoJSON input")
        .with_context(format!("Error: {}", reason))
        .with_suggestion("Use a FeatureCollection, a Feature or a bare geometry")
        .with_help("Run: geoexplorer summarize --help")
}

/// Invalid configuration value
pub fn invalid_config(key: &str, reason: &str) -> CliError {
    CliError::new(format!("Invalid configuration: {}", key))
        .with_context(format!("Configuration value is invalid.\n\nReason: {}", reason))
        .with_suggestion("Check geoexplorer.toml for syntax errors")
        .with_suggestion("Check GEOEXPLORER_* environment variables")
        .with_help("Run: geoexplorer config")
}

/// Convert anyhow::Error to CliError with context
pub fn from_anyhow(error: anyhow::Error) -> CliError {
    if let Some(explorer) = error.chain().find_map(|cause| cause.downcast_ref::<ExplorerError>()) {
        let cli_error = match explorer {
            ExplorerError::NetworkFailure { status, message } => Some(backend_unreachable(*status, message)),
            ExplorerError::NotFound { resource } => Some(resource_not_found(resource)),
            ExplorerError::InvalidGeometryType { .. } => Some(invalid_geojson(&explorer.to_string())),
            ExplorerError::ConfigInvalid { key, reason } => Some(invalid_config(key, reason)),
            _ => None,
        };
        if let Some(cli_error) = cli_error {
            return cli_error;
        }
    }

    let message = error.to_string();
    if message.contains("No such file or directory") {
        CliError::new("File not found")
            .with_context(format!("Error: {:#}", error))
            .with_suggestion("Check the file path and try again")
    } else {
        CliError::new(message).with_context(format!("Error: {:#}", error))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn test_network_failure_gets_backend_hints() {
        let error = anyhow::Error::new(ExplorerError::NetworkFailure {
            status: Some(502),
            message: "bad gateway".into(),
        });
        let cli_error = from_anyhow(error);
        assert_eq!(cli_error.message, "Backend answered with status 502");
        assert!(cli_error.suggestions.iter().any(|s| s.contains("--api-url")));
    }

    #[test]
    fn test_not_found_behind_context() {
        let error = Err::<(), _>(ExplorerError::not_found("dataset abc"))
            .context("Failed to load dataset")
            .unwrap_err();
        let cli_error = from_anyhow(error);
        assert_eq!(cli_error.message, "Not found");
        assert!(cli_error.context.unwrap().contains("dataset abc"));
    }

    #[test]
    fn test_other_errors_keep_message() {
        let cli_error = from_anyhow(anyhow::anyhow!("--clamp takes exactly two values: MIN,MAX"));
        assert_eq!(cli_error.message, "--clamp takes exactly two values: MIN,MAX");
        assert!(cli_error.suggestions.is_empty());
    }
}
