//! Error types for geoexplorer

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExplorerError {
    // Gateway errors
    #[error("Request failed{}: {message}", .status.map(|s| format!(" ({s})")).unwrap_or_default())]
    NetworkFailure { status: Option<u16>, message: String },

    #[error("Not found: {resource}")]
    NotFound { resource: String },

    // Input errors
    #[error("Invalid input: {reason}")]
    InvalidInput { reason: String },

    #[error("Invalid GeoJSON type: {kind}")]
    InvalidGeometryType { kind: String },

    // Event stream errors
    #[error("Event stream error: {reason}")]
    StreamError { reason: String },

    // Configuration errors
    #[error("Missing required configuration: {key}")]
    ConfigMissing { key: String },

    #[error("Invalid configuration value for {key}: {reason}")]
    ConfigInvalid { key: String, reason: String },

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl ExplorerError {
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound { resource: resource.into() }
    }

    pub fn invalid_input(reason: impl Into<String>) -> Self {
        Self::InvalidInput { reason: reason.into() }
    }

    /// True for the input class of errors (`InvalidInput`, `InvalidGeometryType`)
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, Self::InvalidInput { .. } | Self::InvalidGeometryType { .. })
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

impl From<serde_json::Error> for ExplorerError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ExplorerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_network_failure_display() {
        let err = ExplorerError::NetworkFailure { status: Some(503), message: "unavailable".into() };
        assert_eq!(err.to_string(), "Request failed (503): unavailable");

        let err = ExplorerError::NetworkFailure { status: None, message: "refused".into() };
        assert_eq!(err.to_string(), "Request failed: refused");
    }

    #[test]
    fn test_error_classes() {
        assert!(ExplorerError::InvalidGeometryType { kind: "Circle".into() }.is_invalid_input());
        assert!(ExplorerError::not_found("filter/1").is_not_found());
        assert!(!ExplorerError::invalid_input("x").is_not_found());
    }
}
