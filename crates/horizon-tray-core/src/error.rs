//! Error types for Horizon Tray.

use thiserror::Error;

/// The main error type for Horizon Tray operations.
///
/// Most of the tray API is infallible by design: unknown identifiers are
/// ignored and repeated quits collapse into one. The variants here cover
/// host programming errors and failures reported by presentation backends.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TrayError {
    /// The presentation loop is already running elsewhere or has finished.
    #[error("presentation loop is already running or has finished")]
    LoopUnavailable,

    /// A configuration value was rejected.
    #[error("invalid tray configuration: {0}")]
    InvalidConfig(String),

    /// Raw icon data did not match its declared dimensions.
    #[error("invalid icon data: {0}")]
    InvalidIcon(String),

    /// A presentation backend failed to initialize.
    #[error("presentation error: {0}")]
    Presentation(String),

    /// The logging subscriber could not be installed.
    #[error("failed to initialize logging: {0}")]
    Logging(String),
}

/// A specialized Result type for Horizon Tray operations.
pub type Result<T> = std::result::Result<T, TrayError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(
            TrayError::LoopUnavailable.to_string(),
            "presentation loop is already running or has finished"
        );

        let err = TrayError::InvalidConfig("poll interval must be non-zero".to_string());
        assert!(err.to_string().contains("poll interval"));

        let err = TrayError::InvalidIcon("expected 16 bytes".to_string());
        assert!(err.to_string().starts_with("invalid icon data"));
    }
}
