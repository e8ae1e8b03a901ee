//! Error types for the core crate

use thiserror::Error;

/// Core error type
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("Invalid version string: {0:?}")]
    InvalidVersion(String),
}

/// Result type alias for core operations
pub type Result<T> = std::result::Result<T, CoreError>;

impl CoreError {
    /// Get a user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            CoreError::Io(e) => format!("File operation failed: {}", e),
            CoreError::InvalidVersion(v) => {
                format!("'{}' is not a major.minor.build version", v)
            }
            _ => self.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_message() {
        let err = CoreError::InvalidVersion("2019.x".into());
        assert_eq!(err.user_message(), "'2019.x' is not a major.minor.build version");

        let err = CoreError::Config("bad".into());
        assert_eq!(err.user_message(), "Configuration error: bad");
    }
}
