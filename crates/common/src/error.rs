//! Common error types.

use thiserror::Error;

/// Main error type for the shell.
#[derive(Error, Debug)]
pub enum ShellError {
    #[error("Unsupported platform: {0}")]
    UnsupportedPlatform(String),

    #[error("Engine initialization failed: {0}")]
    Initialization(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid keybind: {0}")]
    InvalidKeybind(String),

    #[error("Engine disposal failed: {0}")]
    Disposal(String),
}

pub type ShellResult<T> = Result<T, ShellError>;

impl ShellError {
    pub fn unsupported_platform(msg: impl Into<String>) -> Self {
        Self::UnsupportedPlatform(msg.into())
    }

    pub fn initialization(msg: impl Into<String>) -> Self {
        Self::Initialization(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn keybind(msg: impl Into<String>) -> Self {
        Self::InvalidKeybind(msg.into())
    }

    pub fn disposal(msg: impl Into<String>) -> Self {
        Self::Disposal(msg.into())
    }

    /// Whether the error aborts application startup.
    pub fn is_startup_failure(&self) -> bool {
        matches!(
            self,
            Self::UnsupportedPlatform(_) | Self::Initialization(_) | Self::Io(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ShellError::unsupported_platform("plan9/mips");
        assert_eq!(err.to_string(), "Unsupported platform: plan9/mips");

        let err = ShellError::disposal("worker panicked");
        assert_eq!(err.to_string(), "Engine disposal failed: worker panicked");
    }

    #[test]
    fn test_startup_failures() {
        assert!(ShellError::initialization("boom").is_startup_failure());
        assert!(ShellError::from(std::io::Error::other("unpack")).is_startup_failure());
        assert!(!ShellError::config("bad").is_startup_failure());
        assert!(!ShellError::disposal("bad").is_startup_failure());
    }
}
