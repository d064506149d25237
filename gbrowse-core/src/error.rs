//! Error types shared by every gbrowse-core component

use thiserror::Error;

/// Errors raised while resolving locations or planning a render
#[derive(Debug, Error)]
pub enum BrowseError {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    #[error("Database error: {message}")]
    Database { message: String },

    #[error("Parsing error in {source_name}: {message}")]
    Parse { source_name: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl BrowseError {
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config { message: message.into() }
    }

    pub fn invalid_input<S: Into<String>>(message: S) -> Self {
        Self::InvalidInput { message: message.into() }
    }

    pub fn database<S: Into<String>>(message: S) -> Self {
        Self::Database { message: message.into() }
    }

    pub fn parse<S: Into<String>, M: Into<String>>(source_name: S, message: M) -> Self {
        Self::Parse {
            source_name: source_name.into(),
            message: message.into(),
        }
    }
}

impl From<toml::de::Error> for BrowseError {
    fn from(err: toml::de::Error) -> Self {
        Self::config(format!("TOML parsing error: {}", err))
    }
}

impl From<toml::ser::Error> for BrowseError {
    fn from(err: toml::ser::Error) -> Self {
        Self::config(format!("TOML serialization error: {}", err))
    }
}

impl From<regex::Error> for BrowseError {
    fn from(err: regex::Error) -> Self {
        Self::invalid_input(format!("bad pattern: {}", err))
    }
}

/// Result type for gbrowse-core operations
pub type BrowseResult<T> = Result<T, BrowseError>;
