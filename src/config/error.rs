use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
/// Errors raised while loading or validating configuration.
pub enum ConfigError {
    /// Port value was not a number.
    #[error("invalid port value '{value}': {source}")]
    PortParseError {
        /// Raw value.
        value: String,
        /// Parse error.
        source: std::num::ParseIntError,
    },

    /// Port 0 is not bindable here.
    #[error("port must be between 1 and 65535, got '{value}'")]
    InvalidPort {
        /// Raw value.
        value: String,
    },

    /// Bind address did not parse.
    #[error("invalid bind address '{value}': {source}")]
    InvalidBindAddr {
        /// Raw value.
        value: String,
        /// Parse error.
        source: std::net::AddrParseError,
    },

    /// A configured path does not exist.
    #[error("path not found: {path}")]
    PathNotFound {
        /// Missing path.
        path: PathBuf,
    },

    /// Expected a file, found something else.
    #[error("not a file: {path}")]
    NotAFile {
        /// Offending path.
        path: PathBuf,
    },

    /// A numeric setting was out of range.
    #[error("invalid value for {var}: '{value}'")]
    InvalidValue {
        /// Environment variable name.
        var: String,
        /// Raw value.
        value: String,
    },
}
