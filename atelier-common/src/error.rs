//! Common error types for Atelier

use thiserror::Error;

/// Result alias used by config loading and color parsing
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by `atelier-common`
#[derive(Error, Debug)]
pub enum Error {
    /// Reading or writing the config file failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Config file could not be parsed or serialized
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid user input (e.g. a malformed hex color)
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
