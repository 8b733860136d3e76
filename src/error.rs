//! Error types for game data and preference loading.

use thiserror::Error;

/// Errors that can occur when loading RON game data or headless run configs.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// File could not be read.
    #[error("Failed to read file '{path}': {details}")]
    ReadError { path: String, details: String },

    /// RON or JSON parsing failed.
    #[error("Parse error in '{path}': {details}")]
    ParseError { path: String, details: String },

    /// The data parsed but breaks a game rule.
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    /// A name in the config does not match any definition.
    #[error("Unknown {kind}: '{name}'")]
    UnknownName { kind: &'static str, name: String },
}

/// Errors raised by the local preference store.
#[derive(Debug, Error)]
pub enum PrefsError {
    /// Store file could not be written.
    #[error("Failed to write preferences to '{path}': {details}")]
    WriteError { path: String, details: String },

    /// Store contents could not be serialized.
    #[error("Failed to serialize preferences: {0}")]
    Serialize(String),
}
