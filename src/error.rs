//! Error types for pgscript.
//!
//! Defines the main error enum used throughout the application.

use thiserror::Error;

/// Main error type for pgscript operations.
#[derive(Error, Debug)]
pub enum ScriptError {
    /// Configuration errors (unreadable config file, missing required keys, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Database connection errors (host unreachable, auth failed, etc.)
    #[error("Connection error: {0}")]
    Connection(String),

    /// A single statement failed to execute (syntax errors, constraint violations, etc.)
    #[error("Statement error: {0}")]
    Statement(String),

    /// A result could not be rendered (malformed rows, output write failure).
    #[error("Render error: {0}")]
    Render(String),

    /// The SQL script could not be read.
    #[error("I/O error: {0}")]
    Io(String),
}

impl ScriptError {
    /// Creates a configuration error with the given message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Creates a connection error with the given message.
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::Connection(msg.into())
    }

    /// Creates a statement execution error with the given message.
    pub fn statement(msg: impl Into<String>) -> Self {
        Self::Statement(msg.into())
    }

    /// Creates a render error with the given message.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Creates an I/O error with the given message.
    pub fn io(msg: impl Into<String>) -> Self {
        Self::Io(msg.into())
    }

    /// Returns the error category as a string for display purposes.
    pub fn category(&self) -> &'static str {
        match self {
            Self::Config(_) => "Configuration Error",
            Self::Connection(_) => "Connection Error",
            Self::Statement(_) => "Statement Error",
            Self::Render(_) => "Render Error",
            Self::Io(_) => "I/O Error",
        }
    }

    /// Returns true if the error should abort the whole run.
    ///
    /// Statement and render failures only affect the statement that caused them.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Config(_) | Self::Connection(_) | Self::Io(_))
    }
}

impl From<std::io::Error> for ScriptError {
    fn from(e: std::io::Error) -> Self {
        Self::Render(format!("Failed to write output: {e}"))
    }
}

/// Result type alias using ScriptError.
pub type Result<T> = std::result::Result<T, ScriptError>;
