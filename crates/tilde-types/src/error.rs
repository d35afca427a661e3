//! Error types for the Tilde console.

use std::io;

/// Errors produced by the Tilde console crates.
#[derive(Debug, thiserror::Error)]
pub enum TildeError {
    /// Command name not found at dispatch time.
    #[error("unknown command: {0}")]
    UnknownCommand(String),

    /// A handler failed while executing.
    #[error("command error: {0}")]
    Command(String),

    /// A command could not be registered (logged and skipped, never fatal).
    #[error("registration error: {0}")]
    Registration(String),

    /// No route matched a remote request path/method.
    #[error("no route for: {0}")]
    RouteNotFound(String),

    /// A remote request failed while being fulfilled.
    #[error("remote error: {0}")]
    Remote(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, TildeError>;
