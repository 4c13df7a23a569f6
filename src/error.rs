//! Error types for the mail-archiver application.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for the application.
#[derive(Error, Debug)]
pub enum Error {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid configuration value for '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    #[error("Missing required configuration: {0}")]
    MissingConfig(String),

    // Input errors
    #[error("Not a valid folder: {}", .0.display())]
    InvalidFolder(PathBuf),

    // File system errors
    #[error("Failed to move '{}' to '{}': {message}", from.display(), to.display())]
    Move {
        from: PathBuf,
        to: PathBuf,
        message: String,
    },

    #[error("Destination appeared before the move could complete: {}", .0.display())]
    DestinationExists(PathBuf),

    #[error("No safe destination: {0}")]
    Unresolvable(#[from] crate::dedup::Unresolvable),

    // Report errors
    #[error("Report error: {0}")]
    Report(String),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Directory walk error: {0}")]
    Walk(#[from] walkdir::Error),

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Process exit codes.
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const CONFIG_ERROR: i32 = 2;
    pub const IO_ERROR: i32 = 3;
    pub const SOME_FILES_FAILED: i32 = 4;
    pub const UNEXPECTED_ERROR: i32 = 5;
}
