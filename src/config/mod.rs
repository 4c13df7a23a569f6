//! Configuration module for the mail-archiver.
//!
//! This module handles:
//! - Loading configuration from TOML files
//! - Naming policy enums
//! - Configuration validation

pub mod loader;
pub mod modes;
pub mod validation;

pub use loader::{ArchiveConfig, Config, NamingConfig, RenameConfig, CONFIG_FILE_NAME};
pub use modes::{CounterStyle, LengthUnit};
pub use validation::{validate_config, validate_range};
