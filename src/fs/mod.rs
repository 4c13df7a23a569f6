//! Filesystem module.
//!
//! Provides:
//! - Filename sanitization
//! - Path-length budgeting
//! - Dated folders, identity checks and non-overwriting moves

pub mod naming;
pub mod paths;
pub mod truncate;

pub use naming::{sanitize, split_name, SanitizeOptions, SanitizedName};
pub use paths::{archive_folder_for, ensure_dir, move_file, remove_empty_dirs, same_file};
pub use truncate::{joined_length, truncate, truncate_with_suffix, Truncation};
