//! Folder reports.
//!
//! Provides:
//! - Two-folder comparison
//! - Numbered-file gap checks

pub mod count;
pub mod diff;

use std::fs;
use std::path::Path;

use crate::error::{Error, Result};

pub use count::{count_numbered, default_report_path, CountReport, Gap};
pub use diff::{diff_folders, md5_file, DiffReport};

/// Write a rendered report, creating parent folders as needed.
pub fn write_report(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, content)
        .map_err(|e| Error::Report(format!("Cannot write {}: {}", path.display(), e)))
}
