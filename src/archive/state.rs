//! Per-run state tracking.

use std::path::PathBuf;

use serde::Serialize;

/// A file that could not be placed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileFailure {
    pub source: PathBuf,
    pub target_dir: PathBuf,
    pub reason: String,
}

/// Counters for one `archive` or `flatten` run.
#[derive(Debug, Default, Clone, Serialize)]
pub struct RunState {
    // What was looked at
    pub scanned: u64,
    pub skipped: u64,

    // What happened to it
    pub moved: u64,
    pub renamed: u64,
    pub planned: u64,
    pub already_in_place: u64,
    pub failed: u64,

    /// Sanitization, truncation and renaming events across all files.
    pub anomalies: u64,

    pub failures: Vec<FileFailure>,

    /// Folders pruned after flattening.
    pub removed_dirs: u64,

    pub dry_run: bool,
}

impl RunState {
    pub fn new(dry_run: bool) -> Self {
        Self {
            dry_run,
            ..Default::default()
        }
    }

    /// Record a file that could not be placed.
    pub fn record_failure(&mut self, source: PathBuf, target_dir: PathBuf, reason: String) {
        self.failed += 1;
        self.failures.push(FileFailure {
            source,
            target_dir,
            reason,
        });
    }

    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }

    /// Files moved, or that would have been moved in a dry run.
    pub fn total_placed(&self) -> u64 {
        self.moved + self.planned
    }
}

/// Counters for one `rename` run.
#[derive(Debug, Default, Clone, Serialize)]
pub struct RenameState {
    pub scanned: u64,
    /// Files that are not messages, and sidecars.
    pub skipped: u64,

    pub renamed: u64,
    pub already_named: u64,
    pub duplicates: u64,
    pub problems: u64,
    pub failed: u64,

    pub anomalies: u64,
    pub failures: Vec<FileFailure>,

    pub dry_run: bool,
}

impl RenameState {
    pub fn new(dry_run: bool) -> Self {
        Self {
            dry_run,
            ..Default::default()
        }
    }

    /// Record a message that could not be renamed or set aside.
    pub fn record_failure(&mut self, source: PathBuf, target_dir: PathBuf, reason: String) {
        self.failed += 1;
        self.failures.push(FileFailure {
            source,
            target_dir,
            reason,
        });
    }

    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }
}
