//! Archiving module.
//!
//! Provides:
//! - Candidate enumeration
//! - The per-file date, resolve and move pipeline
//! - Dated archiving, flattening and header-based renaming runs
//! - Per-run statistics

pub mod file;
pub mod flatten;
pub mod rename;
pub mod scan;
pub mod state;

use std::path::Path;

use indicatif::ProgressBar;
use tracing::{debug, error, info};

use crate::config::Config;
use crate::dedup::Resolver;
use crate::error::{Error, Result};

pub use file::{
    file_date, is_in_folder, modified_date, place_file, place_file_as, target_folder, DateSource,
    FileDate, Placement,
};
pub use flatten::flatten_folder;
pub use rename::{name_part, rename_messages, RenameOutcome};
pub use scan::{scan, Scan, ScanScope};
pub use state::{FileFailure, RenameState, RunState};

/// Move the files of `folder` into `<archive_root>/<YYYY>/<YYYY-MM>`.
///
/// Per-file failures are logged and counted; only problems with the folder
/// itself are returned as errors.
pub fn archive_folder(
    folder: &Path,
    config: &Config,
    dry_run: bool,
    bar: &ProgressBar,
) -> Result<RunState> {
    if !folder.is_dir() {
        return Err(Error::InvalidFolder(folder.to_path_buf()));
    }
    let archive_root = config.archive.archive_root_for(folder);
    if !archive_root.is_dir() {
        return Err(Error::InvalidFolder(archive_root));
    }

    let mut state = RunState::new(dry_run);
    let resolver = Resolver::new(config.naming.resolver_options());
    let scope = ScanScope::from_recursive(config.archive.recursive);

    info!(
        "Archiving {} into {}{}",
        folder.display(),
        archive_root.display(),
        if dry_run { " (dry run)" } else { "" }
    );

    let found = scan(folder, scope, &config.archive)?;
    state.skipped = found.skipped.len() as u64;
    for skipped in &found.skipped {
        info!("Skipping sidecar file {}", skipped.display());
    }

    bar.set_length(found.files.len() as u64);
    for source in &found.files {
        state.scanned += 1;
        let (target_dir, date) = target_folder(source, &archive_root);
        debug!(
            "{} dated {} ({:?})",
            source.display(),
            date.date,
            date.source
        );

        if is_in_folder(source, &target_dir) {
            info!("{} is already in {}", source.display(), target_dir.display());
            state.already_in_place += 1;
            bar.inc(1);
            continue;
        }

        match place_file(&resolver, source, &target_dir, dry_run) {
            Ok(placement) => flatten::record(&mut state, &placement),
            Err(e) => {
                error!(
                    "Failed to archive {} into {}: {}",
                    source.display(),
                    target_dir.display(),
                    e
                );
                state.record_failure(source.clone(), target_dir, e.to_string());
            }
        }
        bar.inc(1);
    }

    Ok(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::tempdir;

    fn eml(date: &str) -> String {
        format!("From: a@example.com\r\nDate: {}\r\nSubject: x\r\n\r\nbody\r\n", date)
    }

    #[test]
    fn test_archive_top_level() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        fs::write(root.join("msg 0042 Invoice.eml"), eml("Fri, 15 Mar 2024 10:30:00 +0000")).unwrap();
        fs::write(root.join("other.eml"), eml("Tue, 2 Jul 2019 09:15:00 +0200")).unwrap();
        fs::write(root.join("sync.ffs_db"), b"db").unwrap();
        fs::create_dir_all(root.join("inbox")).unwrap();
        fs::write(root.join("inbox").join("nested.eml"), eml("Fri, 15 Mar 2024 10:30:00 +0000")).unwrap();

        let state = archive_folder(root, &Config::default(), false, &ProgressBar::hidden()).unwrap();

        assert_eq!(state.moved, 2);
        assert_eq!(state.skipped, 1);
        assert!(!state.has_failures());
        assert!(root.join("2024").join("2024-03").join("42 Invoice.eml").exists());
        assert!(root.join("2019").join("2019-07").join("other.eml").exists());
        assert!(root.join("sync.ffs_db").exists());
        assert!(root.join("inbox").join("nested.eml").exists());
    }

    #[test]
    fn test_archive_recursive_skips_correctly_placed() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        let placed = root.join("2024").join("2024-03");
        fs::create_dir_all(&placed).unwrap();
        fs::write(placed.join("a.eml"), eml("Fri, 15 Mar 2024 10:30:00 +0000")).unwrap();
        fs::create_dir_all(root.join("inbox")).unwrap();
        fs::write(root.join("inbox").join("a.eml"), eml("Sat, 16 Mar 2024 08:00:00 +0000")).unwrap();

        let mut config = Config::default();
        config.archive.recursive = true;
        let state = archive_folder(root, &config, false, &ProgressBar::hidden()).unwrap();

        assert_eq!(state.already_in_place, 1);
        assert_eq!(state.moved, 1);
        assert_eq!(state.renamed, 1);
        assert!(placed.join("a.eml").exists());
        assert!(placed.join("a_1.eml").exists());
    }

    #[test]
    fn test_archive_into_separate_root() {
        let inbox = tempdir().unwrap();
        let archive = tempdir().unwrap();
        fs::write(inbox.path().join("a.eml"), eml("Fri, 15 Mar 2024 10:30:00 +0000")).unwrap();

        let mut config = Config::default();
        config.archive.archive_root = Some(archive.path().to_path_buf());
        let state = archive_folder(inbox.path(), &config, false, &ProgressBar::hidden()).unwrap();

        assert_eq!(state.moved, 1);
        assert!(archive.path().join("2024").join("2024-03").join("a.eml").exists());
    }

    #[test]
    fn test_archive_truncates_long_names() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        let long = format!("{}.eml", "x".repeat(40));
        fs::write(root.join(&long), eml("Fri, 15 Mar 2024 10:30:00 +0000")).unwrap();
        fs::write(root.join("b.eml"), eml("Fri, 15 Mar 2024 10:30:00 +0000")).unwrap();

        // Budget leaves room for "b.eml" but not for anything past the folder.
        let target = root.join("2024").join("2024-03");
        let mut config = Config::default();
        config.naming.safety_margin = 0;
        config.naming.max_path_length = target.to_string_lossy().chars().count() + 1 + 5;
        let state = archive_folder(root, &config, false, &ProgressBar::hidden()).unwrap();

        assert_eq!(state.moved, 2);
        assert_eq!(state.anomalies, 1);
        assert!(target.join("b.eml").exists());
        assert!(target.join("x.eml").exists());
    }

    #[test]
    fn test_archive_unresolvable_is_counted() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        fs::write(root.join("a.eml"), eml("Fri, 15 Mar 2024 10:30:00 +0000")).unwrap();

        let target = root.join("2024").join("2024-03");
        let mut config = Config::default();
        config.naming.safety_margin = 0;
        config.naming.max_path_length = target.to_string_lossy().chars().count() + 3;
        let state = archive_folder(root, &config, false, &ProgressBar::hidden()).unwrap();

        assert_eq!(state.failed, 1);
        assert_eq!(state.failures[0].source, root.join("a.eml"));
        assert_eq!(state.failures[0].target_dir, target);
        assert!(root.join("a.eml").exists());
    }

    #[test]
    fn test_archive_missing_folder() {
        let err = archive_folder(
            &PathBuf::from("/definitely/not/here"),
            &Config::default(),
            false,
            &ProgressBar::hidden(),
        )
        .unwrap_err();
        assert!(matches!(err, Error::InvalidFolder(_)));
    }
}
