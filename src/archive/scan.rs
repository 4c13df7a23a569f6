//! Candidate file enumeration.

use std::path::{Path, PathBuf};

use tracing::warn;
use walkdir::WalkDir;

use crate::config::ArchiveConfig;
use crate::error::Result;

/// Which part of a folder tree to enumerate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanScope {
    /// Files directly inside the folder.
    TopLevel,
    /// Files at any depth.
    Recursive,
    /// Files inside subfolders only.
    Subfolders,
}

impl ScanScope {
    pub fn from_recursive(recursive: bool) -> Self {
        if recursive {
            ScanScope::Recursive
        } else {
            ScanScope::TopLevel
        }
    }
}

/// Result of enumerating a folder.
#[derive(Debug, Default, Clone)]
pub struct Scan {
    /// Files to process, in a stable order.
    pub files: Vec<PathBuf>,
    /// Sidecar files left alone.
    pub skipped: Vec<PathBuf>,
}

/// Enumerate files under `folder`.
///
/// Excluded folders are never entered. Entries that cannot be read are
/// logged and left out.
pub fn scan(folder: &Path, scope: ScanScope, archive: &ArchiveConfig) -> Result<Scan> {
    let mut result = Scan::default();

    let (min_file_depth, max_depth) = match scope {
        ScanScope::TopLevel => (1, 1),
        ScanScope::Recursive => (1, usize::MAX),
        ScanScope::Subfolders => (2, usize::MAX),
    };

    // Folders at depth 1 must reach the filter, so the walk always starts
    // there and shallow files are dropped below.
    let walker = WalkDir::new(folder)
        .min_depth(1)
        .max_depth(max_depth)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| {
            entry.depth() == 0
                || !entry.file_type().is_dir()
                || !archive.is_excluded_folder(&entry.file_name().to_string_lossy())
        });

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Cannot read entry under {}: {}", folder.display(), e);
                continue;
            }
        };

        if !entry.file_type().is_file() || entry.depth() < min_file_depth {
            continue;
        }

        let path = entry.into_path();
        if archive.is_skipped_file(&path) {
            result.skipped.push(path);
        } else {
            result.files.push(path);
        }
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn tree() -> tempfile::TempDir {
        let dir = tempdir().unwrap();
        let root = dir.path();
        fs::write(root.join("b.eml"), b"b").unwrap();
        fs::write(root.join("a.pdf"), b"a").unwrap();
        fs::write(root.join("sync.ffs_db"), b"db").unwrap();
        fs::create_dir_all(root.join("inbox").join("deep")).unwrap();
        fs::write(root.join("inbox").join("c.eml"), b"c").unwrap();
        fs::write(root.join("inbox").join("deep").join("d.txt"), b"d").unwrap();
        fs::create_dir_all(root.join("ERROS")).unwrap();
        fs::write(root.join("ERROS").join("run.log"), b"log").unwrap();
        fs::create_dir_all(root.join("Anos Anteriores")).unwrap();
        fs::write(root.join("Anos Anteriores").join("old.eml"), b"old").unwrap();
        dir
    }

    fn names(files: &[PathBuf], root: &Path) -> Vec<String> {
        files
            .iter()
            .map(|p| p.strip_prefix(root).unwrap().to_string_lossy().replace('\\', "/"))
            .collect()
    }

    #[test]
    fn test_top_level() {
        let dir = tree();
        let scan = scan(dir.path(), ScanScope::TopLevel, &ArchiveConfig::default()).unwrap();
        assert_eq!(names(&scan.files, dir.path()), vec!["a.pdf", "b.eml"]);
        assert_eq!(names(&scan.skipped, dir.path()), vec!["sync.ffs_db"]);
    }

    #[test]
    fn test_recursive_skips_excluded_folders() {
        let dir = tree();
        let scan = scan(dir.path(), ScanScope::Recursive, &ArchiveConfig::default()).unwrap();
        let mut found = names(&scan.files, dir.path());
        found.sort();
        assert_eq!(
            found,
            vec!["a.pdf", "b.eml", "inbox/c.eml", "inbox/deep/d.txt"]
        );
    }

    #[test]
    fn test_subfolders_only() {
        let dir = tree();
        let scan = scan(dir.path(), ScanScope::Subfolders, &ArchiveConfig::default()).unwrap();
        let mut found = names(&scan.files, dir.path());
        found.sort();
        assert_eq!(found, vec!["inbox/c.eml", "inbox/deep/d.txt"]);
        assert!(scan.skipped.is_empty());
    }

    #[test]
    fn test_subfolders_never_enter_excluded_folders() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("ERROS")).unwrap();
        fs::write(root.join("ERROS").join("archive_20240101000000.log"), b"log").unwrap();
        fs::create_dir_all(root.join("Anos Anteriores").join("2019")).unwrap();
        fs::write(root.join("Anos Anteriores").join("2019").join("a.eml"), b"a").unwrap();

        let scan = scan(root, ScanScope::Subfolders, &ArchiveConfig::default()).unwrap();
        assert!(scan.files.is_empty());
        assert!(scan.skipped.is_empty());
    }
}
