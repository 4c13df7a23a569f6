//! Two-folder comparison.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Write as _;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use md5::{Digest, Md5};
use serde::Serialize;
use walkdir::WalkDir;

use crate::config::ArchiveConfig;
use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EntryKind {
    File,
    Dir,
}

/// Differences between two folder trees, keyed by relative path.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DiffReport {
    pub left: PathBuf,
    pub right: PathBuf,
    pub only_left: Vec<String>,
    pub only_right: Vec<String>,
    /// File on one side, folder on the other.
    pub type_mismatches: Vec<String>,
    /// Common files whose content differs. Empty unless content was compared.
    pub differing: Vec<String>,
    pub common_files: u64,
    pub content_compared: bool,
}

impl DiffReport {
    pub fn is_identical(&self) -> bool {
        self.only_left.is_empty()
            && self.only_right.is_empty()
            && self.type_mismatches.is_empty()
            && self.differing.is_empty()
    }

    /// Plain-text rendering.
    pub fn render(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "=== FOLDER COMPARISON ===");
        let _ = writeln!(out, "Left:  {}", self.left.display());
        let _ = writeln!(out, "Right: {}", self.right.display());
        let _ = writeln!(out, "Common files: {}", self.common_files);

        section(&mut out, &format!("Only in {}", self.left.display()), &self.only_left);
        section(&mut out, &format!("Only in {}", self.right.display()), &self.only_right);
        section(&mut out, "File on one side, folder on the other", &self.type_mismatches);
        if self.content_compared {
            section(&mut out, "Different content", &self.differing);
        }

        out
    }
}

fn section(out: &mut String, title: &str, items: &[String]) {
    let _ = writeln!(out, "\n{} ({}):", title, items.len());
    if items.is_empty() {
        let _ = writeln!(out, "  none");
    }
    for item in items {
        let _ = writeln!(out, "  {}", item);
    }
}

/// Compare the trees under `left` and `right`.
///
/// Sidecar files and excluded folders are ignored on both sides. An entry
/// missing on one side is listed once; its contents are not repeated.
pub fn diff_folders(
    left: &Path,
    right: &Path,
    compare_content: bool,
    archive: &ArchiveConfig,
) -> Result<DiffReport> {
    for folder in [left, right] {
        if !folder.is_dir() {
            return Err(Error::InvalidFolder(folder.to_path_buf()));
        }
    }

    let left_entries = collect_entries(left, archive)?;
    let right_entries = collect_entries(right, archive)?;

    let mut report = DiffReport {
        left: left.to_path_buf(),
        right: right.to_path_buf(),
        content_compared: compare_content,
        ..Default::default()
    };

    report.only_left = missing_from(&left_entries, &right_entries);
    report.only_right = missing_from(&right_entries, &left_entries);

    for (relative, kind) in &left_entries {
        let Some(other) = right_entries.get(relative) else {
            continue;
        };
        match (kind, other) {
            (EntryKind::File, EntryKind::File) => {
                report.common_files += 1;
                if compare_content
                    && !same_content(&left.join(relative), &right.join(relative))?
                {
                    report.differing.push(relative.clone());
                }
            }
            (EntryKind::Dir, EntryKind::Dir) => {}
            _ => report.type_mismatches.push(relative.clone()),
        }
    }

    Ok(report)
}

/// Relative paths (with `/` separators) of every entry below `root`.
fn collect_entries(root: &Path, archive: &ArchiveConfig) -> Result<BTreeMap<String, EntryKind>> {
    let mut entries = BTreeMap::new();

    let walker = WalkDir::new(root).min_depth(1).into_iter().filter_entry(|entry| {
        !(entry.file_type().is_dir()
            && archive.is_excluded_folder(&entry.file_name().to_string_lossy()))
    });

    for entry in walker {
        let entry = entry?;
        let kind = if entry.file_type().is_dir() {
            EntryKind::Dir
        } else if archive.is_skipped_file(entry.path()) {
            continue;
        } else {
            EntryKind::File
        };

        let relative = entry
            .path()
            .strip_prefix(root)
            .unwrap_or(entry.path())
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect::<Vec<_>>()
            .join("/");
        entries.insert(relative, kind);
    }

    Ok(entries)
}

/// Entries of `side` absent from `other`, without descendants of listed folders.
fn missing_from(
    side: &BTreeMap<String, EntryKind>,
    other: &BTreeMap<String, EntryKind>,
) -> Vec<String> {
    let missing: BTreeSet<&str> = side
        .keys()
        .filter(|k| !other.contains_key(*k))
        .map(String::as_str)
        .collect();

    missing
        .iter()
        .filter(|relative| {
            Path::new(relative)
                .ancestors()
                .skip(1)
                .all(|ancestor| !missing.contains(&*ancestor.to_string_lossy()))
        })
        .map(|relative| relative.to_string())
        .collect()
}

fn same_content(a: &Path, b: &Path) -> Result<bool> {
    if a.metadata()?.len() != b.metadata()?.len() {
        return Ok(false);
    }
    Ok(md5_file(a)? == md5_file(b)?)
}

/// Compute the MD5 digest of a file as lowercase hex.
pub fn md5_file(path: &Path) -> Result<String> {
    let mut file = File::open(path)?;
    let mut hasher = Md5::new();
    let mut buffer = [0u8; 8192];

    loop {
        let bytes_read = file.read(&mut buffer)?;
        if bytes_read == 0 {
            break;
        }
        hasher.update(&buffer[..bytes_read]);
    }

    Ok(format!("{:x}", hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_md5_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("a.txt");
        fs::write(&path, b"hello").unwrap();
        assert_eq!(md5_file(&path).unwrap(), "5d41402abc4b2a76b9719d911017c592");
    }

    #[test]
    fn test_diff_folders() {
        let left = tempdir().unwrap();
        let right = tempdir().unwrap();
        let (l, r) = (left.path(), right.path());

        fs::write(l.join("same.eml"), b"same").unwrap();
        fs::write(r.join("same.eml"), b"same").unwrap();
        fs::write(l.join("changed.eml"), b"left").unwrap();
        fs::write(r.join("changed.eml"), b"rite").unwrap();
        fs::write(l.join("left.eml"), b"l").unwrap();
        fs::create_dir_all(r.join("extra").join("deep")).unwrap();
        fs::write(r.join("extra").join("deep").join("r.eml"), b"r").unwrap();
        fs::write(l.join("mixed"), b"file").unwrap();
        fs::create_dir_all(r.join("mixed")).unwrap();
        fs::write(l.join("sync.ffs_db"), b"db").unwrap();

        let report = diff_folders(l, r, true, &ArchiveConfig::default()).unwrap();

        assert_eq!(report.only_left, vec!["left.eml"]);
        assert_eq!(report.only_right, vec!["extra"]);
        assert_eq!(report.type_mismatches, vec!["mixed"]);
        assert_eq!(report.differing, vec!["changed.eml"]);
        assert_eq!(report.common_files, 2);
        assert!(!report.is_identical());

        let text = report.render();
        assert!(text.contains("Common files: 2"));
        assert!(text.contains("  changed.eml"));
    }

    #[test]
    fn test_diff_without_content() {
        let left = tempdir().unwrap();
        let right = tempdir().unwrap();
        fs::write(left.path().join("a.eml"), b"one").unwrap();
        fs::write(right.path().join("a.eml"), b"two").unwrap();

        let report = diff_folders(left.path(), right.path(), false, &ArchiveConfig::default()).unwrap();
        assert!(report.is_identical());
        assert!(!report.render().contains("Different content"));
    }

    #[test]
    fn test_diff_invalid_folder() {
        let dir = tempdir().unwrap();
        let err = diff_folders(dir.path(), &dir.path().join("absent"), false, &ArchiveConfig::default())
            .unwrap_err();
        assert!(matches!(err, Error::InvalidFolder(_)));
    }
}
