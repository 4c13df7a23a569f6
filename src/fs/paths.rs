//! Path and directory management.

use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

use chrono::Datelike;
use walkdir::WalkDir;

use crate::error::{Error, Result};

/// Dated archive folder for `date`: `<root>/<YYYY>/<YYYY-MM>`.
pub fn archive_folder_for<D: Datelike>(root: &Path, date: &D) -> PathBuf {
    root.join(format!("{:04}", date.year()))
        .join(format!("{:04}-{:02}", date.year(), date.month()))
}

/// Ensure a directory exists, creating it if necessary.
pub fn ensure_dir(path: &Path) -> Result<()> {
    if !path.is_dir() {
        fs::create_dir_all(path)?;
    }
    Ok(())
}

/// Whether two paths refer to the same underlying file.
#[cfg(unix)]
pub fn same_file(a: &Path, b: &Path) -> io::Result<bool> {
    use std::os::unix::fs::MetadataExt;

    let (a, b) = (fs::metadata(a)?, fs::metadata(b)?);
    Ok(a.dev() == b.dev() && a.ino() == b.ino())
}

/// Whether two paths refer to the same underlying file.
#[cfg(not(unix))]
pub fn same_file(a: &Path, b: &Path) -> io::Result<bool> {
    Ok(fs::canonicalize(a)? == fs::canonicalize(b)?)
}

/// Move `from` to `to`, never replacing an existing `to`.
///
/// Uses a hard link when the filesystem allows it, otherwise copies into a
/// freshly created file. The source is removed only once the destination is
/// complete; on failure the destination is cleaned up and the source is left
/// where it was.
pub fn move_file(from: &Path, to: &Path) -> Result<()> {
    match fs::hard_link(from, to) {
        Ok(()) => {
            if let Err(e) = fs::remove_file(from) {
                let _ = fs::remove_file(to);
                return Err(move_error(from, to, e));
            }
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
            Err(Error::DestinationExists(to.to_path_buf()))
        }
        // Cross-device or no hard-link support.
        Err(_) => copy_then_remove(from, to),
    }
}

fn copy_then_remove(from: &Path, to: &Path) -> Result<()> {
    let mut source = File::open(from).map_err(|e| move_error(from, to, e))?;
    let metadata = source.metadata().map_err(|e| move_error(from, to, e))?;

    let mut dest = match OpenOptions::new().write(true).create_new(true).open(to) {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
            return Err(Error::DestinationExists(to.to_path_buf()));
        }
        Err(e) => return Err(move_error(from, to, e)),
    };

    let copied = io::copy(&mut source, &mut dest)
        .and_then(|_| dest.sync_all())
        .and_then(|_| match metadata.modified() {
            Ok(modified) => dest.set_modified(modified),
            Err(_) => Ok(()),
        });
    drop(dest);

    if let Err(e) = copied {
        let _ = fs::remove_file(to);
        return Err(move_error(from, to, e));
    }

    let _ = fs::set_permissions(to, metadata.permissions());

    drop(source);
    if let Err(e) = fs::remove_file(from) {
        let _ = fs::remove_file(to);
        return Err(move_error(from, to, e));
    }

    Ok(())
}

fn move_error(from: &Path, to: &Path, e: io::Error) -> Error {
    Error::Move {
        from: from.to_path_buf(),
        to: to.to_path_buf(),
        message: e.to_string(),
    }
}

/// Remove empty folders below `root`, deepest first. `root` itself is kept.
///
/// Folders whose name matches `skip` are neither entered nor removed.
/// Returns the number of folders removed.
pub fn remove_empty_dirs<F>(root: &Path, skip: F) -> Result<usize>
where
    F: Fn(&str) -> bool,
{
    // Pre-order, so a rejected folder is skipped as a whole.
    let mut dirs = Vec::new();
    let walker = WalkDir::new(root)
        .min_depth(1)
        .into_iter()
        .filter_entry(|entry| {
            !(entry.file_type().is_dir() && skip(&entry.file_name().to_string_lossy()))
        });
    for entry in walker {
        let entry = entry?;
        if entry.file_type().is_dir() {
            dirs.push(entry.into_path());
        }
    }

    // Children come after their parent in walk order.
    let mut removed = 0;
    for dir in dirs.iter().rev() {
        if fs::read_dir(dir)?.next().is_none() {
            fs::remove_dir(dir)?;
            removed += 1;
        }
    }

    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tempfile::tempdir;

    #[test]
    fn test_archive_folder_for() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        assert_eq!(
            archive_folder_for(Path::new("/mail"), &date),
            PathBuf::from("/mail/2024/2024-03")
        );
    }

    #[test]
    fn test_ensure_dir_creates_nested() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("2024").join("2024-03");
        ensure_dir(&nested).unwrap();
        assert!(nested.is_dir());
        ensure_dir(&nested).unwrap();
    }

    #[test]
    fn test_same_file() {
        let dir = tempdir().unwrap();
        let a = dir.path().join("a.txt");
        let b = dir.path().join("b.txt");
        fs::write(&a, b"same").unwrap();
        fs::write(&b, b"same").unwrap();

        assert!(same_file(&a, &a).unwrap());
        assert!(!same_file(&a, &b).unwrap());
        assert!(same_file(&a, &dir.path().join(".").join("a.txt")).unwrap());
        assert!(same_file(&a, &dir.path().join("missing")).is_err());
    }

    #[test]
    fn test_move_file() {
        let dir = tempdir().unwrap();
        let from = dir.path().join("a.txt");
        let to = dir.path().join("sub").join("a.txt");
        fs::write(&from, b"payload").unwrap();
        ensure_dir(to.parent().unwrap()).unwrap();

        move_file(&from, &to).unwrap();
        assert!(!from.exists());
        assert_eq!(fs::read(&to).unwrap(), b"payload");
    }

    #[test]
    fn test_move_never_overwrites() {
        let dir = tempdir().unwrap();
        let from = dir.path().join("a.txt");
        let to = dir.path().join("b.txt");
        fs::write(&from, b"new").unwrap();
        fs::write(&to, b"old").unwrap();

        let err = move_file(&from, &to).unwrap_err();
        assert!(matches!(err, Error::DestinationExists(_)));
        assert_eq!(fs::read(&from).unwrap(), b"new");
        assert_eq!(fs::read(&to).unwrap(), b"old");
    }

    #[test]
    fn test_copy_fallback_moves_content() {
        let dir = tempdir().unwrap();
        let from = dir.path().join("a.txt");
        let to = dir.path().join("b.txt");
        fs::write(&from, b"copied").unwrap();

        copy_then_remove(&from, &to).unwrap();
        assert!(!from.exists());
        assert_eq!(fs::read(&to).unwrap(), b"copied");
    }

    #[test]
    fn test_move_missing_source_leaves_no_destination() {
        let dir = tempdir().unwrap();
        let to = dir.path().join("b.txt");
        assert!(move_file(&dir.path().join("missing"), &to).is_err());
        assert!(!to.exists());
    }

    #[test]
    fn test_remove_empty_dirs() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("a").join("b").join("c")).unwrap();
        fs::create_dir_all(root.join("keep")).unwrap();
        fs::write(root.join("keep").join("mail.eml"), b"x").unwrap();
        fs::create_dir_all(root.join("ERROS")).unwrap();

        let removed = remove_empty_dirs(root, |name| name.eq_ignore_ascii_case("erros")).unwrap();

        assert_eq!(removed, 3);
        assert!(!root.join("a").exists());
        assert!(root.join("keep").is_dir());
        assert!(root.join("ERROS").is_dir());
        assert!(root.is_dir());
    }

    #[test]
    fn test_remove_empty_dirs_next_to_skipped_folder() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("a").join("b")).unwrap();
        fs::create_dir_all(root.join("ERROS").join("empty")).unwrap();
        fs::create_dir_all(root.join("z")).unwrap();

        let removed = remove_empty_dirs(root, |name| name.eq_ignore_ascii_case("erros")).unwrap();

        assert_eq!(removed, 3);
        assert!(!root.join("a").exists());
        assert!(!root.join("z").exists());
        assert!(root.join("ERROS").join("empty").is_dir());
    }
}
