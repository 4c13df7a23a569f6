//! Per-file pipeline: date, target folder, resolution, move.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local, NaiveDateTime};
use tracing::{debug, info, warn};

use crate::dedup::{Anomaly, FileProbe, Outcome, Resolver};
use crate::error::Result;
use crate::fs::paths::{archive_folder_for, ensure_dir, move_file, same_file};
use crate::mail::{is_eml, message_date};

/// Where an archive date came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateSource {
    /// The message's `Date` header.
    Header,
    /// The file's modification time.
    Modified,
    /// The time of the run.
    Now,
}

/// Date a file is archived under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileDate {
    pub date: NaiveDateTime,
    pub source: DateSource,
}

/// Pick the archive date for `path`.
///
/// Messages use their `Date` header; everything else, or a message whose
/// header cannot be read or parsed, uses the modification time.
pub fn file_date(path: &Path) -> FileDate {
    if is_eml(path) {
        match message_date(path) {
            Ok(Some(date)) => {
                return FileDate {
                    date,
                    source: DateSource::Header,
                }
            }
            Ok(None) => warn!(
                "No usable Date header in {}, using modification time",
                path.display()
            ),
            Err(e) => warn!(
                "Cannot read headers of {}: {}, using modification time",
                path.display(),
                e
            ),
        }
    }

    modified_date(path)
}

/// Modification time of `path`, or the current time when it cannot be read.
pub fn modified_date(path: &Path) -> FileDate {
    match fs::metadata(path).and_then(|m| m.modified()) {
        Ok(modified) => FileDate {
            date: DateTime::<Local>::from(modified).naive_local(),
            source: DateSource::Modified,
        },
        Err(e) => {
            warn!(
                "Cannot read modification time of {}: {}, using current date",
                path.display(),
                e
            );
            FileDate {
                date: Local::now().naive_local(),
                source: DateSource::Now,
            }
        }
    }
}

/// Dated target folder for `path` under `archive_root`.
pub fn target_folder(path: &Path, archive_root: &Path) -> (PathBuf, FileDate) {
    let date = file_date(path);
    (archive_folder_for(archive_root, &date.date), date)
}

/// Whether `path` already sits directly inside `folder`.
pub fn is_in_folder(path: &Path, folder: &Path) -> bool {
    match path.parent() {
        Some(parent) if parent == folder => true,
        Some(parent) => same_file(parent, folder).unwrap_or(false),
        None => false,
    }
}

/// What happened to one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Placement {
    /// The file was moved.
    Moved { to: PathBuf, anomalies: Vec<Anomaly> },
    /// Dry run: the file would have been moved here.
    Planned { to: PathBuf, anomalies: Vec<Anomaly> },
    /// The file is already where it belongs.
    AlreadyInPlace(PathBuf),
}

impl Placement {
    /// Where the file is, or would be after a dry run.
    pub fn path(&self) -> &Path {
        match self {
            Placement::Moved { to, .. } | Placement::Planned { to, .. } => to,
            Placement::AlreadyInPlace(path) => path,
        }
    }

    pub fn anomalies(&self) -> &[Anomaly] {
        match self {
            Placement::Moved { anomalies, .. } | Placement::Planned { anomalies, .. } => anomalies,
            Placement::AlreadyInPlace(_) => &[],
        }
    }

    pub fn was_renamed(&self) -> bool {
        self.anomalies()
            .iter()
            .any(|a| matches!(a, Anomaly::Renamed { .. }))
    }
}

/// Resolve a destination for `source` inside `target_dir` and move it there.
///
/// The target folder is created only when a destination was found. The
/// source is left untouched on any error.
pub fn place_file<P: FileProbe>(
    resolver: &Resolver<P>,
    source: &Path,
    target_dir: &Path,
    dry_run: bool,
) -> Result<Placement> {
    let raw_name = source
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    place_file_as(resolver, source, &raw_name, target_dir, dry_run)
}

/// Like [`place_file`], but the destination is derived from `raw_name`
/// instead of the source's own file name.
pub fn place_file_as<P: FileProbe>(
    resolver: &Resolver<P>,
    source: &Path,
    raw_name: &str,
    target_dir: &Path,
    dry_run: bool,
) -> Result<Placement> {
    let resolution = resolver.resolve(raw_name, Some(source), target_dir);
    log_anomalies(source, &resolution.anomalies);

    match resolution.outcome {
        Outcome::NoOp(path) => {
            debug!("{} is already at {}", source.display(), path.display());
            Ok(Placement::AlreadyInPlace(path))
        }
        Outcome::Unresolvable(reason) => Err(reason.into()),
        Outcome::Resolved(to) if dry_run => {
            info!("Would move {} -> {}", source.display(), to.display());
            Ok(Placement::Planned {
                to,
                anomalies: resolution.anomalies,
            })
        }
        Outcome::Resolved(to) => {
            ensure_dir(target_dir)?;
            move_file(source, &to)?;
            info!("Moved {} -> {}", source.display(), to.display());
            Ok(Placement::Moved {
                to,
                anomalies: resolution.anomalies,
            })
        }
    }
}

pub(crate) fn log_anomalies(source: &Path, anomalies: &[Anomaly]) {
    for anomaly in anomalies {
        match anomaly {
            Anomaly::PrefixStripped { original } => {
                debug!("Stripped noise prefix from '{}'", original)
            }
            Anomaly::FallbackName { original, fallback } => {
                warn!("Name '{}' is unusable, using '{}'", original, fallback)
            }
            Anomaly::Truncated { from, to } => {
                warn!("Name too long for target path, '{}' -> '{}'", from, to)
            }
            Anomaly::Renamed { attempt, name } => {
                warn!(
                    "Duplicate name for {}, renamed to '{}' (attempt {})",
                    source.display(),
                    name,
                    attempt
                )
            }
            Anomaly::IdentityCheckFailed { path, error } => {
                warn!(
                    "Cannot compare {} with {}: {}, treating as a duplicate",
                    source.display(),
                    path.display(),
                    error
                )
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dedup::ResolverOptions;
    use crate::error::Error;
    use std::time::{Duration, SystemTime};
    use tempfile::tempdir;

    fn set_mtime(path: &Path, secs_since_epoch: u64) {
        let file = fs::OpenOptions::new().write(true).open(path).unwrap();
        file.set_modified(SystemTime::UNIX_EPOCH + Duration::from_secs(secs_since_epoch))
            .unwrap();
    }

    #[test]
    fn test_eml_date_from_header() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("a.eml");
        fs::write(&path, "Date: Fri, 15 Mar 2024 10:30:00 +0000\r\n\r\nbody").unwrap();

        let (folder, date) = target_folder(&path, Path::new("/mail"));
        assert_eq!(date.source, DateSource::Header);
        assert_eq!(folder, PathBuf::from("/mail/2024/2024-03"));
    }

    #[test]
    fn test_eml_without_date_uses_mtime() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("a.eml");
        fs::write(&path, "Subject: hi\r\n\r\nbody").unwrap();
        // Mid-June 2020, far from any month boundary in every time zone.
        set_mtime(&path, 1_592_222_400);

        let (folder, date) = target_folder(&path, Path::new("/mail"));
        assert_eq!(date.source, DateSource::Modified);
        assert_eq!(folder, PathBuf::from("/mail/2020/2020-06"));
    }

    #[test]
    fn test_other_files_use_mtime() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("scan.pdf");
        fs::write(&path, "Date: Fri, 15 Mar 2024 10:30:00 +0000\r\n").unwrap();
        set_mtime(&path, 1_592_222_400);

        assert_eq!(file_date(&path).source, DateSource::Modified);
    }

    #[test]
    fn test_is_in_folder() {
        let dir = tempdir().unwrap();
        let folder = dir.path().join("2024").join("2024-03");
        fs::create_dir_all(&folder).unwrap();
        let file = folder.join("a.eml");
        fs::write(&file, b"x").unwrap();

        assert!(is_in_folder(&file, &folder));
        assert!(is_in_folder(&file, &dir.path().join("2024").join(".").join("2024-03")));
        assert!(!is_in_folder(&file, dir.path()));
    }

    #[test]
    fn test_place_file_moves_and_renames() {
        let inbox = tempdir().unwrap();
        let archive = tempdir().unwrap();
        let target = archive.path().join("2024").join("2024-03");
        fs::create_dir_all(&target).unwrap();
        fs::write(target.join("a.eml"), b"old").unwrap();
        let source = inbox.path().join("a.eml");
        fs::write(&source, b"new").unwrap();

        let resolver = Resolver::new(ResolverOptions::default());
        let placement = place_file(&resolver, &source, &target, false).unwrap();

        assert!(placement.was_renamed());
        assert_eq!(
            placement,
            Placement::Moved {
                to: target.join("a_1.eml"),
                anomalies: placement.anomalies().to_vec(),
            }
        );
        assert!(!source.exists());
        assert_eq!(fs::read(target.join("a.eml")).unwrap(), b"old");
        assert_eq!(fs::read(target.join("a_1.eml")).unwrap(), b"new");
    }

    #[test]
    fn test_place_file_dry_run_touches_nothing() {
        let inbox = tempdir().unwrap();
        let target = inbox.path().join("2024").join("2024-03");
        let source = inbox.path().join("msg report.txt");
        fs::write(&source, b"x").unwrap();

        let resolver = Resolver::new(ResolverOptions::default());
        let placement = place_file(&resolver, &source, &target, true).unwrap();

        assert!(matches!(placement, Placement::Planned { ref to, .. } if *to == target.join("report.txt")));
        assert!(source.exists());
        assert!(!target.exists());
    }

    #[test]
    fn test_place_file_unresolvable_leaves_source() {
        let inbox = tempdir().unwrap();
        let source = inbox.path().join("a.eml");
        fs::write(&source, b"x").unwrap();
        let target = inbox.path().join("out");

        let options = ResolverOptions {
            max_path_length: 5,
            ..Default::default()
        };
        let resolver = Resolver::new(options);
        let err = place_file(&resolver, &source, &target, false).unwrap_err();

        assert!(matches!(err, Error::Unresolvable(_)));
        assert!(source.exists());
        assert!(!target.exists());
    }

    #[test]
    fn test_place_file_already_in_place() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("a.eml");
        fs::write(&source, b"x").unwrap();

        let resolver = Resolver::new(ResolverOptions::default());
        let placement = place_file(&resolver, &source, dir.path(), false).unwrap();
        assert_eq!(placement, Placement::AlreadyInPlace(source.clone()));
        assert!(source.exists());
    }
}
