//! Renaming messages after their headers.
//!
//! A message becomes `<YYYY MM DD HHMMSS> - <subject> - <sender>.eml` in its
//! own folder. When that name belongs to another file the message goes to the
//! duplicates folder instead; messages without readable headers go to the
//! problems folder.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use indicatif::ProgressBar;
use regex::Regex;
use tracing::{error, info, warn};

use crate::archive::file::{log_anomalies, modified_date, place_file_as};
use crate::archive::scan::{scan, ScanScope};
use crate::archive::state::RenameState;
use crate::config::{Config, LengthUnit, RenameConfig};
use crate::dedup::{Outcome, Resolver, ResolverOptions, Unresolvable};
use crate::error::{Error, Result};
use crate::fs::naming::is_forbidden_char;
use crate::fs::paths::move_file;
use crate::mail::{is_eml, parse_date, read_headers, Headers};

/// Marker in the names of messages set aside as unreadable.
const READ_ERROR_MARKER: &str = "ERRO_LEITURA";

const NAME_DATE_FORMAT: &str = "%Y %m %d %H%M%S";

/// What happened to one message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenameOutcome {
    /// Renamed in place, or would be on a dry run.
    Renamed(PathBuf),
    /// Already carries its header-derived name.
    AlreadyNamed,
    /// The name was taken; set aside in the duplicates folder.
    Duplicate(PathBuf),
    /// The headers could not be read; set aside in the problems folder.
    Problem(PathBuf),
}

fn separator_runs() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"[\s_]+").unwrap())
}

/// Clean one header value for use inside a file name.
///
/// Reserved and control characters become `_`, runs of whitespace and `_`
/// collapse into a single `_`, and a value longer than `max_part_length`
/// characters is cut at its last `_` before the limit when it has one.
pub fn name_part(value: Option<&str>, rename: &RenameConfig) -> String {
    let value = match value.map(str::trim) {
        Some(value) if !value.is_empty() => value,
        _ => return rename.unknown_part.clone(),
    };

    let replaced: String = value
        .chars()
        .map(|c| if is_forbidden_char(c) { '_' } else { c })
        .collect();
    let collapsed = separator_runs().replace_all(&replaced, "_");
    let mut part = collapsed.trim_matches('_');

    if LengthUnit::Chars.measure(part) > rename.max_part_length {
        let cut = LengthUnit::Chars.take_prefix(part, rename.max_part_length);
        part = match cut.rfind('_') {
            Some(pos) if pos > 0 => &cut[..pos],
            _ => cut,
        };
    }

    if part.is_empty() {
        rename.invalid_part.clone()
    } else {
        part.to_string()
    }
}

/// Extension of `path` with its dot, as written on disk.
fn dotted_extension(path: &Path) -> String {
    path.extension()
        .map(|ext| format!(".{}", ext.to_string_lossy()))
        .unwrap_or_default()
}

struct Renamer<'a> {
    folder: &'a Path,
    rename: &'a RenameConfig,
    /// Never suffixes: a taken name comes back as `DuplicatesExhausted`.
    exact: Resolver,
    resolver: Resolver,
    dry_run: bool,
}

impl Renamer<'_> {
    fn duplicates_dir(&self) -> PathBuf {
        self.folder.join(&self.rename.duplicates_folder)
    }

    fn problems_dir(&self) -> PathBuf {
        self.folder.join(&self.rename.problems_folder)
    }

    /// Header-derived name for a message.
    fn compose(&self, source: &Path, headers: &Headers) -> String {
        let date = match headers.get("Date").and_then(parse_date) {
            Some(date) => date,
            None => {
                warn!(
                    "No usable Date header in {}, using modification time",
                    source.display()
                );
                modified_date(source).date
            }
        };
        let subject = headers.get_decoded("Subject");
        let sender = headers.get_decoded("From");

        format!(
            "{} - {} - {}{}",
            date.format(NAME_DATE_FORMAT),
            name_part(subject.as_deref(), self.rename),
            name_part(sender.as_deref(), self.rename),
            dotted_extension(source)
        )
    }

    /// Returns the outcome and the number of anomalies met on the way.
    fn rename(&self, source: &Path) -> Result<(RenameOutcome, usize)> {
        let headers = match read_headers(source) {
            Ok(headers) if !headers.is_empty() => headers,
            Ok(_) => return self.set_aside_problem(source, "no header fields"),
            Err(e) => return self.set_aside_problem(source, &e.to_string()),
        };

        let name = self.compose(source, &headers);
        let resolution = self.exact.resolve(&name, Some(source), self.folder);
        log_anomalies(source, &resolution.anomalies);
        let mut anomalies = resolution.anomalies.len();

        match resolution.outcome {
            Outcome::NoOp(_) => Ok((RenameOutcome::AlreadyNamed, anomalies)),
            Outcome::Resolved(to) => {
                if self.dry_run {
                    info!("Would rename {} -> {}", source.display(), to.display());
                } else {
                    move_file(source, &to)?;
                    info!("Renamed {} -> {}", source.display(), to.display());
                }
                Ok((RenameOutcome::Renamed(to), anomalies))
            }
            Outcome::Unresolvable(Unresolvable::DuplicatesExhausted { name, .. }) => {
                let target_dir = self.duplicates_dir();
                warn!(
                    "'{}' already exists, setting {} aside in {}",
                    name,
                    source.display(),
                    target_dir.display()
                );
                let placement =
                    place_file_as(&self.resolver, source, &name, &target_dir, self.dry_run)?;
                anomalies += placement.anomalies().len();
                Ok((RenameOutcome::Duplicate(placement.path().to_path_buf()), anomalies))
            }
            Outcome::Unresolvable(reason) => Err(reason.into()),
        }
    }

    fn set_aside_problem(&self, source: &Path, reason: &str) -> Result<(RenameOutcome, usize)> {
        let target_dir = self.problems_dir();
        error!(
            "Cannot read headers of {}: {}, setting it aside in {}",
            source.display(),
            reason,
            target_dir.display()
        );

        let stem = source.file_stem().map(|s| s.to_string_lossy());
        let name = format!(
            "{} - {} - {}{}",
            modified_date(source).date.format(NAME_DATE_FORMAT),
            READ_ERROR_MARKER,
            name_part(stem.as_deref(), self.rename),
            dotted_extension(source)
        );
        let placement = place_file_as(&self.resolver, source, &name, &target_dir, self.dry_run)?;
        Ok((
            RenameOutcome::Problem(placement.path().to_path_buf()),
            placement.anomalies().len(),
        ))
    }
}

/// Rename the `.eml` files directly inside `folder` after their headers.
///
/// Subfolders are not entered. Per-file failures are logged and counted.
pub fn rename_messages(
    folder: &Path,
    config: &Config,
    dry_run: bool,
    bar: &ProgressBar,
) -> Result<RenameState> {
    if !folder.is_dir() {
        return Err(Error::InvalidFolder(folder.to_path_buf()));
    }

    let options = config.naming.resolver_options();
    let renamer = Renamer {
        folder,
        rename: &config.rename,
        exact: Resolver::new(ResolverOptions {
            max_attempts: 0,
            ..options.clone()
        }),
        resolver: Resolver::new(options),
        dry_run,
    };

    info!(
        "Renaming messages in {}{}",
        folder.display(),
        if dry_run { " (dry run)" } else { "" }
    );

    let mut state = RenameState::new(dry_run);
    let found = scan(folder, ScanScope::TopLevel, &config.archive)?;
    state.skipped = found.skipped.len() as u64;

    bar.set_length(found.files.len() as u64);
    for source in &found.files {
        bar.inc(1);
        if !is_eml(source) {
            state.skipped += 1;
            continue;
        }

        state.scanned += 1;
        match renamer.rename(source) {
            Ok((outcome, anomalies)) => {
                state.anomalies += anomalies as u64;
                match outcome {
                    RenameOutcome::Renamed(_) => state.renamed += 1,
                    RenameOutcome::AlreadyNamed => state.already_named += 1,
                    RenameOutcome::Duplicate(_) => state.duplicates += 1,
                    RenameOutcome::Problem(_) => state.problems += 1,
                }
            }
            Err(e) => {
                error!("Failed to rename {}: {}", source.display(), e);
                state.record_failure(source.clone(), folder.to_path_buf(), e.to_string());
            }
        }
    }

    Ok(state)
}
