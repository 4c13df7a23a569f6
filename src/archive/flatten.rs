//! Flattening a folder tree into its root.

use std::path::Path;

use indicatif::ProgressBar;
use tracing::{error, info, warn};

use crate::archive::file::{place_file, Placement};
use crate::archive::scan::{scan, ScanScope};
use crate::archive::state::RunState;
use crate::config::Config;
use crate::dedup::Resolver;
use crate::error::{Error, Result};
use crate::fs::paths::remove_empty_dirs;

/// Move every file found in subfolders of `root` into `root` itself, then
/// prune the subfolders left empty.
pub fn flatten_folder(
    root: &Path,
    config: &Config,
    dry_run: bool,
    bar: &ProgressBar,
) -> Result<RunState> {
    if !root.is_dir() {
        return Err(Error::InvalidFolder(root.to_path_buf()));
    }

    let mut state = RunState::new(dry_run);
    let resolver = Resolver::new(config.naming.resolver_options());

    info!("Flattening {}", root.display());
    let found = scan(root, ScanScope::Subfolders, &config.archive)?;
    state.skipped = found.skipped.len() as u64;
    for skipped in &found.skipped {
        info!("Skipping sidecar file {}", skipped.display());
    }

    bar.set_length(found.files.len() as u64);
    for source in &found.files {
        state.scanned += 1;
        match place_file(&resolver, source, root, dry_run) {
            Ok(placement) => record(&mut state, &placement),
            Err(e) => {
                error!(
                    "Failed to move {} into {}: {}",
                    source.display(),
                    root.display(),
                    e
                );
                state.record_failure(source.clone(), root.to_path_buf(), e.to_string());
            }
        }
        bar.inc(1);
    }

    if config.archive.remove_empty_dirs && !dry_run {
        match remove_empty_dirs(root, |name| config.archive.is_excluded_folder(name)) {
            Ok(removed) => {
                state.removed_dirs = removed as u64;
                info!("Removed {} empty folders", removed);
            }
            Err(e) => warn!("Could not prune empty folders under {}: {}", root.display(), e),
        }
    }

    Ok(state)
}

/// Fold a placement into the run counters.
pub(crate) fn record(state: &mut RunState, placement: &Placement) {
    state.anomalies += placement.anomalies().len() as u64;
    if placement.was_renamed() {
        state.renamed += 1;
    }
    match placement {
        Placement::Moved { .. } => state.moved += 1,
        Placement::Planned { .. } => state.planned += 1,
        Placement::AlreadyInPlace(_) => state.already_in_place += 1,
    }
}
