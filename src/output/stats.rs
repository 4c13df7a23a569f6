//! Statistics reporting.

use console::style;

use crate::archive::{RenameState, RunState};
use crate::dedup::{Anomaly, Outcome, Resolution};
use crate::report::{CountReport, DiffReport};

/// Print statistics for an archive or flatten run.
pub fn print_run_stats(title: &str, state: &RunState) {
    println!();
    println!("{}", style("═".repeat(50)).dim());
    println!("{}", style(format!("{}:", title)).bold());
    println!("  Scanned:  {}", state.scanned);
    if state.dry_run {
        println!("  Planned:  {} (dry run)", state.planned);
    } else {
        println!("  Moved:    {}", state.moved);
    }
    println!("  Renamed:  {} (duplicates)", state.renamed);
    println!("  In place: {}", state.already_in_place);
    println!("  Skipped:  {} (sidecar files)", state.skipped);
    if state.removed_dirs > 0 {
        println!("  Removed:  {} empty folders", state.removed_dirs);
    }
    if state.anomalies > 0 {
        println!("  Notices:  {}", style(state.anomalies).yellow());
    }
    if state.failed > 0 {
        println!("  Failed:   {}", style(state.failed).red());
        for failure in &state.failures {
            println!(
                "    {} -> {}: {}",
                failure.source.display(),
                failure.target_dir.display(),
                failure.reason
            );
        }
    }
    println!("{}", style("═".repeat(50)).dim());
}

/// Print statistics for a rename run.
pub fn print_rename_stats(state: &RenameState) {
    println!();
    println!("{}", style("═".repeat(50)).dim());
    println!("{}", style("Rename:").bold());
    println!("  Messages:   {}", state.scanned);
    if state.dry_run {
        println!("  Renamed:    {} (dry run)", state.renamed);
    } else {
        println!("  Renamed:    {}", state.renamed);
    }
    println!("  Unchanged:  {}", state.already_named);
    println!("  Duplicates: {}", style(state.duplicates).yellow());
    println!("  Problems:   {}", style(state.problems).yellow());
    println!("  Skipped:    {} (not messages)", state.skipped);
    if state.failed > 0 {
        println!("  Failed:     {}", style(state.failed).red());
        for failure in &state.failures {
            println!("    {}: {}", failure.source.display(), failure.reason);
        }
    }
    println!("{}", style("═".repeat(50)).dim());
}

/// Print a resolution in human-readable form.
pub fn print_resolution(resolution: &Resolution) {
    match &resolution.outcome {
        Outcome::Resolved(path) => println!("{} {}", style("FREE").green().bold(), path.display()),
        Outcome::NoOp(path) => println!("{} {}", style("IN PLACE").cyan().bold(), path.display()),
        Outcome::Unresolvable(reason) => println!("{} {}", style("UNRESOLVABLE").red().bold(), reason),
    }
    for anomaly in &resolution.anomalies {
        println!("  {}", describe_anomaly(anomaly));
    }
}

fn describe_anomaly(anomaly: &Anomaly) -> String {
    match anomaly {
        Anomaly::PrefixStripped { original } => format!("noise prefix stripped from '{}'", original),
        Anomaly::FallbackName { original, fallback } => {
            format!("'{}' had no usable characters, using '{}'", original, fallback)
        }
        Anomaly::Truncated { from, to } => format!("truncated '{}' to '{}'", from, to),
        Anomaly::Renamed { attempt, name } => format!("renamed to '{}' (attempt {})", name, attempt),
        Anomaly::IdentityCheckFailed { path, error } => {
            format!("could not compare with {}: {}", path.display(), error)
        }
    }
}

/// Print a one-line summary of a folder comparison.
pub fn print_diff_summary(report: &DiffReport) {
    if report.is_identical() {
        println!("{} folders match ({} common files)", style("OK").green().bold(), report.common_files);
    } else {
        println!(
            "Common: {}, only left: {}, only right: {}, type mismatches: {}, different: {}",
            style(report.common_files).green(),
            style(report.only_left.len()).yellow(),
            style(report.only_right.len()).yellow(),
            style(report.type_mismatches.len()).yellow(),
            style(report.differing.len()).red()
        );
    }
}

/// Print a one-line summary of a count report.
pub fn print_count_summary(report: &CountReport) {
    println!(
        "Found: {}, missing: {}, without number: {}",
        style(report.found).green(),
        style(report.missing_count()).yellow(),
        style(report.unnumbered.len()).yellow()
    );
}
