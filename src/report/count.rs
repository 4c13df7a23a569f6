//! Numbered-file gap report.

use std::collections::BTreeSet;
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::config::validate_range;
use crate::error::{Error, Result};

/// Prefix of the default report file name.
pub const REPORT_PREFIX: &str = "relatorio_verificacao_";

/// An inclusive run of missing numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Gap {
    pub first: u64,
    pub last: u64,
}

impl std::fmt::Display for Gap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.first == self.last {
            write!(f, "{}", self.first)
        } else {
            write!(f, "{}-{}", self.first, self.last)
        }
    }
}

/// Which numbers in a range have a matching file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CountReport {
    pub folder: PathBuf,
    pub start: u64,
    pub end: u64,
    /// Distinct numbers inside the range that were found.
    pub found: u64,
    pub missing: Vec<Gap>,
    /// Files whose name does not start with a digit.
    pub unnumbered: Vec<String>,
}

impl CountReport {
    pub fn missing_count(&self) -> u64 {
        self.missing
            .iter()
            .fold(0u64, |total, g| total.saturating_add((g.last - g.first).saturating_add(1)))
    }

    /// Plain-text rendering.
    pub fn render(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "=== VERIFICATION REPORT ===");
        let _ = writeln!(out, "Folder: {}", self.folder.display());
        let _ = writeln!(out, "Range: {} to {}", self.start, self.end);
        let _ = writeln!(out, "Found: {}", self.found);

        let _ = writeln!(out, "\nMissing numbers ({}):", self.missing_count());
        if self.missing.is_empty() {
            let _ = writeln!(out, "  none");
        } else {
            let gaps: Vec<String> = self.missing.iter().map(|g| g.to_string()).collect();
            let _ = writeln!(out, "  {}", gaps.join(", "));
        }

        let _ = writeln!(out, "\nFiles not starting with a number ({}):", self.unnumbered.len());
        if self.unnumbered.is_empty() {
            let _ = writeln!(out, "  none");
        }
        for name in &self.unnumbered {
            let _ = writeln!(out, "  {}", name);
        }

        out
    }
}

/// Default report location: `<folder>/relatorio_verificacao_<folder name>.txt`.
pub fn default_report_path(folder: &Path) -> PathBuf {
    let name = folder
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    folder.join(format!("{}{}.txt", REPORT_PREFIX, name))
}

/// Leading ASCII digits of `name`, if any.
pub fn leading_digits(name: &str) -> Option<&str> {
    let end = name
        .char_indices()
        .find(|(_, c)| !c.is_ascii_digit())
        .map(|(i, _)| i)
        .unwrap_or(name.len());
    (end > 0).then(|| &name[..end])
}

/// Check which numbers in `start..=end` have a file in `folder`.
///
/// Previous reports written to the folder are ignored.
pub fn count_numbered(folder: &Path, start: u64, end: u64) -> Result<CountReport> {
    validate_range(start, end)?;
    if !folder.is_dir() {
        return Err(Error::InvalidFolder(folder.to_path_buf()));
    }

    let mut numbers = BTreeSet::new();
    let mut unnumbered = Vec::new();

    for entry in fs::read_dir(folder)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.starts_with(REPORT_PREFIX) {
            continue;
        }

        match leading_digits(&name) {
            // Numbers too large for u64 are outside every range.
            Some(digits) => {
                if let Ok(n) = digits.parse::<u64>() {
                    numbers.insert(n);
                }
            }
            None => unnumbered.push(name),
        }
    }
    unnumbered.sort();

    let mut missing = Vec::new();
    let mut next = Some(start);
    let mut found = 0;
    for &n in numbers.range(start..=end) {
        found += 1;
        if let Some(expected) = next {
            if n > expected {
                missing.push(Gap {
                    first: expected,
                    last: n - 1,
                });
            }
        }
        next = n.checked_add(1);
    }
    if let Some(expected) = next {
        if expected <= end {
            missing.push(Gap {
                first: expected,
                last: end,
            });
        }
    }

    Ok(CountReport {
        folder: folder.to_path_buf(),
        start,
        end,
        found,
        missing,
        unnumbered,
    })
}
