//! Destination name resolution.
//!
//! Turns a raw file name and a target directory into a path that is safe to
//! create: sanitized, within the path-length budget, and not colliding with
//! any existing entry. The resolver never touches the filesystem beyond the
//! read-only queries of its [`FileProbe`].

use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use serde::Serialize;
use thiserror::Error;

use crate::config::{CounterStyle, LengthUnit};
use crate::dedup::probe::{FileProbe, LocalFs};
use crate::dedup::suffix::suffix_for;
use crate::fs::naming::{sanitize, SanitizeOptions};
use crate::fs::truncate::{truncate, truncate_with_suffix, Truncation};

/// Default effective path-length budget (260 minus a safety margin of 10).
pub const DEFAULT_MAX_PATH_LENGTH: usize = 250;

/// Default number of renaming attempts after the initial candidate.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 10;

/// Tunables for a [`Resolver`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolverOptions {
    /// Effective budget for `directory + separator + name`.
    pub max_path_length: usize,
    /// How lengths are measured. The byte limit of the target filesystem
    /// is only guaranteed with [`LengthUnit::Bytes`]; `Chars` counts code
    /// points, so multi-byte names can exceed it.
    pub length_unit: LengthUnit,
    /// Renaming attempts after the initial candidate is found taken.
    pub max_attempts: u32,
    pub counter_style: CounterStyle,
    pub sanitize: SanitizeOptions,
}

impl Default for ResolverOptions {
    fn default() -> Self {
        Self {
            max_path_length: DEFAULT_MAX_PATH_LENGTH,
            length_unit: LengthUnit::default(),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            counter_style: CounterStyle::default(),
            sanitize: SanitizeOptions::default(),
        }
    }
}

/// Something noteworthy that happened while resolving a name.
///
/// None of these stop resolution; callers decide whether to log them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Anomaly {
    /// The noise prefix was removed from the start of the name.
    PrefixStripped { original: String },

    /// Nothing usable was left, the fallback name was used.
    FallbackName { original: String, fallback: String },

    /// The base was shortened to fit the path-length budget.
    Truncated { from: String, to: String },

    /// The candidate was taken and a suffixed name was chosen instead.
    Renamed { attempt: u32, name: String },

    /// Comparing the source with an existing destination failed.
    IdentityCheckFailed { path: PathBuf, error: String },
}

/// Why no destination could be produced.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Unresolvable {
    #[error("'{}' leaves no room for '{name}' within {budget} {unit}", directory.display())]
    PathBudgetExceeded {
        directory: PathBuf,
        name: String,
        budget: usize,
        unit: LengthUnit,
    },

    #[error("no free name for '{name}' after {attempts} attempts")]
    DuplicatesExhausted { name: String, attempts: u32 },
}

/// Final decision for one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", content = "detail", rename_all = "snake_case")]
pub enum Outcome {
    /// A free path; the caller may create it.
    Resolved(PathBuf),

    /// The source already lives at this path. Nothing to do.
    NoOp(PathBuf),

    /// No safe path exists; the source must be left in place.
    Unresolvable(Unresolvable),
}

impl Outcome {
    /// Path for `Resolved` and `NoOp` outcomes.
    pub fn path(&self) -> Option<&Path> {
        match self {
            Outcome::Resolved(path) | Outcome::NoOp(path) => Some(path),
            Outcome::Unresolvable(_) => None,
        }
    }
}

/// An outcome plus everything worth reporting about how it was reached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Resolution {
    #[serde(flatten)]
    pub outcome: Outcome,
    pub anomalies: Vec<Anomaly>,
}

impl Resolution {
    fn new(outcome: Outcome, anomalies: Vec<Anomaly>) -> Self {
        Self { outcome, anomalies }
    }
}

/// Resolves destination names against a [`FileProbe`].
pub struct Resolver<P = LocalFs> {
    options: ResolverOptions,
    probe: P,
    clock: fn() -> DateTime<Local>,
}

impl Resolver<LocalFs> {
    /// Resolver backed by the local filesystem.
    pub fn new(options: ResolverOptions) -> Self {
        Self::with_probe(options, LocalFs)
    }
}

impl<P: FileProbe> Resolver<P> {
    pub fn with_probe(options: ResolverOptions, probe: P) -> Self {
        Self {
            options,
            probe,
            clock: Local::now,
        }
    }

    /// Replace the clock used for timestamp suffixes.
    pub fn with_clock(mut self, clock: fn() -> DateTime<Local>) -> Self {
        self.clock = clock;
        self
    }

    pub fn options(&self) -> &ResolverOptions {
        &self.options
    }

    /// Resolve `raw_name` inside `target_dir`.
    ///
    /// `source` is the file about to be placed there, if any. When it is
    /// given and already sits at the candidate path the outcome is `NoOp`.
    pub fn resolve(&self, raw_name: &str, source: Option<&Path>, target_dir: &Path) -> Resolution {
        let mut anomalies = Vec::new();

        let sanitized = sanitize(raw_name, &self.options.sanitize);
        if sanitized.prefix_stripped {
            anomalies.push(Anomaly::PrefixStripped {
                original: raw_name.to_string(),
            });
        }
        if sanitized.fell_back {
            anomalies.push(Anomaly::FallbackName {
                original: raw_name.to_string(),
                fallback: sanitized.name.clone(),
            });
        }

        let name = match truncate(
            target_dir,
            &sanitized.name,
            self.options.max_path_length,
            self.options.length_unit,
        ) {
            Truncation::Fits(name) => name,
            Truncation::Truncated(name) => {
                anomalies.push(Anomaly::Truncated {
                    from: sanitized.name.clone(),
                    to: name.clone(),
                });
                name
            }
            Truncation::OverBudget(name) => {
                let outcome = Outcome::Unresolvable(self.over_budget(target_dir, name));
                return Resolution::new(outcome, anomalies);
            }
        };

        let mut resolution = self.deduplicate(&name, source, target_dir);
        anomalies.append(&mut resolution.anomalies);
        resolution.anomalies = anomalies;
        resolution
    }

    /// Find a free path for an already sanitized, in-budget `name`.
    ///
    /// Checks the name itself, then up to `max_attempts` suffixed variants.
    pub fn deduplicate(&self, name: &str, source: Option<&Path>, target_dir: &Path) -> Resolution {
        let mut anomalies = Vec::new();

        let destination = target_dir.join(name);
        if !self.probe.exists(&destination) {
            return Resolution::new(Outcome::Resolved(destination), anomalies);
        }

        if let Some(source) = source {
            match self.probe.same_file(source, &destination) {
                Ok(true) => return Resolution::new(Outcome::NoOp(destination), anomalies),
                Ok(false) => {}
                // Unknown identity is treated as a collision.
                Err(e) => anomalies.push(Anomaly::IdentityCheckFailed {
                    path: destination,
                    error: e.to_string(),
                }),
            }
        }

        let max_attempts = self.options.max_attempts;
        for attempt in 1..=max_attempts {
            let suffix = suffix_for(
                attempt,
                max_attempts,
                self.options.counter_style,
                (self.clock)(),
            );
            let candidate = match truncate_with_suffix(
                target_dir,
                name,
                &suffix,
                self.options.max_path_length,
                self.options.length_unit,
            ) {
                Truncation::OverBudget(candidate) => {
                    let outcome = Outcome::Unresolvable(self.over_budget(target_dir, candidate));
                    return Resolution::new(outcome, anomalies);
                }
                fitted => fitted.into_name(),
            };

            let destination = target_dir.join(&candidate);
            if !self.probe.exists(&destination) {
                anomalies.push(Anomaly::Renamed {
                    attempt,
                    name: candidate,
                });
                return Resolution::new(Outcome::Resolved(destination), anomalies);
            }
        }

        let outcome = Outcome::Unresolvable(Unresolvable::DuplicatesExhausted {
            name: name.to_string(),
            attempts: max_attempts,
        });
        Resolution::new(outcome, anomalies)
    }

    fn over_budget(&self, target_dir: &Path, name: String) -> Unresolvable {
        Unresolvable::PathBudgetExceeded {
            directory: target_dir.to_path_buf(),
            name,
            budget: self.options.max_path_length,
            unit: self.options.length_unit,
        }
    }
}

/// Resolve `raw_name` inside `target_dir` on the local filesystem with
/// default naming rules and the given effective budget.
pub fn resolve_destination(raw_name: &str, target_dir: &Path, max_path_length: usize) -> Resolution {
    let options = ResolverOptions {
        max_path_length,
        ..Default::default()
    };
    Resolver::new(options).resolve(raw_name, None, target_dir)
}
