//! Duplicate-safe destination resolution.
//!
//! Provides:
//! - Counter and timestamp suffixes
//! - Filesystem probing (existence and identity)
//! - The resolver combining sanitization, truncation and deduplication

pub mod probe;
pub mod resolver;
pub mod suffix;

pub use probe::{FileProbe, LocalFs};
pub use resolver::{
    resolve_destination, Anomaly, Outcome, Resolution, Resolver, ResolverOptions, Unresolvable,
};
