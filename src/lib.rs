//! Mail Archiver - dated, collision-free archiving of exported mail folders.
//!
//! The core of the crate is destination resolution: turning an arbitrary file
//! name and a target folder into a path that is legal on Windows and POSIX
//! filesystems, fits a path-length budget, and never overwrites an existing
//! file.
//!
//! # Features
//!
//! - Name sanitization (reserved and control characters, noise prefix,
//!   leading zeros)
//! - Path-length budgeting that keeps extensions and duplicate suffixes
//! - Bounded duplicate renaming with counter and timestamp suffixes
//! - Archiving into `YYYY/YYYY-MM` folders by `.eml` Date header or
//!   modification time
//! - Folder flattening, header-based message renaming, folder comparison and
//!   numbered-file gap reports
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use mail_archiver::dedup::{resolve_destination, Outcome};
//!
//! let resolution = resolve_destination("msg 0042 Invoice<Q3>.eml", Path::new("/mail/2024/2024-03"), 250);
//! match resolution.outcome {
//!     Outcome::Resolved(path) => println!("move to {}", path.display()),
//!     Outcome::NoOp(path) => println!("already at {}", path.display()),
//!     Outcome::Unresolvable(reason) => eprintln!("{}", reason),
//! }
//! ```

pub mod archive;
pub mod cli;
pub mod config;
pub mod dedup;
pub mod error;
pub mod fs;
pub mod logging;
pub mod mail;
pub mod output;
pub mod report;

// Re-exports for convenience
pub use archive::{archive_folder, flatten_folder, RunState};
pub use config::{Config, CounterStyle, LengthUnit};
pub use dedup::{
    resolve_destination, Anomaly, Outcome, Resolution, Resolver, ResolverOptions, Unresolvable,
};
pub use error::{Error, Result};
