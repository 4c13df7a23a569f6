//! Stored message handling.
//!
//! Provides:
//! - Header block reading and encoded-word decoding
//! - Date header parsing

pub mod date;
pub mod header;

use std::path::Path;

use chrono::NaiveDateTime;

use crate::error::Result;

pub use date::parse_date;
pub use header::{decode_words, read_headers, Headers};

/// Whether `path` looks like a stored message.
pub fn is_eml(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("eml"))
        .unwrap_or(false)
}

/// Send date of the message at `path`, if its header carries a usable one.
pub fn message_date(path: &Path) -> Result<Option<NaiveDateTime>> {
    let headers = read_headers(path)?;
    Ok(headers.get("Date").and_then(parse_date))
}
