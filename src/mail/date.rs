//! Date header parsing.
//!
//! Dates are kept in the sender's own offset: a message sent at 23:00 on the
//! last day of a month belongs to that month no matter where it is archived.

use chrono::{DateTime, NaiveDateTime};

/// Formats with a numeric offset, tried after RFC 2822.
const OFFSET_FORMATS: [&str; 2] = ["%a, %d %b %Y %H:%M:%S %z", "%d %b %Y %H:%M:%S %z"];

/// Formats tried once a trailing zone name has been dropped.
const NAIVE_FORMATS: [&str; 4] = [
    "%a, %d %b %Y %H:%M:%S",
    "%d %b %Y %H:%M:%S",
    "%a, %d %b %Y %H:%M",
    "%d %b %Y %H:%M",
];

/// Parse a `Date` header value into the sender's local time.
pub fn parse_date(value: &str) -> Option<NaiveDateTime> {
    let value = normalize(value);
    if value.is_empty() {
        return None;
    }

    if let Ok(date) = DateTime::parse_from_rfc2822(&value) {
        return Some(date.naive_local());
    }

    for format in OFFSET_FORMATS {
        if let Ok(date) = DateTime::parse_from_str(&value, format) {
            return Some(date.naive_local());
        }
    }

    let naive = strip_zone_name(&value);
    NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(naive, format).ok())
}

/// Drop parenthesized comments and collapse whitespace.
fn normalize(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut depth = 0usize;
    for c in value.chars() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            _ if depth == 0 => out.push(c),
            _ => {}
        }
    }
    out.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Remove a trailing alphabetic zone such as `GMT` or `BRT`.
fn strip_zone_name(value: &str) -> &str {
    match value.rsplit_once(' ') {
        Some((rest, zone)) if zone.chars().all(|c| c.is_ascii_alphabetic()) => rest,
        _ => value,
    }
}
