//! Disambiguating suffixes for duplicate names.

use chrono::{DateTime, Local};

use crate::config::CounterStyle;

/// Which strategy produced a suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuffixPhase {
    /// Small human-readable counter.
    Counter,
    /// High-resolution timestamp.
    Timestamp,
}

/// Number of attempts that use the counter before switching to timestamps.
pub fn counter_attempts(max_attempts: u32) -> u32 {
    (max_attempts + 1) / 2
}

/// Phase used for a 1-based attempt number.
pub fn phase_for(attempt: u32, max_attempts: u32) -> SuffixPhase {
    if attempt <= counter_attempts(max_attempts) {
        SuffixPhase::Counter
    } else {
        SuffixPhase::Timestamp
    }
}

/// Build the suffix for a 1-based attempt number.
///
/// Counter attempts yield `_1`, `_2`, ... (or `_a`, `_b`, ...). Timestamp
/// attempts yield `_<YYYYmmddHHMMSSffffff>-<attempt>`; the attempt number
/// keeps candidates distinct on clocks coarser than a microsecond.
pub fn suffix_for(
    attempt: u32,
    max_attempts: u32,
    style: CounterStyle,
    now: DateTime<Local>,
) -> String {
    match phase_for(attempt, max_attempts) {
        SuffixPhase::Counter => match style {
            CounterStyle::Numeric => format!("_{}", attempt),
            CounterStyle::Alphabetic => format!("_{}", alphabetic(attempt)),
        },
        SuffixPhase::Timestamp => format!("_{}-{}", now.format("%Y%m%d%H%M%S%6f"), attempt),
    }
}

/// Bijective base-26 letters: 1 → `a`, 26 → `z`, 27 → `aa`.
fn alphabetic(mut n: u32) -> String {
    let mut letters = Vec::new();
    while n > 0 {
        n -= 1;
        letters.push((b'a' + (n % 26) as u8) as char);
        n /= 26;
    }
    letters.iter().rev().collect()
}
