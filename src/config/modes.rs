//! Naming policy enums.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Unit used to measure path lengths against the budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LengthUnit {
    /// Unicode scalar values (default).
    #[default]
    Chars,
    /// UTF-8 encoded bytes, for filesystems with byte-exact limits.
    Bytes,
}

impl fmt::Display for LengthUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LengthUnit::Chars => write!(f, "chars"),
            LengthUnit::Bytes => write!(f, "bytes"),
        }
    }
}

impl FromStr for LengthUnit {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "chars" | "characters" => Ok(LengthUnit::Chars),
            "bytes" => Ok(LengthUnit::Bytes),
            _ => Err(format!("Unknown length unit: {}", s)),
        }
    }
}

/// Counter used for the first, human-readable phase of duplicate renaming.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CounterStyle {
    /// `_1`, `_2`, ... (default).
    #[default]
    Numeric,
    /// `_a`, `_b`, ..., `_z`, `_aa`, ...
    Alphabetic,
}

impl fmt::Display for CounterStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CounterStyle::Numeric => write!(f, "numeric"),
            CounterStyle::Alphabetic => write!(f, "alphabetic"),
        }
    }
}

impl FromStr for CounterStyle {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "numeric" => Ok(CounterStyle::Numeric),
            "alphabetic" => Ok(CounterStyle::Alphabetic),
            _ => Err(format!("Unknown counter style: {}", s)),
        }
    }
}
