//! Path-length budgeting.
//!
//! Only the base of a filename is ever shortened; the directory, any
//! disambiguating suffix, and the extension are kept verbatim.

use std::path::Path;

use crate::config::LengthUnit;
use crate::fs::naming::split_name;

/// Outcome of fitting a name into a path-length budget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Truncation {
    /// The name already fits and is returned unchanged.
    Fits(String),

    /// The base was shortened to fit.
    Truncated(String),

    /// The directory (plus suffix and extension) leaves no room for a base.
    /// Carries the untouched candidate name.
    OverBudget(String),
}

impl Truncation {
    /// The resulting name, regardless of outcome.
    pub fn name(&self) -> &str {
        match self {
            Truncation::Fits(name) | Truncation::Truncated(name) | Truncation::OverBudget(name) => {
                name
            }
        }
    }

    /// Consume and return the resulting name.
    pub fn into_name(self) -> String {
        match self {
            Truncation::Fits(name) | Truncation::Truncated(name) | Truncation::OverBudget(name) => {
                name
            }
        }
    }
}

impl LengthUnit {
    /// Measure a string in this unit.
    pub fn measure(&self, s: &str) -> usize {
        match self {
            LengthUnit::Chars => s.chars().count(),
            LengthUnit::Bytes => s.len(),
        }
    }

    /// Longest prefix of `s` no longer than `limit` units, cut on a char boundary.
    pub fn take_prefix<'a>(&self, s: &'a str, limit: usize) -> &'a str {
        match self {
            LengthUnit::Chars => match s.char_indices().nth(limit) {
                Some((end, _)) => &s[..end],
                None => s,
            },
            LengthUnit::Bytes => {
                if s.len() <= limit {
                    return s;
                }
                let mut end = limit;
                while end > 0 && !s.is_char_boundary(end) {
                    end -= 1;
                }
                &s[..end]
            }
        }
    }
}

/// Length of `dir` joined with `name`, counting one separator.
pub fn joined_length(dir: &Path, name: &str, unit: LengthUnit) -> usize {
    unit.measure(&dir.to_string_lossy()) + 1 + unit.measure(name)
}

/// Fit `name` into `dir` within `max_len` units.
pub fn truncate(dir: &Path, name: &str, max_len: usize, unit: LengthUnit) -> Truncation {
    truncate_with_suffix(dir, name, "", max_len, unit)
}

/// Insert `suffix` between base and extension of `name`, then fit the result
/// into `dir` within `max_len` units by shortening the base alone.
pub fn truncate_with_suffix(
    dir: &Path,
    name: &str,
    suffix: &str,
    max_len: usize,
    unit: LengthUnit,
) -> Truncation {
    let (base, ext) = split_name(name);
    let candidate = format!("{}{}{}", base, suffix, ext);

    if joined_length(dir, &candidate, unit) <= max_len {
        return Truncation::Fits(candidate);
    }

    let overhead = unit.measure(&dir.to_string_lossy())
        + 1
        + unit.measure(suffix)
        + unit.measure(ext);
    if overhead >= max_len {
        return Truncation::OverBudget(candidate);
    }

    // Trailing dots and spaces are stripped by Windows, drop them here so the
    // name on disk is the name we checked.
    let kept = unit
        .take_prefix(base, max_len - overhead)
        .trim_end_matches(|c: char| c == '.' || c.is_whitespace());
    if kept.is_empty() {
        return Truncation::OverBudget(candidate);
    }

    Truncation::Truncated(format!("{}{}{}", kept, suffix, ext))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn dir() -> PathBuf {
        PathBuf::from("/archive/2024/2024-03")
    }

    // "/archive/2024/2024-03" is 21 units long; a name of n units gives 22 + n.

    #[test]
    fn test_short_name_unchanged() {
        let result = truncate(&dir(), "report.txt", 100, LengthUnit::Chars);
        assert_eq!(result, Truncation::Fits("report.txt".to_string()));
    }

    #[test]
    fn test_long_name_keeps_extension() {
        let name = format!("{}.eml", "x".repeat(100));
        let result = truncate(&dir(), &name, 40, LengthUnit::Chars);
        let Truncation::Truncated(out) = result else {
            panic!("expected truncation, got {:?}", result);
        };
        assert!(out.ends_with(".eml"));
        assert_eq!(out, format!("{}.eml", "x".repeat(14)));
        assert!(joined_length(&dir(), &out, LengthUnit::Chars) <= 40);
    }

    #[test]
    fn test_truncate_is_idempotent() {
        let name = format!("{}.pdf", "relatório ".repeat(20));
        for unit in [LengthUnit::Chars, LengthUnit::Bytes] {
            let once = truncate(&dir(), &name, 60, unit).into_name();
            let twice = truncate(&dir(), &once, 60, unit);
            assert_eq!(twice, Truncation::Fits(once.clone()));
        }
    }

    #[test]
    fn test_truncate_never_lengthens_and_respects_budget() {
        let names = [
            "a.txt".to_string(),
            format!("{}.eml", "b".repeat(300)),
            "ç".repeat(80),
            format!("{}.tar.gz", "日本語".repeat(30)),
        ];
        for unit in [LengthUnit::Chars, LengthUnit::Bytes] {
            for max in [30usize, 45, 80, 400] {
                for name in &names {
                    let out = truncate(&dir(), name, max, unit);
                    let out_name = out.name();
                    assert!(unit.measure(out_name) <= unit.measure(name));
                    if !matches!(out, Truncation::OverBudget(_)) {
                        assert!(joined_length(&dir(), out_name, unit) <= max);
                    }
                }
            }
        }
    }

    #[test]
    fn test_bytes_never_split_multibyte_chars() {
        // Each 'é' is two bytes; an odd budget must not cut one in half.
        let name = format!("{}.txt", "é".repeat(50));
        let out = truncate(&dir(), &name, 22 + 4 + 9, LengthUnit::Bytes).into_name();
        assert_eq!(out, format!("{}.txt", "é".repeat(4)));
    }

    #[test]
    fn test_directory_too_long_is_over_budget() {
        let name = "letter.eml";
        let result = truncate(&dir(), name, 20, LengthUnit::Chars);
        assert_eq!(result, Truncation::OverBudget(name.to_string()));

        // Room for the extension but nothing else.
        let result = truncate(&dir(), "letter.eml", 26, LengthUnit::Chars);
        assert!(matches!(result, Truncation::OverBudget(_)));
    }

    #[test]
    fn test_suffix_survives_truncation() {
        let name = format!("{}.eml", "m".repeat(200));
        let out = truncate_with_suffix(&dir(), &name, "_3", 50, LengthUnit::Chars).into_name();
        assert!(out.ends_with("_3.eml"), "{}", out);
        assert_eq!(joined_length(&dir(), &out, LengthUnit::Chars), 50);
    }

    #[test]
    fn test_trailing_dots_and_spaces_dropped_at_cut() {
        let name = format!("abc   {}.txt", "z".repeat(100));
        let out = truncate(&dir(), &name, 22 + 6 + 4, LengthUnit::Chars).into_name();
        assert_eq!(out, "abc.txt");
    }

    #[test]
    fn test_take_prefix() {
        assert_eq!(LengthUnit::Chars.take_prefix("héllo", 2), "hé");
        assert_eq!(LengthUnit::Bytes.take_prefix("héllo", 2), "h");
        assert_eq!(LengthUnit::Bytes.take_prefix("héllo", 3), "hé");
        assert_eq!(LengthUnit::Chars.take_prefix("abc", 10), "abc");
    }
}
