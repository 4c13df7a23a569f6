//! Filename sanitization.
//!
//! Turns an arbitrary name read from disk into one that is legal on Windows
//! and POSIX filesystems alike.

/// Characters reserved by at least one supported filesystem.
pub const RESERVED_CHARS: [char; 9] = ['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// Default noise prefix left behind by the mail export tool.
pub const DEFAULT_NOISE_PREFIX: &str = "msg";

/// Default placeholder used when nothing survives sanitization.
pub const DEFAULT_FALLBACK_NAME: &str = "unnamed";

/// Settings for [`sanitize`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SanitizeOptions {
    /// Case-insensitive token stripped from the start of a name when followed by
    /// whitespace or when it is the whole name.
    pub noise_prefix: Option<String>,

    /// Replacement for reserved characters; `None` removes them.
    pub reserved_replacement: Option<char>,

    /// Placeholder returned when the cleaned name is empty.
    pub fallback_name: String,
}

impl Default for SanitizeOptions {
    fn default() -> Self {
        Self {
            noise_prefix: Some(DEFAULT_NOISE_PREFIX.to_string()),
            reserved_replacement: Some('_'),
            fallback_name: DEFAULT_FALLBACK_NAME.to_string(),
        }
    }
}

/// Result of sanitizing a single name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SanitizedName {
    /// The cleaned, never-empty name.
    pub name: String,

    /// Whether the noise prefix was removed.
    pub prefix_stripped: bool,

    /// Whether the fallback placeholder was substituted.
    pub fell_back: bool,
}

/// Check if a character may not appear in a sanitized name.
pub fn is_forbidden_char(c: char) -> bool {
    RESERVED_CHARS.contains(&c) || (c as u32) < 0x20
}

/// Sanitize a raw filename.
///
/// Reserved characters are replaced (or removed), ASCII control characters
/// are dropped, surrounding whitespace is trimmed, the noise prefix is
/// stripped and a leading run of digits loses its leading zeros. A result
/// made only of dots, whitespace and replacement characters (or nothing at
/// all) becomes `options.fallback_name`.
///
/// The function is idempotent: sanitizing its own output is a no-op.
pub fn sanitize(raw: &str, options: &SanitizeOptions) -> SanitizedName {
    let cleaned: String = raw
        .chars()
        .filter_map(|c| {
            if RESERVED_CHARS.contains(&c) {
                options.reserved_replacement
            } else if (c as u32) < 0x20 {
                None
            } else {
                Some(c)
            }
        })
        .collect();

    let mut name = cleaned.trim();
    let mut prefix_stripped = false;

    if let Some(prefix) = options.noise_prefix.as_deref().filter(|p| !p.is_empty()) {
        // A prefix may repeat ("msg msg 12 ..."), strip until stable.
        while let Some(rest) = strip_noise_prefix(name, prefix) {
            name = rest;
            prefix_stripped = true;
        }
    }

    let name = strip_leading_zeros(name);

    // Dots, whitespace and replacement characters alone carry no name.
    let meaningless =
        |c: char| c == '.' || c.is_whitespace() || Some(c) == options.reserved_replacement;
    if name.chars().all(meaningless) {
        return SanitizedName {
            name: options.fallback_name.clone(),
            prefix_stripped,
            fell_back: true,
        };
    }

    SanitizedName {
        name,
        prefix_stripped,
        fell_back: false,
    }
}

/// Rest of `name` after a leading `prefix`, matched case-insensitively, when
/// the prefix is followed by whitespace or ends the name.
fn strip_noise_prefix<'a>(name: &'a str, prefix: &str) -> Option<&'a str> {
    let head = name.get(..prefix.len())?;
    if !head.eq_ignore_ascii_case(prefix) {
        return None;
    }
    let rest = &name[prefix.len()..];
    if rest.is_empty() || rest.starts_with(char::is_whitespace) {
        Some(rest.trim_start())
    } else {
        None
    }
}

/// Normalize a leading run of ASCII digits: `007 report` becomes `7 report`.
fn strip_leading_zeros(name: &str) -> String {
    let digits_end = name
        .char_indices()
        .find(|(_, c)| !c.is_ascii_digit())
        .map(|(i, _)| i)
        .unwrap_or(name.len());

    if digits_end == 0 {
        return name.to_string();
    }

    let (digits, rest) = name.split_at(digits_end);
    let number = match digits.parse::<u128>() {
        Ok(value) => value.to_string(),
        // Too large for an integer: strip textually, keeping one digit.
        Err(_) => {
            let trimmed = digits.trim_start_matches('0');
            if trimmed.is_empty() {
                "0".to_string()
            } else {
                trimmed.to_string()
            }
        }
    };

    format!("{}{}", number, rest)
}

/// Split a filename into base and extension.
///
/// The extension runs from the last `.` to the end and keeps its dot. A name
/// whose only dot is the first character (`.profile`) has no extension.
pub fn split_name(name: &str) -> (&str, &str) {
    match name.rfind('.') {
        Some(0) | None => (name, ""),
        Some(pos) => name.split_at(pos),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clean(raw: &str) -> String {
        sanitize(raw, &SanitizeOptions::default()).name
    }

    #[test]
    fn test_sanitize_replaces_reserved_chars() {
        assert_eq!(clean("file:name.txt"), "file_name.txt");
        assert_eq!(clean("a<b>c|d?e*f.txt"), "a_b_c_d_e_f.txt");
        assert_eq!(clean("path/to\\file.txt"), "path_to_file.txt");
        assert_eq!(clean("say \"hi\".txt"), "say _hi_.txt");
    }

    #[test]
    fn test_sanitize_removes_reserved_chars_without_replacement() {
        let options = SanitizeOptions {
            reserved_replacement: None,
            ..Default::default()
        };
        assert_eq!(sanitize("Invoice<Q3>.eml", &options).name, "InvoiceQ3.eml");
    }

    #[test]
    fn test_sanitize_drops_control_chars() {
        assert_eq!(clean("file\x00na\x1fme.txt"), "filename.txt");
        assert_eq!(clean("tab\there.txt"), "tabhere.txt");
    }

    #[test]
    fn test_sanitize_trims_whitespace() {
        assert_eq!(clean("   spaced out.txt  "), "spaced out.txt");
    }

    #[test]
    fn test_sanitize_strips_noise_prefix() {
        let result = sanitize("MSG Weekly report.eml", &SanitizeOptions::default());
        assert_eq!(result.name, "Weekly report.eml");
        assert!(result.prefix_stripped);

        // Not followed by whitespace: part of the name.
        assert_eq!(clean("msgraph.eml"), "msgraph.eml");
        assert_eq!(clean("msg msg twice.eml"), "twice.eml");
    }

    #[test]
    fn test_sanitize_leading_zeros() {
        assert_eq!(clean("007 - report.txt"), "7 - report.txt");
        assert_eq!(clean("0000.txt"), "0.txt");
        assert_eq!(clean("42 answer"), "42 answer");
        assert_eq!(clean("report 007.txt"), "report 007.txt");
    }

    #[test]
    fn test_sanitize_leading_zeros_huge_number() {
        let raw = format!("000{} big.txt", "9".repeat(60));
        assert_eq!(clean(&raw), format!("{} big.txt", "9".repeat(60)));

        let zeros = "0".repeat(60);
        assert_eq!(clean(&zeros), "0");
    }

    #[test]
    fn test_sanitize_fallback() {
        for raw in ["", "   ", "\x01\x02", ".", "..", "msg  ", "\t\n"] {
            let result = sanitize(raw, &SanitizeOptions::default());
            assert_eq!(result.name, DEFAULT_FALLBACK_NAME, "input {:?}", raw);
            assert!(result.fell_back);
        }
    }

    #[test]
    fn test_sanitize_reserved_only_without_replacement_falls_back() {
        let options = SanitizeOptions {
            reserved_replacement: None,
            ..Default::default()
        };
        let result = sanitize("<>:\"/\\|?* \x07", &options);
        assert_eq!(result.name, DEFAULT_FALLBACK_NAME);
        assert!(result.fell_back);
    }

    #[test]
    fn test_sanitize_reserved_only_with_replacement_falls_back() {
        for raw in ["<>", " < > | ", "\x01:\x02", "?.*", "msg :"] {
            let result = sanitize(raw, &SanitizeOptions::default());
            assert_eq!(result.name, DEFAULT_FALLBACK_NAME, "input {:?}", raw);
            assert!(result.fell_back);
        }
        // A real character next to the replacements keeps the name.
        assert_eq!(clean("<a>"), "_a_");
    }

    #[test]
    fn test_noise_prefix_matching() {
        assert_eq!(strip_noise_prefix("Msg\t12", "msg"), Some("12"));
        assert_eq!(strip_noise_prefix("MSG", "msg"), Some(""));
        assert_eq!(strip_noise_prefix("msgs 12", "msg"), None);
        assert_eq!(strip_noise_prefix("ms", "msg"), None);
        assert_eq!(strip_noise_prefix("mé 12", "msg"), None);
    }

    #[test]
    fn test_sanitize_scenario_prefix_digits_reserved() {
        let options = SanitizeOptions {
            reserved_replacement: None,
            ..Default::default()
        };
        assert_eq!(
            sanitize("msg 0042 Invoice<Q3>.eml", &options).name,
            "42 InvoiceQ3.eml"
        );
        assert_eq!(clean("msg 0042 Invoice<Q3>.eml"), "42 Invoice_Q3_.eml");
    }

    #[test]
    fn test_sanitize_is_idempotent() {
        let inputs = [
            "",
            "plain.txt",
            " msg  msg 000 x.eml",
            "\x01msg a",
            "<msg> 007",
            "..hidden..",
            "007",
            "msg",
            "a\x7fb",
            "Relatório de férias.pdf",
            "   \x00   ",
        ];
        for options in [
            SanitizeOptions::default(),
            SanitizeOptions {
                reserved_replacement: None,
                ..Default::default()
            },
        ] {
            for raw in inputs {
                let once = sanitize(raw, &options).name;
                let twice = sanitize(&once, &options).name;
                assert_eq!(once, twice, "input {:?}", raw);
            }
        }
    }

    #[test]
    fn test_sanitize_output_has_no_forbidden_chars() {
        let raw: String = (0u8..128).map(char::from).collect();
        let name = clean(&raw);
        assert!(!name.is_empty());
        assert!(!name.chars().any(is_forbidden_char), "{:?}", name);
    }

    #[test]
    fn test_split_name() {
        assert_eq!(split_name("report.txt"), ("report", ".txt"));
        assert_eq!(split_name("archive.tar.gz"), ("archive.tar", ".gz"));
        assert_eq!(split_name("Makefile"), ("Makefile", ""));
        assert_eq!(split_name(".profile"), (".profile", ""));
        assert_eq!(split_name("trailing."), ("trailing", "."));
    }
}
