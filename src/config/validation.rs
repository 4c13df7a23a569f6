//! Configuration validation logic.

use crate::config::loader::{Config, NamingConfig, RenameConfig};
use crate::error::{Error, Result};
use crate::fs::naming::{is_forbidden_char, sanitize, SanitizeOptions};
use regex::Regex;

/// Smallest budget that still leaves room for a dated folder and a name.
const MIN_EFFECTIVE_PATH_LENGTH: usize = 16;

/// Upper bound on renaming attempts per file.
const MAX_ATTEMPTS_LIMIT: u32 = 1000;

/// Validate the entire configuration.
pub fn validate_config(config: &Config) -> Result<()> {
    validate_naming(&config.naming)?;
    validate_archive_folders(&config.archive.excluded_folders)?;
    validate_rename(&config.rename)?;

    Ok(())
}

/// Validate the naming section.
pub fn validate_naming(naming: &NamingConfig) -> Result<()> {
    validate_path_budget(naming.max_path_length, naming.safety_margin)?;
    validate_max_attempts(naming.max_attempts)?;
    validate_replacement(&naming.reserved_replacement)?;
    validate_noise_prefix(&naming.noise_prefix)?;

    // The fallback is checked against the options it will be used with.
    let options = naming.resolver_options();
    validate_fallback_name(&naming.fallback_name, &options.sanitize)?;

    Ok(())
}

/// Validate the path-length budget and its safety margin.
pub fn validate_path_budget(max_path_length: usize, safety_margin: usize) -> Result<()> {
    if max_path_length <= safety_margin
        || max_path_length - safety_margin < MIN_EFFECTIVE_PATH_LENGTH
    {
        return Err(Error::ConfigValidation {
            field: "max_path_length".to_string(),
            message: format!(
                "max_path_length ({}) minus safety_margin ({}) must be at least {}",
                max_path_length, safety_margin, MIN_EFFECTIVE_PATH_LENGTH
            ),
        });
    }

    Ok(())
}

/// Validate the renaming attempt budget.
pub fn validate_max_attempts(max_attempts: u32) -> Result<()> {
    if max_attempts == 0 || max_attempts > MAX_ATTEMPTS_LIMIT {
        return Err(Error::ConfigValidation {
            field: "max_attempts".to_string(),
            message: format!(
                "Must be between 1 and {} (got {})",
                MAX_ATTEMPTS_LIMIT, max_attempts
            ),
        });
    }

    Ok(())
}

/// Validate the reserved-character replacement.
pub fn validate_replacement(replacement: &str) -> Result<()> {
    let mut chars = replacement.chars();
    let (first, rest) = (chars.next(), chars.next());

    if rest.is_some() {
        return Err(Error::ConfigValidation {
            field: "reserved_replacement".to_string(),
            message: format!("Must be a single character or empty (got '{}')", replacement),
        });
    }

    if let Some(c) = first {
        if is_forbidden_char(c) || c.is_whitespace() || c == '.' {
            return Err(Error::ConfigValidation {
                field: "reserved_replacement".to_string(),
                message: format!("'{}' cannot be used in file names", c.escape_default()),
            });
        }
    }

    Ok(())
}

/// Validate the noise prefix: letters only, or empty.
pub fn validate_noise_prefix(prefix: &str) -> Result<()> {
    let pattern = Regex::new(r"^[A-Za-z]*$").unwrap();
    if !pattern.is_match(prefix.trim()) {
        return Err(Error::ConfigValidation {
            field: "noise_prefix".to_string(),
            message: format!("Only ASCII letters are allowed (got '{}')", prefix),
        });
    }

    Ok(())
}

/// Validate that the fallback name survives sanitization unchanged.
pub fn validate_fallback_name(
    fallback: &str,
    options: &SanitizeOptions,
) -> Result<()> {
    if fallback.trim().is_empty() {
        return Err(Error::MissingConfig("fallback_name".to_string()));
    }

    let sanitized = sanitize(fallback, options);
    if sanitized.fell_back || sanitized.name != fallback {
        return Err(Error::ConfigValidation {
            field: "fallback_name".to_string(),
            message: format!(
                "'{}' is not a stable file name (sanitizes to '{}')",
                fallback, sanitized.name
            ),
        });
    }

    Ok(())
}

/// Validate excluded folder names.
pub fn validate_archive_folders(folders: &[String]) -> Result<()> {
    for folder in folders {
        if folder.trim().is_empty() {
            return Err(Error::ConfigValidation {
                field: "excluded_folders".to_string(),
                message: "Folder names cannot be empty".to_string(),
            });
        }
    }

    Ok(())
}

/// Validate the rename section.
pub fn validate_rename(rename: &RenameConfig) -> Result<()> {
    for (field, folder) in [
        ("duplicates_folder", &rename.duplicates_folder),
        ("problems_folder", &rename.problems_folder),
    ] {
        if folder.as_os_str().is_empty() || folder.components().count() != 1 {
            return Err(Error::ConfigValidation {
                field: field.to_string(),
                message: format!(
                    "Must be a single folder name (got '{}')",
                    folder.display()
                ),
            });
        }
    }

    if rename.max_part_length == 0 {
        return Err(Error::ConfigValidation {
            field: "max_part_length".to_string(),
            message: "Must be at least 1".to_string(),
        });
    }

    for (field, part) in [
        ("unknown_part", &rename.unknown_part),
        ("invalid_part", &rename.invalid_part),
    ] {
        if part.trim().is_empty() || part.chars().any(is_forbidden_char) {
            return Err(Error::ConfigValidation {
                field: field.to_string(),
                message: format!("'{}' cannot be used in file names", part.escape_default()),
            });
        }
    }

    Ok(())
}

/// Validate an inclusive number range for the count report.
pub fn validate_range(start: u64, end: u64) -> Result<()> {
    if start > end {
        return Err(Error::ConfigValidation {
            field: "range".to_string(),
            message: format!("Start ({}) must not be greater than end ({})", start, end),
        });
    }

    Ok(())
}
