//! Configuration structures and loading logic.

use crate::config::modes::{CounterStyle, LengthUnit};
use crate::dedup::ResolverOptions;
use crate::error::{Error, Result};
use crate::fs::naming::{SanitizeOptions, DEFAULT_FALLBACK_NAME, DEFAULT_NOISE_PREFIX};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Name of the configuration file inside the config directory.
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub naming: NamingConfig,

    #[serde(default)]
    pub archive: ArchiveConfig,

    #[serde(default)]
    pub rename: RenameConfig,
}

/// Destination naming configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NamingConfig {
    /// Maximum full path length allowed by the target filesystem.
    #[serde(default = "default_max_path_length")]
    pub max_path_length: usize,

    /// Units kept free below `max_path_length`.
    #[serde(default = "default_safety_margin")]
    pub safety_margin: usize,

    /// How path lengths are measured.
    #[serde(default)]
    pub length_unit: LengthUnit,

    /// Renaming attempts before a duplicate is reported as unresolvable.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Counter used for the first half of the renaming attempts.
    #[serde(default)]
    pub counter_style: CounterStyle,

    /// Token stripped from the start of names. Empty disables stripping.
    #[serde(default = "default_noise_prefix")]
    pub noise_prefix: String,

    /// Placeholder for names that sanitize to nothing.
    #[serde(default = "default_fallback_name")]
    pub fallback_name: String,

    /// Replacement for reserved characters. Empty removes them.
    #[serde(default = "default_reserved_replacement")]
    pub reserved_replacement: String,
}

impl Default for NamingConfig {
    fn default() -> Self {
        Self {
            max_path_length: default_max_path_length(),
            safety_margin: default_safety_margin(),
            length_unit: LengthUnit::default(),
            max_attempts: default_max_attempts(),
            counter_style: CounterStyle::default(),
            noise_prefix: default_noise_prefix(),
            fallback_name: default_fallback_name(),
            reserved_replacement: default_reserved_replacement(),
        }
    }
}

/// Archiving behavior configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArchiveConfig {
    /// Walk subfolders instead of only the top level of the watch folder.
    #[serde(default)]
    pub recursive: bool,

    /// Root of the dated folder tree. Defaults to the watch folder.
    #[serde(default)]
    pub archive_root: Option<PathBuf>,

    /// Extensions (without dot, case-insensitive) that are never moved.
    #[serde(default = "default_skip_extensions")]
    pub skip_extensions: Vec<String>,

    /// Folder names (case-insensitive) that are never descended into.
    #[serde(default = "default_excluded_folders")]
    pub excluded_folders: Vec<String>,

    /// Folder, relative to the archive root, that receives run logs.
    #[serde(default = "default_log_folder")]
    pub log_folder: PathBuf,

    /// Whether `flatten` prunes subfolders left empty.
    #[serde(default = "default_true")]
    pub remove_empty_dirs: bool,
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            recursive: false,
            archive_root: None,
            skip_extensions: default_skip_extensions(),
            excluded_folders: default_excluded_folders(),
            log_folder: default_log_folder(),
            remove_empty_dirs: true,
        }
    }
}

/// Message renaming configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenameConfig {
    /// Subfolder receiving messages whose new name is already taken.
    #[serde(default = "default_duplicates_folder")]
    pub duplicates_folder: PathBuf,

    /// Subfolder receiving messages whose headers cannot be read.
    #[serde(default = "default_problems_folder")]
    pub problems_folder: PathBuf,

    /// Longest subject or sender part, in characters.
    #[serde(default = "default_max_part_length")]
    pub max_part_length: usize,

    /// Part used when a header is missing or empty.
    #[serde(default = "default_unknown_part")]
    pub unknown_part: String,

    /// Part used when nothing of a header survives cleaning.
    #[serde(default = "default_invalid_part")]
    pub invalid_part: String,
}

impl Default for RenameConfig {
    fn default() -> Self {
        Self {
            duplicates_folder: default_duplicates_folder(),
            problems_folder: default_problems_folder(),
            max_part_length: default_max_part_length(),
            unknown_part: default_unknown_part(),
            invalid_part: default_invalid_part(),
        }
    }
}

fn default_max_path_length() -> usize {
    260
}

fn default_safety_margin() -> usize {
    10
}

fn default_max_attempts() -> u32 {
    10
}

fn default_noise_prefix() -> String {
    DEFAULT_NOISE_PREFIX.to_string()
}

fn default_fallback_name() -> String {
    DEFAULT_FALLBACK_NAME.to_string()
}

fn default_reserved_replacement() -> String {
    "_".to_string()
}

fn default_skip_extensions() -> Vec<String> {
    vec!["ffs_db".to_string(), "ffs_lock".to_string()]
}

fn default_excluded_folders() -> Vec<String> {
    vec!["erros".to_string(), "anos anteriores".to_string()]
}

fn default_log_folder() -> PathBuf {
    PathBuf::from("ERROS")
}

fn default_duplicates_folder() -> PathBuf {
    PathBuf::from("Duplicatas")
}

fn default_problems_folder() -> PathBuf {
    PathBuf::from("Problemas")
}

fn default_max_part_length() -> usize {
    60
}

fn default_unknown_part() -> String {
    "Desconhecido".to_string()
}

fn default_invalid_part() -> String {
    "Invalido".to_string()
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::Config(format!(
                    "Configuration file not found: {}",
                    path.display()
                ))
            } else {
                Error::Io(e)
            }
        })?;

        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Platform configuration file location, if a home directory is known.
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "mail-archiver").map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
    }
}

impl NamingConfig {
    /// Budget actually enforced by the resolver.
    pub fn effective_max_length(&self) -> usize {
        self.max_path_length.saturating_sub(self.safety_margin)
    }

    /// Build resolver options from this configuration.
    pub fn resolver_options(&self) -> ResolverOptions {
        ResolverOptions {
            max_path_length: self.effective_max_length(),
            length_unit: self.length_unit,
            max_attempts: self.max_attempts,
            counter_style: self.counter_style,
            sanitize: SanitizeOptions {
                noise_prefix: Some(self.noise_prefix.trim().to_string()).filter(|p| !p.is_empty()),
                reserved_replacement: self.reserved_replacement.chars().next(),
                fallback_name: self.fallback_name.clone(),
            },
        }
    }
}

impl ArchiveConfig {
    /// Effective archive root for a watch folder.
    pub fn archive_root_for(&self, watch_folder: &Path) -> PathBuf {
        self.archive_root
            .clone()
            .unwrap_or_else(|| watch_folder.to_path_buf())
    }

    /// Check if a folder name is excluded from walking.
    pub fn is_excluded_folder(&self, name: &str) -> bool {
        let name = name.to_lowercase();
        self.excluded_folders
            .iter()
            .any(|excluded| excluded.to_lowercase() == name)
    }

    /// Check if a file should never be moved, judged by its extension.
    pub fn is_skipped_file(&self, path: &Path) -> bool {
        // Matched on the name so that bare dotfiles like `.ffs_db` count too.
        let name = match path.file_name().and_then(|n| n.to_str()) {
            Some(name) => name.to_lowercase(),
            None => return false,
        };
        self.skip_extensions.iter().any(|skip| {
            let skip = skip.trim_start_matches('.').to_lowercase();
            !skip.is_empty() && name.ends_with(&format!(".{}", skip))
        })
    }
}
