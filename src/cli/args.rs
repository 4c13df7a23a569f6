//! Command-line argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::config::{Config, CounterStyle, LengthUnit, NamingConfig};

/// Mail folder archiver CLI.
#[derive(Parser, Debug)]
#[command(
    name = "mail-archiver",
    version,
    about = "Archive exported mail and loose files into dated folders",
    long_about = "A CLI tool that moves exported .eml messages and other files into \
                  <root>/<YYYY>/<YYYY-MM> folders without ever overwriting anything.\n\n\
                  Names are sanitized for Windows and POSIX filesystems, kept within a \
                  path-length budget, and renamed on collision."
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Path to configuration file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Hide progress bars and informational console output.
    #[arg(long, short, global = true)]
    pub quiet: bool,

    /// Enable debug logging.
    #[arg(long, global = true)]
    pub debug: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Move files into dated YYYY/YYYY-MM folders.
    Archive(ArchiveArgs),

    /// Move every file from subfolders into the folder itself.
    Flatten(FlattenArgs),

    /// Rename messages after their Date, Subject and From headers.
    Rename(RenameArgs),

    /// Compare two folder trees.
    Diff(DiffArgs),

    /// Report missing numbers among files named with a leading number.
    Count(CountArgs),

    /// Show where a name would be placed inside a folder, without moving anything.
    Resolve(ResolveArgs),
}

#[derive(clap::Args, Debug)]
pub struct ArchiveArgs {
    /// Folder to archive.
    pub folder: PathBuf,

    /// Root of the dated folder tree. Defaults to FOLDER.
    #[arg(long)]
    pub archive_root: Option<PathBuf>,

    /// Walk subfolders too.
    #[arg(long, short)]
    pub recursive: bool,

    /// Resolve destinations without moving anything.
    #[arg(long)]
    pub dry_run: bool,

    #[command(flatten)]
    pub naming: NamingArgs,
}

#[derive(clap::Args, Debug)]
pub struct FlattenArgs {
    /// Folder to flatten.
    pub folder: PathBuf,

    /// Leave emptied subfolders in place.
    #[arg(long)]
    pub keep_empty_dirs: bool,

    /// Resolve destinations without moving anything.
    #[arg(long)]
    pub dry_run: bool,

    #[command(flatten)]
    pub naming: NamingArgs,
}

#[derive(clap::Args, Debug)]
pub struct RenameArgs {
    /// Folder whose .eml files are renamed.
    pub folder: PathBuf,

    /// Resolve names without moving anything.
    #[arg(long)]
    pub dry_run: bool,

    #[command(flatten)]
    pub naming: NamingArgs,
}

#[derive(clap::Args, Debug)]
pub struct DiffArgs {
    /// First folder.
    pub left: PathBuf,

    /// Second folder.
    pub right: PathBuf,

    /// Also compare the content of common files.
    #[arg(long)]
    pub content: bool,

    /// Write the text report to this file.
    #[arg(long, short)]
    pub output: Option<PathBuf>,

    /// Print the report as JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(clap::Args, Debug)]
pub struct CountArgs {
    /// Folder to check.
    pub folder: PathBuf,

    /// First expected number.
    #[arg(long)]
    pub start: u64,

    /// Last expected number.
    #[arg(long)]
    pub end: u64,

    /// Report file. Defaults to relatorio_verificacao_<folder>.txt inside FOLDER.
    #[arg(long, short)]
    pub output: Option<PathBuf>,

    /// Print the report as JSON instead of writing a file.
    #[arg(long)]
    pub json: bool,
}

#[derive(clap::Args, Debug)]
pub struct ResolveArgs {
    /// Raw file name.
    pub name: String,

    /// Target folder.
    pub dir: PathBuf,

    /// Print the resolution as JSON.
    #[arg(long)]
    pub json: bool,

    #[command(flatten)]
    pub naming: NamingArgs,
}

/// Naming overrides shared by the commands that place files.
#[derive(clap::Args, Debug, Default)]
pub struct NamingArgs {
    /// Maximum full path length of the target filesystem.
    #[arg(long)]
    pub max_path_length: Option<usize>,

    /// Units kept free below the maximum path length.
    #[arg(long)]
    pub safety_margin: Option<usize>,

    /// How path lengths are measured.
    #[arg(long, value_enum)]
    pub length_unit: Option<LengthUnitArg>,

    /// Renaming attempts before giving up on a duplicate.
    #[arg(long)]
    pub max_attempts: Option<u32>,

    /// Counter used for the first renaming attempts.
    #[arg(long, value_enum)]
    pub counter_style: Option<CounterStyleArg>,

    /// Remove reserved characters instead of replacing them.
    #[arg(long)]
    pub remove_reserved: bool,
}

/// CLI length unit argument.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum LengthUnitArg {
    /// Count characters.
    Chars,
    /// Count UTF-8 bytes.
    Bytes,
}

impl From<LengthUnitArg> for LengthUnit {
    fn from(arg: LengthUnitArg) -> Self {
        match arg {
            LengthUnitArg::Chars => LengthUnit::Chars,
            LengthUnitArg::Bytes => LengthUnit::Bytes,
        }
    }
}

/// CLI counter style argument.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum CounterStyleArg {
    /// _1, _2, ...
    Numeric,
    /// _a, _b, ...
    Alphabetic,
}

impl From<CounterStyleArg> for CounterStyle {
    fn from(arg: CounterStyleArg) -> Self {
        match arg {
            CounterStyleArg::Numeric => CounterStyle::Numeric,
            CounterStyleArg::Alphabetic => CounterStyle::Alphabetic,
        }
    }
}

impl NamingArgs {
    /// Override naming settings where specified.
    pub fn merge_into(&self, naming: &mut NamingConfig) {
        if let Some(max) = self.max_path_length {
            naming.max_path_length = max;
        }

        if let Some(margin) = self.safety_margin {
            naming.safety_margin = margin;
        }

        if let Some(unit) = self.length_unit {
            naming.length_unit = unit.into();
        }

        if let Some(attempts) = self.max_attempts {
            naming.max_attempts = attempts;
        }

        if let Some(style) = self.counter_style {
            naming.counter_style = style.into();
        }

        if self.remove_reserved {
            naming.reserved_replacement = String::new();
        }
    }
}

impl Command {
    /// Short name used for log file names.
    pub fn name(&self) -> &'static str {
        match self {
            Command::Archive(_) => "archive",
            Command::Flatten(_) => "flatten",
            Command::Rename(_) => "rename",
            Command::Diff(_) => "diff",
            Command::Count(_) => "count",
            Command::Resolve(_) => "resolve",
        }
    }

    /// Folder whose tree this command moves files around in, unless it is a dry run.
    pub fn mutated_folder(&self) -> Option<&PathBuf> {
        match self {
            Command::Archive(args) if !args.dry_run => Some(&args.folder),
            Command::Flatten(args) if !args.dry_run => Some(&args.folder),
            Command::Rename(args) if !args.dry_run => Some(&args.folder),
            _ => None,
        }
    }
}

impl Args {
    /// Merge CLI arguments into an existing config, overriding where specified.
    pub fn merge_into_config(&self, config: &mut Config) {
        match &self.command {
            Command::Archive(args) => {
                if let Some(root) = &args.archive_root {
                    config.archive.archive_root = Some(root.clone());
                }

                // Boolean flags (only override if set to non-default)
                if args.recursive {
                    config.archive.recursive = true;
                }

                args.naming.merge_into(&mut config.naming);
            }
            Command::Flatten(args) => {
                if args.keep_empty_dirs {
                    config.archive.remove_empty_dirs = false;
                }

                args.naming.merge_into(&mut config.naming);
            }
            Command::Rename(args) => args.naming.merge_into(&mut config.naming),
            Command::Resolve(args) => args.naming.merge_into(&mut config.naming),
            Command::Diff(_) | Command::Count(_) => {}
        }
    }
}
