//! Mail Archiver - CLI entry point.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use tracing::info;

use mail_archiver::{
    archive::{archive_folder, flatten_folder, rename_messages, RunState},
    cli::{Args, Command, CountArgs, DiffArgs, ResolveArgs},
    config::{validate_config, Config},
    dedup::{Outcome, Resolver},
    error::{exit_codes, Error, Result},
    logging::{init_logging, log_file_path},
    output::{
        print_banner, print_config_summary, print_count_summary, print_diff_summary, print_error,
        print_info, print_rename_stats, print_resolution, print_run_stats, print_success,
        print_warning, run_bar,
    },
    report::{count_numbered, default_report_path, diff_folders, write_report},
};

fn main() -> ExitCode {
    match run() {
        Ok(code) => ExitCode::from(code as u8),
        Err(e) => {
            print_error(&format!("{}", e));
            match e {
                Error::Config(_)
                | Error::ConfigValidation { .. }
                | Error::MissingConfig(_)
                | Error::TomlParse(_) => ExitCode::from(exit_codes::CONFIG_ERROR as u8),
                Error::InvalidFolder(_) | Error::Io(_) | Error::Walk(_) | Error::Report(_) => {
                    ExitCode::from(exit_codes::IO_ERROR as u8)
                }
                _ => ExitCode::from(exit_codes::UNEXPECTED_ERROR as u8),
            }
        }
    }
}

fn run() -> Result<i32> {
    // Parse CLI arguments
    let args = Args::parse();

    // Load configuration
    let mut config = load_config(args.config.as_deref())?;

    // Merge CLI arguments into config
    args.merge_into_config(&mut config);

    // Validate configuration
    validate_config(&config)?;

    // Set up logging, with a run log for commands that move files
    let log_file =
        log_dir_for(&args.command, &config).map(|dir| log_file_path(&dir, args.command.name()));
    if let Some(path) = init_logging(args.debug, args.quiet, log_file) {
        info!("Logging to {}", path.display());
    }

    match &args.command {
        Command::Archive(archive) => {
            if !args.quiet {
                print_banner();
                print_config_summary(
                    args.command.name(),
                    &archive.folder.display().to_string(),
                    &config.archive.archive_root_for(&archive.folder).display().to_string(),
                    config.naming.effective_max_length(),
                    &config.naming.length_unit.to_string(),
                );
            }
            let bar = run_bar("Archiving", args.quiet);
            let state = archive_folder(&archive.folder, &config, archive.dry_run, &bar)?;
            bar.finish_and_clear();
            Ok(finish_run("Archive", &state, args.quiet))
        }
        Command::Flatten(flatten) => {
            if !args.quiet {
                print_banner();
            }
            let bar = run_bar("Flattening", args.quiet);
            let state = flatten_folder(&flatten.folder, &config, flatten.dry_run, &bar)?;
            bar.finish_and_clear();
            Ok(finish_run("Flatten", &state, args.quiet))
        }
        Command::Rename(rename) => {
            if !args.quiet {
                print_banner();
            }
            let bar = run_bar("Renaming", args.quiet);
            let state = rename_messages(&rename.folder, &config, rename.dry_run, &bar)?;
            bar.finish_and_clear();
            info!(
                "Rename finished: {} renamed, {} duplicates, {} problems, {} failed",
                state.renamed, state.duplicates, state.problems, state.failed
            );
            if !args.quiet || state.has_failures() {
                print_rename_stats(&state);
            }
            if state.has_failures() {
                print_warning(&format!("{} message(s) could not be renamed", state.failed));
                Ok(exit_codes::SOME_FILES_FAILED)
            } else {
                Ok(exit_codes::SUCCESS)
            }
        }
        Command::Diff(diff) => run_diff(diff, &config),
        Command::Count(count) => run_count(count),
        Command::Resolve(resolve) => run_resolve(resolve, &config),
    }
}

/// Load the configuration file, falling back to defaults when it is absent.
fn load_config(path: Option<&Path>) -> Result<Config> {
    let path = match path.map(Path::to_path_buf).or_else(Config::default_path) {
        Some(path) => path,
        None => return Ok(Config::default()),
    };

    if path.exists() {
        return Config::load(&path);
    }

    print_warning(&format!("Configuration file not found: {}", path.display()));
    print_info("Using default configuration with CLI arguments");
    Ok(Config::default())
}

/// Folder receiving the run log, for commands that move files.
fn log_dir_for(command: &Command, config: &Config) -> Option<PathBuf> {
    let folder = command.mutated_folder()?;
    let root = match command {
        Command::Archive(_) => config.archive.archive_root_for(folder),
        _ => folder.clone(),
    };
    Some(root.join(&config.archive.log_folder))
}

fn finish_run(title: &str, state: &RunState, quiet: bool) -> i32 {
    info!(
        "{} finished: {} moved, {} planned, {} failed",
        title, state.moved, state.planned, state.failed
    );
    if !quiet || state.has_failures() {
        print_run_stats(title, state);
    }

    if state.has_failures() {
        print_warning(&format!("{} file(s) could not be placed", state.failed));
        exit_codes::SOME_FILES_FAILED
    } else {
        exit_codes::SUCCESS
    }
}

fn run_diff(args: &DiffArgs, config: &Config) -> Result<i32> {
    let report = diff_folders(&args.left, &args.right, args.content, &config.archive)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", report.render());
        print_diff_summary(&report);
    }

    if let Some(output) = &args.output {
        write_report(output, &report.render())?;
        print_success(&format!("Report saved to {}", output.display()));
    }

    Ok(exit_codes::SUCCESS)
}

fn run_count(args: &CountArgs) -> Result<i32> {
    let report = count_numbered(&args.folder, args.start, args.end)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(exit_codes::SUCCESS);
    }

    let output = args
        .output
        .clone()
        .unwrap_or_else(|| default_report_path(&args.folder));
    write_report(&output, &report.render())?;
    print_count_summary(&report);
    print_success(&format!("Report saved to {}", output.display()));

    Ok(exit_codes::SUCCESS)
}

fn run_resolve(args: &ResolveArgs, config: &Config) -> Result<i32> {
    let resolver = Resolver::new(config.naming.resolver_options());
    let resolution = resolver.resolve(&args.name, None, &args.dir);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&resolution)?);
    } else {
        print_resolution(&resolution);
    }

    match resolution.outcome {
        Outcome::Unresolvable(_) => Ok(exit_codes::SOME_FILES_FAILED),
        _ => Ok(exit_codes::SUCCESS),
    }
}
