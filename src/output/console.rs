//! Console output utilities.

use console::style;

/// Print an info message.
pub fn print_info(message: &str) {
    println!("{} {}", style("INFO").cyan().bold(), message);
}

/// Print a success message.
pub fn print_success(message: &str) {
    println!("{} {}", style("OK").green().bold(), message);
}

/// Print a warning message.
pub fn print_warning(message: &str) {
    eprintln!("{} {}", style("WARN").yellow().bold(), message);
}

/// Print an error message.
pub fn print_error(message: &str) {
    eprintln!("{} {}", style("ERROR").red().bold(), message);
}

/// Print the application banner.
pub fn print_banner() {
    let banner = r#"
╔═══════════════════════════════════════════════════════╗
║     Mail Archiver                                     ║
║     Dated, collision-free folders for exported mail   ║
╚═══════════════════════════════════════════════════════╝
"#;
    println!("{}", style(banner).cyan());
}

/// Print configuration summary.
pub fn print_config_summary(
    command: &str,
    folder: &str,
    archive_root: &str,
    max_path_length: usize,
    length_unit: &str,
) {
    println!();
    println!("{}", style("Configuration:").bold());
    println!("  Command: {}", command);
    println!("  Folder: {}", folder);
    println!("  Archive root: {}", archive_root);
    println!("  Path budget: {} {}", max_path_length, length_unit);
    println!();
}
