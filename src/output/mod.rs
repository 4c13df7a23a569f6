//! Output module for console output and progress.
//!
//! Provides:
//! - Colored console output
//! - Progress bars
//! - Statistics reporting

pub mod console;
pub mod progress;
pub mod stats;

pub use console::{print_banner, print_config_summary, print_error, print_info, print_success, print_warning};
pub use progress::{create_item_bar, run_bar};
pub use stats::{
    print_count_summary, print_diff_summary, print_rename_stats, print_resolution, print_run_stats,
};
