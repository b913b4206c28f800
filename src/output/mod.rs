//! Output module for console output and progress.
//!
//! Provides:
//! - Colored console output
//! - Progress bars
//! - Run summary reporting

pub mod console;
pub mod progress;
pub mod stats;

pub use console::{
    print_banner, print_config_summary, print_error, print_info, print_success, print_warning,
    redact_proxy,
};
pub use progress::{create_download_bar, create_spinner};
pub use stats::{log_run_summary, print_run_summary};
