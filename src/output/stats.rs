//! Run summary reporting.

use console::style;

use crate::download::RunStats;

/// Print the end-of-run summary to the console.
pub fn print_run_summary(stats: &RunStats) {
    println!();
    println!("{}", style("═".repeat(50)).dim());
    println!("{}", style("Download Summary:").bold());
    println!("  Processed: {}", stats.total);
    println!("  Saved:     {}", style(stats.saved).green());
    println!("  Skipped:   {} (already downloaded)", style(stats.skipped).yellow());
    if stats.failed > 0 {
        println!("  Failed:    {}", style(stats.failed).red());
    } else {
        println!("  Failed:    0");
    }
    println!("  Files:     {}", stats.files_written);
    println!("{}", style("═".repeat(50)).dim());
}

/// Write the same summary to the log.
pub fn log_run_summary(stats: &RunStats) {
    tracing::info!(
        "Run complete: {} processed, {} saved, {} skipped, {} failed, {} files written",
        stats.total,
        stats.saved,
        stats.skipped,
        stats.failed,
        stats.files_written
    );
}
