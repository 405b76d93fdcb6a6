use std::sync::Mutex;
use std::time::Duration;

use colored::*;
use dlrename_core::ProgressReporter;
use indicatif::{ProgressBar, ProgressStyle};

/// CLI progress reporter using an indicatif bar for the execution phase.
pub struct CliReporter {
    bar: Mutex<Option<ProgressBar>>,
}

impl CliReporter {
    pub fn new() -> Self {
        Self {
            bar: Mutex::new(None),
        }
    }

    fn set_bar(&self, pb: ProgressBar) {
        if let Ok(mut guard) = self.bar.lock() {
            if let Some(old) = guard.take() {
                old.finish_and_clear();
            }
            *guard = Some(pb);
        }
    }

    fn finish_bar(&self) {
        if let Ok(mut guard) = self.bar.lock() {
            if let Some(pb) = guard.take() {
                pb.finish_and_clear();
            }
        }
    }
}

impl ProgressReporter for CliReporter {
    fn on_scan_complete(&self, folders: usize) {
        eprintln!("  {} Scan complete: {} folders", "✓".green(), folders);
    }

    fn on_plan_complete(&self, operations: usize, actionable: usize) {
        eprintln!(
            "  {} Plan complete: {} operations, {} to apply",
            "✓".green(),
            operations,
            actionable
        );
    }

    fn on_execute_start(&self, total: usize) {
        let style = ProgressStyle::with_template(
            "  {spinner:.cyan} Renaming [{bar:30.cyan/dim}] {pos}/{len} {wide_msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("━╸─")
        .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏");

        let pb = ProgressBar::new(total as u64);
        pb.set_style(style);
        pb.enable_steady_tick(Duration::from_millis(80));
        self.set_bar(pb);
    }

    fn on_execute_progress(&self, done: usize, _total: usize, current: &str) {
        if let Ok(guard) = self.bar.lock() {
            if let Some(pb) = guard.as_ref() {
                pb.set_position(done as u64);
                pb.set_message(current.to_string());
            }
        }
    }

    fn on_execute_complete(&self, succeeded: usize, failed: usize) {
        self.finish_bar();
        if failed == 0 {
            eprintln!("  {} Execution complete: {} succeeded", "✓".green(), succeeded);
        } else {
            eprintln!(
                "  {} Execution complete: {} succeeded, {} failed",
                "✗".red(),
                succeeded,
                failed
            );
        }
    }
}
