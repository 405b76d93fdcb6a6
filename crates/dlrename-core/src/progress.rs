/// Trait for reporting run progress.
///
/// The CLI implements this with an indicatif bar. All methods have default
/// no-op implementations.
pub trait ProgressReporter {
    fn on_scan_complete(&self, _folders: usize) {}
    fn on_plan_complete(&self, _operations: usize, _actionable: usize) {}
    fn on_execute_start(&self, _total: usize) {}
    fn on_execute_progress(&self, _done: usize, _total: usize, _current: &str) {}
    fn on_execute_complete(&self, _succeeded: usize, _failed: usize) {}
}

/// No-op progress reporter for silent operation.
pub struct SilentReporter;

impl ProgressReporter for SilentReporter {}
