use crate::conflict::AcceptedPlan;
use crate::model::{OperationKind, PlannedOperation};
use crate::platform;
use crate::progress::ProgressReporter;
use chrono::{Local, NaiveDate, NaiveTime, TimeZone, Utc};
use filetime::FileTime;
use serde::Serialize;
use std::borrow::Cow;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, error, info, warn};

/// Why a single operation failed. Never aborts the batch.
#[derive(Error, Debug)]
pub enum OperationError {
    #[error("Source not found: {}", .0.display())]
    SourceMissing(PathBuf),

    #[error("Not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    #[error("Target already exists: {}", .0.display())]
    TargetExists(PathBuf),

    #[error("Rename failed: {0}")]
    Rename(#[source] io::Error),

    #[error("Verification failed: target not found after rename")]
    Verification,

    #[error("Failed to update mtime for {}: {source}", path.display())]
    Timestamp {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "detail", rename_all = "snake_case")]
pub enum TimestampStatus {
    Applied,
    Failed(String),
    /// The record has no purchase date; the existing timestamp is kept.
    NoDate,
    Disabled,
    /// The rename failed first.
    NotAttempted,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExecutionOutcome {
    pub source: PathBuf,
    pub target: PathBuf,
    pub kind: OperationKind,
    pub succeeded: bool,
    pub error_detail: Option<String>,
    pub timestamp_applied: bool,
    pub timestamp: TimestampStatus,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExecutionSummary {
    pub renamed: usize,
    pub mtime_only: usize,
    pub failed: usize,
    pub skipped: usize,
    pub timestamps_applied: usize,
    pub timestamps_missing: usize,
}

impl ExecutionSummary {
    pub fn succeeded(&self) -> usize {
        self.renamed + self.mtime_only
    }

    fn record(&mut self, outcome: &ExecutionOutcome) {
        if outcome.succeeded {
            match outcome.kind {
                OperationKind::Rename => self.renamed += 1,
                OperationKind::MtimeOnly => self.mtime_only += 1,
                OperationKind::Skip => {}
            }
        } else {
            self.failed += 1;
        }
        match outcome.timestamp {
            TimestampStatus::Applied => self.timestamps_applied += 1,
            TimestampStatus::NoDate => self.timestamps_missing += 1,
            _ => {}
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ExecutionReport {
    pub outcomes: Vec<ExecutionOutcome>,
    pub summary: ExecutionSummary,
}

impl ExecutionReport {
    pub fn failures(&self) -> impl Iterator<Item = &ExecutionOutcome> {
        self.outcomes.iter().filter(|o| !o.succeeded)
    }

    pub fn is_success(&self) -> bool {
        self.summary.failed == 0
    }

    pub fn log_summary(&self) {
        let summary = &self.summary;
        info!("{}", "=".repeat(80));
        info!("RENAMING SUMMARY");
        info!("{}", "=".repeat(80));
        info!("Total operations: {}", self.outcomes.len());
        info!("Renamed: {}", summary.renamed);
        info!("Mtime only: {}", summary.mtime_only);
        info!("Failed: {}", summary.failed);
        info!("Skipped: {}", summary.skipped);
        info!(
            "Timestamps applied: {}, without purchase date: {}",
            summary.timestamps_applied, summary.timestamps_missing
        );

        if summary.failed > 0 {
            info!("Failed operations:");
            for outcome in self.failures() {
                info!("  {} => {}", file_name(&outcome.source), file_name(&outcome.target));
                if let Some(detail) = &outcome.error_detail {
                    info!("    Reason: {}", detail);
                }
            }
        }
        info!("{}", "=".repeat(80));
    }
}

/// Local midnight of `date`, the time every folder timestamp is set to.
pub fn midnight_file_time(date: NaiveDate) -> FileTime {
    let seconds = day_start(&Local, date).unwrap_or_else(|| {
        Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN))
            .timestamp()
    });
    FileTime::from_unix_time(seconds, 0)
}

// Midnight can fall into a DST gap; take the first whole hour that exists.
fn day_start<Tz: TimeZone>(tz: &Tz, date: NaiveDate) -> Option<i64> {
    (0..24).find_map(|hour| {
        let local = date.and_hms_opt(hour, 0, 0)?;
        tz.from_local_datetime(&local)
            .earliest()
            .map(|dt| dt.timestamp())
    })
}

/// Apply an accepted plan sequentially in scan order. A failing operation is
/// recorded and the run moves on to the next one.
pub fn execute_plan(plan: &AcceptedPlan, reporter: &dyn ProgressReporter) -> ExecutionReport {
    let actionable: Vec<&PlannedOperation> = plan.actionable().collect();
    let total = actionable.len();

    let mut summary = ExecutionSummary {
        skipped: plan.count(OperationKind::Skip),
        ..Default::default()
    };
    let mut outcomes = Vec::with_capacity(total);

    reporter.on_execute_start(total);
    for (index, op) in actionable.into_iter().enumerate() {
        let outcome = execute_operation(op, plan.timestamps_enabled);
        log_outcome(&outcome);
        summary.record(&outcome);
        outcomes.push(outcome);
        reporter.on_execute_progress(index + 1, total, op.final_name());
    }
    reporter.on_execute_complete(summary.succeeded(), summary.failed);

    let report = ExecutionReport { outcomes, summary };
    report.log_summary();
    report
}

fn execute_operation(op: &PlannedOperation, timestamps_enabled: bool) -> ExecutionOutcome {
    let mut outcome = ExecutionOutcome {
        source: op.source.path.clone(),
        target: op.target_path.clone(),
        kind: op.kind,
        succeeded: false,
        error_detail: None,
        timestamp_applied: false,
        timestamp: TimestampStatus::NotAttempted,
    };

    let renamed = check_source(&op.source.path).and_then(|()| match op.kind {
        OperationKind::Rename => rename_folder(&op.source.path, &op.target_path),
        _ => Ok(()),
    });
    if let Err(err) = renamed {
        outcome.error_detail = Some(err.to_string());
        return outcome;
    }

    outcome.timestamp = match op.new_mtime {
        Some(date) => match apply_timestamp(&op.target_path, date) {
            Ok(()) => TimestampStatus::Applied,
            Err(err) => TimestampStatus::Failed(err.to_string()),
        },
        None if timestamps_enabled => TimestampStatus::NoDate,
        None => TimestampStatus::Disabled,
    };
    outcome.timestamp_applied = outcome.timestamp == TimestampStatus::Applied;

    match &outcome.timestamp {
        TimestampStatus::Failed(detail) => outcome.error_detail = Some(detail.clone()),
        _ => outcome.succeeded = true,
    }
    outcome
}

fn check_source(source: &Path) -> Result<(), OperationError> {
    if !source.exists() {
        return Err(OperationError::SourceMissing(source.to_path_buf()));
    }
    if !source.is_dir() {
        return Err(OperationError::NotADirectory(source.to_path_buf()));
    }
    Ok(())
}

fn rename_folder(source: &Path, target: &Path) -> Result<(), OperationError> {
    // rename(2) silently replaces an empty target directory.
    if target.exists() && !platform::is_same_folder(source, target) {
        return Err(OperationError::TargetExists(target.to_path_buf()));
    }

    fs::rename(source, target).map_err(OperationError::Rename)?;

    if !target.is_dir() {
        return Err(OperationError::Verification);
    }
    Ok(())
}

fn apply_timestamp(path: &Path, date: NaiveDate) -> Result<(), OperationError> {
    let time = midnight_file_time(date);
    filetime::set_file_times(path, time, time).map_err(|source| OperationError::Timestamp {
        path: path.to_path_buf(),
        source,
    })?;
    debug!("Updated mtime for {} to {}", file_name(path), date.format("%Y-%m-%d"));
    Ok(())
}

fn log_outcome(outcome: &ExecutionOutcome) {
    let source = file_name(&outcome.source);
    let target = file_name(&outcome.target);

    if !outcome.succeeded {
        error!("FAILED: {} => {}", source, target);
        if let Some(detail) = &outcome.error_detail {
            error!("  Error: {}", detail);
        }
        return;
    }

    match outcome.kind {
        OperationKind::MtimeOnly => info!("SUCCESS (mtime only): {}", source),
        _ => info!("SUCCESS: {} => {}", source, target),
    }
    if outcome.timestamp == TimestampStatus::NoDate {
        warn!("  No purchase date for {}, timestamp left unchanged", target);
    }
}

fn file_name(path: &Path) -> Cow<'_, str> {
    path.file_name()
        .map(|n| n.to_string_lossy())
        .unwrap_or_else(|| path.to_string_lossy())
}
