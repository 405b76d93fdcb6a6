use crate::config::AppConfig;
use crate::conflict::{self, AcceptedPlan};
use crate::error::Error;
use crate::executor::{self, ExecutionReport};
use crate::matcher::IdentifierMatcher;
use crate::model::{FolderEntry, OperationKind, SkipReason};
use crate::plan::{self, Plan, PlanOptions};
use crate::progress::ProgressReporter;
use crate::records::RecordIndex;
use crate::scanner;
use std::path::Path;
use tracing::{debug, info};

/// Entry point for a run: load, plan, gate, execute. Planning and execution
/// are separate calls so a confirmation step can sit between them.
pub struct RenameEngine {
    config: AppConfig,
    matcher: IdentifierMatcher,
}

impl RenameEngine {
    pub fn new(config: AppConfig) -> Result<Self, Error> {
        config.validate()?;
        let matcher = IdentifierMatcher::new(&config.identifier_prefix)?;
        Ok(Self { config, matcher })
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Load the configured data file. An export without any usable row is an
    /// error.
    pub fn load_records(&self) -> Result<RecordIndex, Error> {
        info!("Loading CSV: {}", self.config.data_file.display());
        let index = RecordIndex::load(&self.config.data_file, self.config.duplicate_policy)?;
        if index.is_empty() {
            return Err(Error::InvalidInput(format!(
                "No valid entries found in {}",
                self.config.data_file.display()
            )));
        }
        info!("Loaded {} entries from CSV", index.len());
        Ok(index)
    }

    pub fn scan(&self, dir: &Path) -> Result<Vec<FolderEntry>, Error> {
        info!("Scanning directory: {}", dir.display());
        scanner::scan_folders(dir, &self.matcher)
    }

    /// Scan `dir` and compute the plan without touching the filesystem.
    pub fn compute_plan(
        &self,
        dir: &Path,
        records: &RecordIndex,
        reporter: &dyn ProgressReporter,
    ) -> Result<Plan, Error> {
        let entries = self.scan(dir)?;
        reporter.on_scan_complete(entries.len());
        Ok(self.plan_entries(&entries, records, reporter))
    }

    pub fn plan_entries(
        &self,
        entries: &[FolderEntry],
        records: &RecordIndex,
        reporter: &dyn ProgressReporter,
    ) -> Plan {
        let options = PlanOptions::from(&self.config);
        if options.remove_suffix {
            info!("Suffix removal enabled: .partN is dropped when an identifier has a single folder");
        }
        if options.match_titles {
            info!("Title matching enabled: folders already named after a title get their mtime updated");
        }

        let plan = plan::build_plan(entries, records, &self.matcher, &options);

        for op in plan.of_kind(OperationKind::Skip) {
            match op.skip_reason {
                Some(reason) => info!("SKIPPED: {} ({})", op.source.name, reason),
                None => info!("SKIPPED: {}", op.source.name),
            }
        }

        let not_found = plan
            .of_kind(OperationKind::Skip)
            .filter(|op| op.skip_reason == Some(SkipReason::NotInRecords))
            .count();
        if not_found > 0 {
            info!(
                "Identifiers not in CSV: {} (normal if you don't have every item downloaded)",
                not_found
            );
        }
        debug!("{} folders without an identifier", plan.unmatched.len());
        info!(
            "Generated plan: {} renames, {} mtime only, {} skipped",
            plan.count(OperationKind::Rename),
            plan.count(OperationKind::MtimeOnly),
            plan.count(OperationKind::Skip),
        );

        reporter.on_plan_complete(plan.operations.len(), plan.actionable().count());
        plan
    }

    /// Reject the plan when two folders would share a target.
    pub fn check(&self, plan: Plan) -> Result<AcceptedPlan, Error> {
        conflict::check_plan(plan)
    }

    pub fn execute(&self, plan: &AcceptedPlan, reporter: &dyn ProgressReporter) -> ExecutionReport {
        info!("Executing renaming operations...");
        if plan.timestamps_enabled {
            info!("Modification times will be updated to purchase dates (00:00:00)");
        }
        executor::execute_plan(plan, reporter)
    }
}
