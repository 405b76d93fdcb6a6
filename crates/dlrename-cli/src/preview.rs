use chrono::NaiveDate;
use colored::*;
use dlrename_core::{ConflictGroup, ExecutionReport, OperationKind, Plan, PlannedOperation};
use serde::Serialize;
use tabled::settings::Style;
use tabled::{Table, Tabled};

const NAME_WIDTH: usize = 40;

#[derive(Debug, Clone, Tabled)]
struct PreviewRow {
    #[tabled(rename = "Action")]
    action: String,
    #[tabled(rename = "Current name")]
    current: String,
    #[tabled(rename = "New name")]
    target: String,
    #[tabled(rename = "Purchase date")]
    date: String,
}

#[derive(Debug, Clone, Tabled)]
struct SkippedRow {
    #[tabled(rename = "Folder")]
    folder: String,
    #[tabled(rename = "Reason")]
    reason: String,
}

#[derive(Debug, Serialize)]
struct PreviewEntry<'a> {
    kind: OperationKind,
    identifier: &'a str,
    old: String,
    new: String,
    old_name: &'a str,
    new_name: &'a str,
    purchase_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    skip_reason: Option<String>,
}

#[derive(Debug, Serialize)]
struct PreviewDocument<'a> {
    operations: Vec<PreviewEntry<'a>>,
    unmatched: Vec<&'a str>,
}

/// Cut long names on a char boundary so the table stays readable.
fn shorten(name: &str, width: usize) -> String {
    if name.chars().count() <= width {
        return name.to_string();
    }
    let head: String = name.chars().take(width.saturating_sub(3)).collect();
    format!("{}...", head)
}

fn format_date(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "-".to_string())
}

fn preview_row(op: &PlannedOperation) -> PreviewRow {
    PreviewRow {
        action: op.kind.to_string(),
        current: shorten(&op.source.name, NAME_WIDTH),
        target: match op.kind {
            OperationKind::MtimeOnly => "(unchanged)".to_string(),
            _ => shorten(op.final_name(), NAME_WIDTH),
        },
        date: format_date(op.new_mtime),
    }
}

pub fn print_table(plan: &Plan) {
    let rows: Vec<PreviewRow> = plan.actionable().map(preview_row).collect();

    println!();
    println!("{}", "PREVIEW: Planned changes".bold());
    if rows.is_empty() {
        println!("  Nothing to apply");
    } else {
        println!("{}", Table::new(rows).with(Style::psql()));
    }

    let skipped: Vec<SkippedRow> = plan
        .of_kind(OperationKind::Skip)
        .map(|op| SkippedRow {
            folder: shorten(&op.source.name, NAME_WIDTH),
            reason: op
                .skip_reason
                .map(|reason| reason.to_string())
                .unwrap_or_default(),
        })
        .collect();
    if !skipped.is_empty() {
        println!();
        println!("{}", format!("Skipped ({})", skipped.len()).yellow().bold());
        println!("{}", Table::new(skipped).with(Style::psql()));
    }

    println!();
    println!(
        "{} renames, {} mtime only, {} skipped",
        plan.count(OperationKind::Rename).to_string().green(),
        plan.count(OperationKind::MtimeOnly).to_string().cyan(),
        plan.count(OperationKind::Skip).to_string().yellow(),
    );
}

pub fn print_json(plan: &Plan) -> serde_json::Result<()> {
    let document = PreviewDocument {
        operations: plan
            .operations
            .iter()
            .map(|op| PreviewEntry {
                kind: op.kind,
                identifier: &op.identifier,
                old: op.source.path.display().to_string(),
                new: op.target_path.display().to_string(),
                old_name: &op.source.name,
                new_name: op.final_name(),
                purchase_date: op.new_mtime,
                skip_reason: op.skip_reason.map(|reason| reason.to_string()),
            })
            .collect(),
        unmatched: plan.unmatched.iter().map(|entry| entry.name.as_str()).collect(),
    };
    println!("{}", serde_json::to_string_pretty(&document)?);
    Ok(())
}

pub fn print_conflicts(groups: &[ConflictGroup]) {
    eprintln!();
    eprintln!(
        "{}",
        format!("{} duplicate target name(s) detected", groups.len())
            .red()
            .bold()
    );
    for group in groups {
        eprintln!("  {}", group.target_name().bold());
        for source in &group.sources {
            let name = source
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| source.display().to_string());
            eprintln!("    - {}", name);
        }
    }
    eprintln!("Resolve the duplicates before renaming; no folder was changed.");
}

pub fn print_summary(report: &ExecutionReport) {
    let summary = &report.summary;
    println!();
    println!("{}", "RENAMING SUMMARY".bold());
    println!("  Renamed:    {}", summary.renamed.to_string().green());
    println!("  Mtime only: {}", summary.mtime_only.to_string().cyan());
    println!("  Skipped:    {}", summary.skipped.to_string().yellow());
    if summary.failed > 0 {
        println!("  Failed:     {}", summary.failed.to_string().red());
        for outcome in report.failures() {
            println!(
                "    {} {}",
                outcome.source.display(),
                outcome.error_detail.as_deref().unwrap_or("").red()
            );
        }
    } else {
        println!("  Failed:     0");
    }
}
