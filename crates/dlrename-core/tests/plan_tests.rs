use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use chrono::NaiveDate;
use tempfile::{tempdir, TempDir};

use dlrename_core::{
    AppConfig, Error, NameStyle, OperationKind, Plan, PlannedOperation, RenameEngine, SilentReporter,
    SkipReason,
};

/// A scratch archive: `root/archive/<folders>` plus `root/purchases.csv`.
struct Fixture {
    _tmp: TempDir,
    archive: PathBuf,
    csv: PathBuf,
}

fn fixture(folders: &[&str], csv_rows: &[&str]) -> Fixture {
    let tmp = tempdir().unwrap();
    let archive = tmp.path().join("archive");
    fs::create_dir_all(&archive).unwrap();
    for folder in folders {
        fs::create_dir(archive.join(folder)).unwrap();
    }

    let csv = tmp.path().join("purchases.csv");
    let mut content = String::from("rj_number,title,purchase_date\n");
    for row in csv_rows {
        content.push_str(row);
        content.push('\n');
    }
    fs::write(&csv, content).unwrap();

    Fixture {
        _tmp: tmp,
        archive,
        csv,
    }
}

fn config_for(fx: &Fixture) -> AppConfig {
    AppConfig {
        data_file: fx.csv.clone(),
        ..Default::default()
    }
}

fn plan_with(fx: &Fixture, config: AppConfig) -> Plan {
    let engine = RenameEngine::new(config).unwrap();
    let records = engine.load_records().unwrap();
    engine
        .compute_plan(&fx.archive, &records, &SilentReporter)
        .unwrap()
}

fn op_for<'a>(plan: &'a Plan, name: &str) -> &'a PlannedOperation {
    plan.operations
        .iter()
        .find(|op| op.source.name == name)
        .unwrap_or_else(|| panic!("no operation for {}", name))
}

fn target_name(op: &PlannedOperation) -> &str {
    op.target_name.as_deref().unwrap()
}

fn in_archive(fx: &Fixture, name: &str) -> PathBuf {
    fx.archive.join(name)
}

fn exists(path: &Path) -> bool {
    path.is_dir()
}

#[test]
fn test_rename_prefixed_folder_to_new_title() {
    let fx = fixture(
        &["RJ243414_OldTitle"],
        &["RJ243414,New?Title,2019/01/21 21:56"],
    );
    let plan = plan_with(&fx, config_for(&fx));

    assert_eq!(plan.operations.len(), 1);
    let op = &plan.operations[0];
    assert_eq!(op.kind, OperationKind::Rename);
    assert_eq!(op.identifier, "RJ243414");
    assert_eq!(target_name(op), "RJ243414_New？Title");
    assert_eq!(op.target_path, in_archive(&fx, "RJ243414_New？Title"));
    assert_eq!(op.new_mtime, NaiveDate::from_ymd_opt(2019, 1, 21));
}

#[test]
fn test_shared_title_rejects_whole_batch() {
    let fx = fixture(
        &["RJ000001", "RJ000002", "RJ000003_Unrelated"],
        &[
            "RJ000001,Same Title,2020/01/01 10:00",
            "RJ000002,Same Title,2020/01/02 10:00",
            "RJ000003,Unrelated,2020/01/03 10:00",
        ],
    );
    let engine = RenameEngine::new(config_for(&fx)).unwrap();
    let records = engine.load_records().unwrap();
    let plan = engine
        .compute_plan(&fx.archive, &records, &SilentReporter)
        .unwrap();

    // the third folder alone would be a valid mtime-only update
    assert_eq!(op_for(&plan, "RJ000003_Unrelated").kind, OperationKind::MtimeOnly);

    match engine.check(plan) {
        Err(Error::Conflicts(groups)) => {
            assert_eq!(groups.len(), 1);
            assert_eq!(groups[0].target_name(), "Same Title");
            assert_eq!(
                groups[0].sources,
                vec![in_archive(&fx, "RJ000001"), in_archive(&fx, "RJ000002")]
            );
        }
        other => panic!("expected conflicts, got {:?}", other),
    }

    assert!(exists(&in_archive(&fx, "RJ000001")));
    assert!(exists(&in_archive(&fx, "RJ000002")));
    assert!(!exists(&in_archive(&fx, "Same Title")));
}

#[test]
fn test_unknown_identifier_is_skipped() {
    let fx = fixture(&["RJ500000.part2"], &["RJ111111,Other,2020/01/01 00:00"]);
    let plan = plan_with(&fx, config_for(&fx));

    let op = op_for(&plan, "RJ500000.part2");
    assert_eq!(op.kind, OperationKind::Skip);
    assert_eq!(op.skip_reason, Some(SkipReason::NotInRecords));
    assert_eq!(op.target_name, None);
    assert_eq!(op.target_path, in_archive(&fx, "RJ500000.part2"));
    assert!(!plan.has_work());
}

#[test]
fn test_lone_suffix_dropped_when_enabled() {
    let fx = fixture(&["RJ700000.part1"], &["RJ700000,Title,2020/01/01 00:00"]);
    let mut config = config_for(&fx);
    config.remove_suffix = true;
    let plan = plan_with(&fx, config);

    assert_eq!(target_name(op_for(&plan, "RJ700000.part1")), "Title");
}

#[test]
fn test_sibling_parts_keep_suffixes() {
    let fx = fixture(
        &["RJ700000.part1", "RJ700000.part2"],
        &["RJ700000,Title,2020/01/01 00:00"],
    );
    let mut config = config_for(&fx);
    config.remove_suffix = true;
    let plan = plan_with(&fx, config);

    assert_eq!(target_name(op_for(&plan, "RJ700000.part1")), "Title.part1");
    assert_eq!(target_name(op_for(&plan, "RJ700000.part2")), "Title.part2");
}

#[test]
fn test_suffix_kept_by_default() {
    let fx = fixture(
        &["RJ700000.part1", "rj800000_Old.Part3"],
        &[
            "RJ700000,Title,2020/01/01 00:00",
            "RJ800000,New,2020/01/01 00:00",
        ],
    );
    let plan = plan_with(&fx, config_for(&fx));

    assert_eq!(target_name(op_for(&plan, "RJ700000.part1")), "Title.part1");
    assert_eq!(target_name(op_for(&plan, "rj800000_Old.Part3")), "RJ800000_New.Part3");
}

#[test]
fn test_already_renamed_folders_only_need_mtime() {
    let fx = fixture(
        &["RJ000010_Done", "RJ000011_NoDate"],
        &["RJ000010,Done,2021/05/05 12:00", "RJ000011,NoDate,"],
    );
    let plan = plan_with(&fx, config_for(&fx));

    assert_eq!(plan.count(OperationKind::Rename), 0);

    let dated = op_for(&plan, "RJ000010_Done");
    assert_eq!(dated.kind, OperationKind::MtimeOnly);
    assert_eq!(dated.target_name, None);
    assert_eq!(dated.target_path, dated.source.path);
    assert_eq!(dated.new_mtime, NaiveDate::from_ymd_opt(2021, 5, 5));

    let undated = op_for(&plan, "RJ000011_NoDate");
    assert_eq!(undated.kind, OperationKind::Skip);
    assert_eq!(undated.skip_reason, Some(SkipReason::NothingToDo));
}

#[test]
fn test_title_that_sanitizes_to_nothing_is_skipped() {
    let fx = fixture(&["RJ000020"], &["RJ000020,\" . . \",2020/01/01 00:00"]);
    let plan = plan_with(&fx, config_for(&fx));

    let op = op_for(&plan, "RJ000020");
    assert_eq!(op.kind, OperationKind::Skip);
    assert_eq!(op.skip_reason, Some(SkipReason::EmptyTitle));
}

#[test]
fn test_length_limit_covers_whole_name() {
    let fx = fixture(
        &["RJ000030_x.part1", "RJ000030_x.part2"],
        &["RJ000030,abcdefghijklmnopqrstuvwxyz,2020/01/01 00:00"],
    );
    let mut config = config_for(&fx);
    config.max_length = 20;
    let plan = plan_with(&fx, config);

    let name = target_name(op_for(&plan, "RJ000030_x.part1"));
    assert_eq!(name, "RJ000030_abcde.part1");
    assert_eq!(name.chars().count(), 20);
}

#[test]
fn test_naming_styles() {
    let fx = fixture(
        &["RJ000040", "RJ000041_Old"],
        &[
            "RJ000040,Forty,2020/01/01 00:00",
            "RJ000041,FortyOne,2020/01/01 00:00",
        ],
    );

    let plan = plan_with(&fx, config_for(&fx));
    assert_eq!(target_name(op_for(&plan, "RJ000040")), "Forty");
    assert_eq!(target_name(op_for(&plan, "RJ000041_Old")), "RJ000041_FortyOne");

    let mut config = config_for(&fx);
    config.naming = NameStyle::IdentifierTitle;
    let plan = plan_with(&fx, config);
    assert_eq!(target_name(op_for(&plan, "RJ000040")), "RJ000040_Forty");

    let mut config = config_for(&fx);
    config.naming = NameStyle::Title;
    let plan = plan_with(&fx, config);
    assert_eq!(target_name(op_for(&plan, "RJ000041_Old")), "FortyOne");
}

#[test]
fn test_mtime_disabled() {
    let fx = fixture(
        &["RJ000050_Same", "RJ000051"],
        &[
            "RJ000050,Same,2020/01/01 00:00",
            "RJ000051,Fifty One,2020/01/01 00:00",
        ],
    );
    let mut config = config_for(&fx);
    config.set_mtime = false;
    let plan = plan_with(&fx, config);

    assert!(!plan.timestamps_enabled);
    let same = op_for(&plan, "RJ000050_Same");
    assert_eq!(same.kind, OperationKind::Skip);
    assert_eq!(same.skip_reason, Some(SkipReason::NothingToDo));

    let renamed = op_for(&plan, "RJ000051");
    assert_eq!(renamed.kind, OperationKind::Rename);
    assert_eq!(renamed.new_mtime, None);
}

#[test]
fn test_title_matching_for_identifierless_folders() {
    let fx = fixture(
        &["Known Title", "Known Title.part2", "Shared", "Random"],
        &[
            "RJ000060,Known Title,2019/07/07 07:07",
            "RJ000061,Shared,2019/01/01 00:00",
            "RJ000062,Shared,2019/01/02 00:00",
        ],
    );

    let plan = plan_with(&fx, config_for(&fx));
    assert!(plan.operations.is_empty());
    assert_eq!(plan.unmatched.len(), 4);

    let mut config = config_for(&fx);
    config.match_titles = true;
    config.remove_suffix = true;
    let plan = plan_with(&fx, config);

    let op = op_for(&plan, "Known Title");
    assert_eq!(op.kind, OperationKind::MtimeOnly);
    assert_eq!(op.identifier, "RJ000060");
    assert_eq!(op.kind, op_for(&plan, "Known Title.part2").kind);
    assert_eq!(plan.count(OperationKind::Rename), 0);

    // ambiguous titles stay unmatched
    let unmatched: Vec<&str> = plan.unmatched.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(unmatched, vec!["Random", "Shared"]);
}

#[test]
fn test_files_and_unmatched_folders_are_not_planned() {
    let fx = fixture(&["Misc", "RJ000070"], &["RJ000070,Seventy,2020/01/01 00:00"]);
    fs::write(fx.archive.join("RJ000071.zip"), b"not a folder").unwrap();

    let plan = plan_with(&fx, config_for(&fx));
    assert_eq!(plan.operations.len(), 1);
    assert_eq!(plan.operations[0].source.name, "RJ000070");
    assert_eq!(plan.unmatched.len(), 1);
    assert_eq!(plan.unmatched[0].name, "Misc");
}

#[test]
fn test_plan_serializes_for_preview() {
    let fx = fixture(
        &["RJ243414_OldTitle"],
        &["RJ243414,New?Title,2019/01/21 21:56"],
    );
    let plan = plan_with(&fx, config_for(&fx));

    let json = serde_json::to_value(&plan.operations).unwrap();
    assert_eq!(json[0]["kind"], "rename");
    assert_eq!(json[0]["target_name"], "RJ243414_New？Title");
    assert_eq!(json[0]["new_mtime"], "2019-01-21");
    assert!(json[0]["skip_reason"].is_null());
}

#[test]
fn test_missing_directory_is_an_error() {
    let fx = fixture(&[], &["RJ1,One,"]);
    let engine = RenameEngine::new(config_for(&fx)).unwrap();
    let records = engine.load_records().unwrap();
    let result = engine.compute_plan(&fx.archive.join("nope"), &records, &SilentReporter);
    assert!(matches!(result, Err(Error::InvalidInput(_))));
}

#[test]
fn test_empty_data_file_is_an_error() {
    let fx = fixture(&["RJ1"], &[",no identifier,"]);
    let engine = RenameEngine::new(config_for(&fx)).unwrap();
    assert!(matches!(engine.load_records(), Err(Error::InvalidInput(_))));
}

/// Collects formatted log lines in memory.
#[derive(Clone, Default)]
struct CapturedLog(Arc<Mutex<Vec<u8>>>);

impl CapturedLog {
    fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl io::Write for CapturedLog {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[test]
fn test_every_skipped_folder_is_logged() {
    let fx = fixture(
        &["RJ999999", "RJ000070_Already", "RJ000071"],
        &["RJ000070,Already,", "RJ000071,...,2020/01/01 00:00"],
    );
    let log = CapturedLog::default();
    let writer = log.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_ansi(false)
        .with_max_level(tracing::Level::INFO)
        .finish();

    let plan = tracing::subscriber::with_default(subscriber, || plan_with(&fx, config_for(&fx)));
    assert_eq!(plan.count(OperationKind::Skip), 3);

    let output = log.contents();
    assert!(output.contains("SKIPPED: RJ999999 (identifier not found in records)"), "{output}");
    assert!(output.contains("SKIPPED: RJ000070_Already (nothing to do)"), "{output}");
    assert!(
        output.contains("SKIPPED: RJ000071 (title became empty after sanitization)"),
        "{output}"
    );
}
