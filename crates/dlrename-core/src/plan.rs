use crate::config::{AppConfig, NameStyle};
use crate::error::Error;
use crate::matcher::IdentifierMatcher;
use crate::model::{FolderEntry, OperationKind, PlannedOperation, PurchaseRecord, SkipReason};
use crate::records::RecordIndex;
use crate::sanitize::{compose_name, sanitize_title};
use serde::Serialize;
use std::collections::HashMap;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy)]
pub struct PlanOptions {
    pub max_length: usize,
    pub remove_suffix: bool,
    pub set_mtime: bool,
    pub naming: NameStyle,
    pub match_titles: bool,
}

impl From<&AppConfig> for PlanOptions {
    fn from(config: &AppConfig) -> Self {
        Self {
            max_length: config.max_length,
            remove_suffix: config.remove_suffix,
            set_mtime: config.set_mtime,
            naming: config.naming,
            match_titles: config.match_titles,
        }
    }
}

/// Every operation computed for one run, in scan order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Plan {
    pub operations: Vec<PlannedOperation>,
    /// Folders without an identifier that no record claimed.
    pub unmatched: Vec<FolderEntry>,
    pub timestamps_enabled: bool,
}

impl Plan {
    pub fn of_kind(&self, kind: OperationKind) -> impl Iterator<Item = &PlannedOperation> {
        self.operations.iter().filter(move |op| op.kind == kind)
    }

    pub fn count(&self, kind: OperationKind) -> usize {
        self.of_kind(kind).count()
    }

    pub fn actionable(&self) -> impl Iterator<Item = &PlannedOperation> {
        self.operations.iter().filter(|op| op.is_actionable())
    }

    pub fn has_work(&self) -> bool {
        self.actionable().next().is_some()
    }
}

enum Slot<'a> {
    Resolved(PlannedOperation),
    Candidate {
        entry: &'a FolderEntry,
        record: &'a PurchaseRecord,
        keep_identifier: bool,
        suffix: Option<String>,
    },
    /// Matched by title; never renamed.
    Pinned {
        entry: &'a FolderEntry,
        record: &'a PurchaseRecord,
    },
}

/// Compute the plan in two phases: resolve every folder to a candidate, then
/// adjust suffixes per identifier group before any name is fixed.
pub fn build_plan(
    entries: &[FolderEntry],
    index: &RecordIndex,
    matcher: &IdentifierMatcher,
    options: &PlanOptions,
) -> Plan {
    let titles = options
        .match_titles
        .then(|| title_lookup(index, options.max_length));

    let mut slots = Vec::with_capacity(entries.len());
    let mut unmatched = Vec::new();

    for entry in entries {
        match entry.identifier.as_deref() {
            Some(identifier) => match index.get(identifier) {
                Some(record) => slots.push(Slot::Candidate {
                    entry,
                    record,
                    keep_identifier: options.naming.keeps_identifier(&entry.base_part),
                    suffix: entry.suffix.clone(),
                }),
                None => {
                    debug!("{} not in records ({})", identifier, entry.name);
                    slots.push(Slot::Resolved(PlannedOperation::skip(
                        entry.clone(),
                        identifier.to_string(),
                        SkipReason::NotInRecords,
                    )));
                }
            },
            None => {
                let record = titles
                    .as_ref()
                    .and_then(|titles| titles.get(entry.base_part.as_str()).copied().flatten());
                match record {
                    Some(record) => slots.push(Slot::Pinned { entry, record }),
                    None => unmatched.push(entry.clone()),
                }
            }
        }
    }

    if options.remove_suffix {
        drop_lone_suffixes(entries, &mut slots);
    }

    let operations = slots
        .into_iter()
        .map(|slot| resolve(slot, matcher, options))
        .collect();

    Plan {
        operations,
        unmatched,
        timestamps_enabled: options.set_mtime,
    }
}

// A suffix is only dropped when its identifier has a single folder on disk;
// groups of two or more keep every suffix so they cannot collide.
fn drop_lone_suffixes(entries: &[FolderEntry], slots: &mut [Slot<'_>]) {
    let mut group_sizes: HashMap<&str, usize> = HashMap::new();
    for identifier in entries.iter().filter_map(|e| e.identifier.as_deref()) {
        *group_sizes.entry(identifier).or_default() += 1;
    }

    for slot in slots.iter_mut() {
        if let Slot::Candidate { entry, suffix, .. } = slot {
            let lone = entry
                .identifier
                .as_deref()
                .and_then(|id| group_sizes.get(id))
                .is_some_and(|size| *size == 1);
            if lone && suffix.is_some() {
                debug!("Dropping suffix from {}", entry.name);
                *suffix = None;
            }
        }
    }
}

fn resolve(slot: Slot<'_>, matcher: &IdentifierMatcher, options: &PlanOptions) -> PlannedOperation {
    match slot {
        Slot::Resolved(op) => op,
        Slot::Pinned { entry, record } => stay_in_place(entry, record, options),
        Slot::Candidate {
            entry,
            record,
            keep_identifier,
            suffix,
        } => {
            let target_name = match target_name_for(
                record,
                keep_identifier,
                suffix.as_deref(),
                matcher,
                options.max_length,
            ) {
                Ok(name) => name,
                Err(err) => {
                    warn!("Failed to sanitize title for {}: {}", record.identifier, err);
                    return PlannedOperation::skip(
                        entry.clone(),
                        record.identifier.clone(),
                        SkipReason::EmptyTitle,
                    );
                }
            };

            if target_name == entry.name {
                return stay_in_place(entry, record, options);
            }

            PlannedOperation {
                source: entry.clone(),
                identifier: record.identifier.clone(),
                target_path: entry.path.with_file_name(&target_name),
                target_name: Some(target_name),
                new_mtime: record.purchase_date.filter(|_| options.set_mtime),
                kind: OperationKind::Rename,
                skip_reason: None,
            }
        }
    }
}

// A bare title that itself reads as an identifier would be picked up as that
// work on the next scan, so the folder keeps its own identifier in front.
fn target_name_for(
    record: &PurchaseRecord,
    keep_identifier: bool,
    suffix: Option<&str>,
    matcher: &IdentifierMatcher,
    max_length: usize,
) -> Result<String, Error> {
    if !keep_identifier {
        let name = compose_name(None, &record.title, suffix, max_length)?;
        if matcher.extract_identifier(&name).is_none() {
            return Ok(name);
        }
        info!(
            "Title of {} starts with an identifier, keeping the {}_ prefix",
            record.identifier, record.identifier
        );
    }
    compose_name(Some(&record.identifier), &record.title, suffix, max_length)
}

fn stay_in_place(entry: &FolderEntry, record: &PurchaseRecord, options: &PlanOptions) -> PlannedOperation {
    match record.purchase_date.filter(|_| options.set_mtime) {
        Some(date) => PlannedOperation {
            source: entry.clone(),
            identifier: record.identifier.clone(),
            target_name: None,
            target_path: entry.path.clone(),
            new_mtime: Some(date),
            kind: OperationKind::MtimeOnly,
            skip_reason: None,
        },
        None => PlannedOperation::skip(
            entry.clone(),
            record.identifier.clone(),
            SkipReason::NothingToDo,
        ),
    }
}

// Sanitized title → record. Titles shared by several records map to None.
fn title_lookup(index: &RecordIndex, max_length: usize) -> HashMap<String, Option<&PurchaseRecord>> {
    let mut titles: HashMap<String, Option<&PurchaseRecord>> = HashMap::new();
    for record in index.iter() {
        let Ok(title) = sanitize_title(&record.title, max_length) else {
            continue;
        };
        titles
            .entry(title)
            .and_modify(|slot| *slot = None)
            .or_insert(Some(record));
    }
    titles
}
