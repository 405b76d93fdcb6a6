use chrono::NaiveDate;
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

/// A directory found directly under the scanned root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FolderEntry {
    pub path: PathBuf,
    pub name: String,
    /// Canonical (uppercase) identifier, if the name starts with one.
    pub identifier: Option<String>,
    /// Name with identifier, separators and suffix stripped.
    pub base_part: String,
    /// Multi-part marker without the leading dot, e.g. `part3`.
    pub suffix: Option<String>,
}

/// One purchase row from the data file, keyed by canonical identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PurchaseRecord {
    pub identifier: String,
    pub title: String,
    pub purchase_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    Rename,
    MtimeOnly,
    Skip,
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OperationKind::Rename => write!(f, "rename"),
            OperationKind::MtimeOnly => write!(f, "mtime only"),
            OperationKind::Skip => write!(f, "skip"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    NotInRecords,
    EmptyTitle,
    NothingToDo,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::NotInRecords => write!(f, "identifier not found in records"),
            SkipReason::EmptyTitle => write!(f, "title became empty after sanitization"),
            SkipReason::NothingToDo => write!(f, "nothing to do"),
        }
    }
}

/// The resolved action for one matched folder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlannedOperation {
    pub source: FolderEntry,
    pub identifier: String,
    /// `None` when the folder keeps its name.
    pub target_name: Option<String>,
    /// Equal to `source.path` unless this is a rename.
    pub target_path: PathBuf,
    pub new_mtime: Option<NaiveDate>,
    pub kind: OperationKind,
    pub skip_reason: Option<SkipReason>,
}

impl PlannedOperation {
    pub(crate) fn skip(source: FolderEntry, identifier: String, reason: SkipReason) -> Self {
        let target_path = source.path.clone();
        Self {
            source,
            identifier,
            target_name: None,
            target_path,
            new_mtime: None,
            kind: OperationKind::Skip,
            skip_reason: Some(reason),
        }
    }

    pub fn is_actionable(&self) -> bool {
        self.kind != OperationKind::Skip
    }

    /// Name the folder will have after execution.
    pub fn final_name(&self) -> &str {
        self.target_name.as_deref().unwrap_or(&self.source.name)
    }
}
