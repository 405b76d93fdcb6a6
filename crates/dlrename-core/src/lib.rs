pub mod config;
pub mod conflict;
pub mod engine;
pub mod error;
pub mod executor;
pub mod matcher;
pub mod model;
pub mod plan;
pub mod platform;
pub mod progress;
pub mod records;
pub mod sanitize;
pub mod scanner;

pub use config::{AppConfig, DuplicatePolicy, NameStyle};
pub use conflict::{AcceptedPlan, ConflictGroup};
pub use engine::RenameEngine;
pub use error::Error;
pub use executor::{ExecutionOutcome, ExecutionReport, ExecutionSummary, TimestampStatus};
pub use model::{FolderEntry, OperationKind, PlannedOperation, PurchaseRecord, SkipReason};
pub use plan::Plan;
pub use progress::{ProgressReporter, SilentReporter};
pub use records::RecordIndex;
