use crate::conflict::ConflictGroup;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Data file is missing a '{0}' column")]
    MissingColumn(String),

    #[error("Title became empty after sanitization: {0:?}")]
    EmptyTitle(String),

    #[error("{} duplicate target name(s) detected", .0.len())]
    Conflicts(Vec<ConflictGroup>),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("{0}")]
    Other(String),
}
