//! Error types for the recommendation engine.
//!
//! Two layers live here:
//! - `DataLoadError` describes what went wrong while reading a backing file
//! - `RecommendError` is the taxonomy every public operation reports
//!
//! The `#[derive(Error)]` macro from thiserror implements `Display` and
//! `std::error::Error` from the `#[error(...)]` attributes.

use thiserror::Error;

/// Errors that can occur while reading and parsing the raw data files
#[derive(Error, Debug)]
pub enum DataLoadError {
    /// File could not be found or opened
    #[error("Failed to open file: {path}")]
    FileNotFound { path: String },

    /// I/O error occurred while reading file
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// A record in a data file couldn't be parsed
    #[error("Parse error at line {line} in {file}: {reason}")]
    ParseError {
        file: String,
        line: usize,
        reason: String,
    },

    /// A data field had an invalid value
    #[error("Invalid value for {field}: {value}")]
    InvalidValue { field: String, value: String },

    /// The header row lacks a column we need
    #[error("Missing column {column} in {file}")]
    MissingColumn { file: String, column: String },
}

/// Which id space an unknown id was looked up in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdKind {
    User,
    Recipe,
}

impl std::fmt::Display for IdKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IdKind::User => f.write_str("user"),
            IdKind::Recipe => f.write_str("recipe"),
        }
    }
}

/// Errors reported by the recommendation core
///
/// All variants propagate unchanged to the caller. Nothing is retried
/// internally: given the same data every computation is deterministic.
#[derive(Error, Debug)]
pub enum RecommendError {
    /// The ratings repository could not be read
    #[error("Rating data unavailable: {0}")]
    DataUnavailable(#[from] DataLoadError),

    /// Filtering left no users or no recipes to build a matrix from
    #[error("Dataset is empty after filtering ({users} users, {recipes} recipes)")]
    EmptyDataset { users: usize, recipes: usize },

    /// Not enough candidate vectors to answer a k-nearest-neighbor query
    #[error("Insufficient data: requested {requested} candidates but only {available} exist")]
    InsufficientData { requested: usize, available: usize },

    /// The id is not present in the filtered rating set
    #[error("Unknown {kind} id {id}")]
    UnknownId { kind: IdKind, id: u32 },

    /// A mode, metric, or threshold was rejected
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

/// Convenience type alias for results of the recommendation core
pub type Result<T> = std::result::Result<T, RecommendError>;

/// Results produced while reading raw files
pub type LoadResult<T> = std::result::Result<T, DataLoadError>;
