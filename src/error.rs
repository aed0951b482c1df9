//! Error types for the training harness

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised during configuration, training, and artifact persistence.
#[derive(Debug, Error)]
pub enum Error {
    /// Epoch count must be at least one.
    #[error("invalid epoch count: {0} (must be > 0)")]
    InvalidEpochs(usize),

    /// Classification metrics need validation labels to report against.
    #[error("classification metrics require a validation source")]
    MissingValidationSource,

    /// Classification metrics only make sense for classification tasks.
    #[error("classification metrics require TaskKind::Classification")]
    MetricsRequireClassification,

    /// A validation pass was requested on a config without a validation source.
    #[error("validation epoch requested but no validation source is configured")]
    NoValidationSource,

    /// Archiving needs a run directory to package.
    #[error("zip_result requires save_results")]
    ZipWithoutSave,

    /// Checkpoint epochs need somewhere to persist to.
    #[error("checkpoint_epochs require save_results or a custom checkpoint sink")]
    CheckpointWithoutSink,

    /// Refusing to write into a run directory that already exists.
    #[error("results directory already exists: {}", .0.display())]
    RunDirExists(PathBuf),

    /// Appending to a metric series that was never registered.
    #[error("metric series not registered: {0}")]
    UntrackedMetric(String),

    /// A flattened batch whose values do not divide evenly into rows.
    #[error("{values} values do not divide into {rows} rows")]
    RaggedBatch { values: usize, rows: usize },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("archive error: {0}")]
    Zip(#[from] zip::result::ZipError),
}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, Error>;
