//! Checkpoint events and sinks

use crate::error::Result;
use crate::train::{ResultSeries, ValidationSnapshot};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Which point of the run a checkpoint captures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EpochTag {
    /// After the epoch with this zero-based index.
    Epoch(usize),
    /// After the final epoch.
    Last,
}

impl EpochTag {
    /// File name used by file-based sinks.
    #[must_use]
    pub fn file_name(&self) -> String {
        match self {
            Self::Epoch(index) => format!("checkpoint_epoch_{index}.json"),
            Self::Last => "checkpoint_last.json".to_string(),
        }
    }
}

/// Everything captured at a checkpoint: parameter values, the metric
/// series so far, and the latest validation labels when present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckpointEvent {
    pub tag: EpochTag,
    pub model_state: Vec<Vec<f32>>,
    pub results: ResultSeries,
    pub snapshot: Option<ValidationSnapshot>,
    pub sample_input: Option<Vec<f32>>,
}

/// Destination for checkpoint events.
pub trait CheckpointSink {
    fn persist(&mut self, event: &CheckpointEvent) -> Result<()>;
}

/// Writes each checkpoint as pretty-printed JSON under a directory.
pub struct JsonCheckpointSink {
    dir: PathBuf,
}

impl JsonCheckpointSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl CheckpointSink for JsonCheckpointSink {
    fn persist(&mut self, event: &CheckpointEvent) -> Result<()> {
        let json = serde_json::to_string_pretty(event)?;
        fs::write(self.dir.join(event.tag.file_name()), json)?;
        Ok(())
    }
}
