//! Run artifacts: checkpoints, CSV reports, archives and measurements

mod archive;
mod checkpoint;
mod measure;
mod reports;

pub use archive::archive_run_dir;
pub use checkpoint::{CheckpointEvent, CheckpointSink, EpochTag, JsonCheckpointSink};
pub use measure::{measure_latency, model_size_mb};
pub use reports::{save_confusion_matrix, save_loss_curves, save_metric_series};
