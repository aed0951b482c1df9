//! Supervised training loops over pluggable models, losses and optimizers.
//!
//! This crate drives the full life of a training run:
//! - Configuration through a validating builder ([`train::TrainingConfig`])
//! - Epoch scheduling with training and validation passes
//! - Loss functions with reverse-mode gradients over flat tensors
//! - SGD and AdamW parameter updates
//! - Confusion matrices, per-class metrics and classification reports
//! - Run directories with logs, checkpoints, CSV curves and zip archives
//!
//! The [`train`] module documents the end-to-end flow; [`train::train`] is
//! the entry point once a [`train::TrainingConfig`] is built.

pub mod artifacts;
pub mod autograd;
pub mod data;
pub mod device;
pub mod error;
pub mod eval;
pub mod logging;
pub mod model;
pub mod optim;
pub mod progress;
pub mod train;

pub use autograd::Tensor;
pub use data::{Batch, DataSource, InMemorySource};
pub use error::{Error, Result};
pub use model::{Mode, Model};
pub use train::{train, TrainReport, TrainingConfig};
