//! Training loop: configuration, epoch passes and run orchestration
//!
//! The entry point is [`TrainingConfig::builder`] followed by [`train`],
//! which drives the epoch schedule, records metrics into a
//! [`ResultSeries`], fires checkpoints, and writes the end-of-run report
//! through the configured logger and run directory.
//!
//! # Example
//!
//! ```no_run
//! use dionysus::data::{Batch, InMemorySource};
//! use dionysus::autograd::Tensor;
//! use dionysus::train::{train, MSELoss, TrainingConfig};
//!
//! # struct Linear;
//! # impl dionysus::model::Model for Linear {
//! #     fn forward(&mut self, inputs: &Tensor) -> Tensor { inputs.clone() }
//! #     fn parameters(&self) -> Vec<Tensor> { Vec::new() }
//! #     fn set_mode(&mut self, _mode: dionysus::model::Mode) {}
//! #     fn mode(&self) -> dionysus::model::Mode { dionysus::model::Mode::Train }
//! # }
//! let batches = vec![Batch::new(
//!     Tensor::from_vec(vec![1.0, 2.0], false),
//!     Tensor::from_vec(vec![1.5, 2.5], false),
//! )];
//!
//! let config = TrainingConfig::builder(
//!     Box::new(Linear),
//!     Box::new(MSELoss),
//!     Box::new(InMemorySource::new(batches)),
//! )
//! .epochs(3)
//! .learning_rate(0.01)
//! .build()?;
//!
//! let report = train(config)?;
//! println!("final loss: {:?}", report.results.get("training_loss"));
//! # Ok::<(), dionysus::error::Error>(())
//! ```

mod config;
mod epoch;
mod loss;
mod series;

pub use config::{TaskKind, TrainingConfig, TrainingConfigBuilder, LOG_FILE};
pub use epoch::{run_epoch, EpochReport, EpochScores, Phase};
pub use loss::{CrossEntropyLoss, LossFn, MSELoss};
pub use series::ResultSeries;

use crate::artifacts::{
    archive_run_dir, measure_latency, model_size_mb, save_confusion_matrix, save_loss_curves,
    save_metric_series, CheckpointEvent, EpochTag,
};
use crate::autograd::{no_grad, Tensor};
use crate::error::{Error, Result};
use crate::eval::{classification_report, ConfusionMatrix, MajorityClassBaseline};
use crate::model::Mode;
use crate::progress::ProgressBar;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

const LATENCY_WARMUP_PASSES: usize = 10;
const LATENCY_TIMED_PASSES: usize = 100;

/// Label pairs from the most recent validation pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationSnapshot {
    pub y_true: Vec<usize>,
    pub y_pred: Vec<usize>,
}

/// What a completed run hands back to the caller.
#[derive(Debug, Clone)]
pub struct TrainReport {
    pub results: ResultSeries,
    pub snapshot: Option<ValidationSnapshot>,
    pub run_dir: Option<PathBuf>,
    pub total_train_secs: f64,
}

/// Run the configured training schedule to completion.
///
/// Per epoch: a training pass, then a validation pass under a no-grad
/// guard when a validation source is configured, then any scheduled
/// checkpoint. After the last epoch the run is reported: a final
/// checkpoint into the run directory, confusion matrix and
/// classification reports with their CSV files when classification
/// metrics are on, and optionally a zip archive.
pub fn train(mut config: TrainingConfig) -> Result<TrainReport> {
    config.logger.info("starting training");

    let mut results = ResultSeries::with_keys(tracked_keys(&config));

    config.model.place(config.device);

    let mut snapshot: Option<ValidationSnapshot> = None;
    let mut sample_input: Option<Tensor> = None;
    let mut total_train_secs = 0.0;

    let mut epoch_bar =
        config.progress_bar.then(|| ProgressBar::new("epochs", config.epochs));

    for epoch in 0..config.epochs {
        config.model.set_mode(Mode::Train);
        let report = run_epoch(&mut config, epoch, Phase::Training)?;
        total_train_secs += report.elapsed_secs;

        results.append("epoch", (epoch + 1) as f64)?;
        results.append("epoch_time", report.elapsed_secs)?;
        results.append("training_loss", report.mean_loss)?;
        if let Some(scores) = report.scores {
            append_scores(&mut results, "training", scores)?;
        }
        if let Some(sample) = report.sample_input {
            sample_input = Some(sample);
        }

        if config.validation_source.is_some() {
            config.model.set_mode(Mode::Eval);
            let report = {
                let _guard = no_grad();
                run_epoch(&mut config, epoch, Phase::Validation)?
            };
            results.append("validation_loss", report.mean_loss)?;
            if let Some(scores) = report.scores {
                append_scores(&mut results, "validation", scores)?;
            }
            if let Some((y_true, y_pred)) = report.labels {
                snapshot = Some(ValidationSnapshot { y_true, y_pred });
            }
        }

        if config.checkpoint_epochs.contains(&epoch) {
            persist_checkpoint(&mut config, EpochTag::Epoch(epoch), &results, &snapshot, &sample_input)?;
        }

        if let Some(bar) = &mut epoch_bar {
            bar.advance();
        }
    }

    if let Some(bar) = &epoch_bar {
        bar.finish();
    }

    if config.run_dir.is_some() {
        persist_checkpoint(&mut config, EpochTag::Last, &results, &snapshot, &sample_input)?;
    }

    if config.classification_metrics {
        let snap = snapshot.as_ref().ok_or(Error::MissingValidationSource)?;

        let cm = ConfusionMatrix::from_predictions(&snap.y_true, &snap.y_pred);
        config.logger.info(&format!("confusion matrix:\n{cm}"));

        let baseline = MajorityClassBaseline::fit(&snap.y_true);
        let baseline_pred = baseline.predict(snap.y_true.len());
        let names = config.class_names.as_deref();
        config.logger.info(&format!(
            "classification report baseline:\n{}",
            classification_report(&snap.y_true, &baseline_pred, names)
        ));
        config.logger.info(&format!(
            "classification report:\n{}",
            classification_report(&snap.y_true, &snap.y_pred, names)
        ));

        if let Some(run_dir) = &config.run_dir {
            save_loss_curves(run_dir, &results)?;
            save_metric_series(run_dir, &results, "training")?;
            if config.validation_source.is_some() {
                save_metric_series(run_dir, &results, "validation")?;
            }
            save_confusion_matrix(run_dir, &cm)?;
        }
    }

    config
        .logger
        .info(&format!("finished training, took {:.3} hours", total_train_secs / 3600.0));
    config
        .logger
        .info(&format!("model size (MB) - {:.4}", model_size_mb(config.model.as_ref())));

    if let Some(sample) = &sample_input {
        let (avg, std) = measure_latency(
            config.model.as_mut(),
            sample,
            LATENCY_WARMUP_PASSES,
            LATENCY_TIMED_PASSES,
        );
        config.logger.info(&format!("average latency (ms) - {avg:.2} +/- {std:.2}"));
    }

    if config.zip_result {
        if let Some(run_dir) = &config.run_dir {
            let zip_path = archive_run_dir(run_dir)?;
            config.logger.info(&format!("archived results to {}", zip_path.display()));
        }
    }

    Ok(TrainReport {
        results,
        snapshot,
        run_dir: config.run_dir.clone(),
        total_train_secs,
    })
}

fn tracked_keys(config: &TrainingConfig) -> Vec<String> {
    let mut keys = vec!["epoch".to_string(), "epoch_time".to_string(), "training_loss".to_string()];
    if config.validation_source.is_some() {
        keys.push("validation_loss".to_string());
    }
    if config.classification_metrics {
        let mut prefixes = vec!["training"];
        if config.validation_source.is_some() {
            prefixes.push("validation");
        }
        for prefix in prefixes {
            for metric in ["accuracy", "macro_recall", "macro_precision", "macro_f1score"] {
                keys.push(format!("{prefix}_{metric}"));
            }
        }
    }
    keys
}

fn append_scores(results: &mut ResultSeries, prefix: &str, scores: EpochScores) -> Result<()> {
    results.append(&format!("{prefix}_accuracy"), scores.accuracy)?;
    results.append(&format!("{prefix}_macro_recall"), scores.macro_recall)?;
    results.append(&format!("{prefix}_macro_precision"), scores.macro_precision)?;
    results.append(&format!("{prefix}_macro_f1score"), scores.macro_f1score)?;
    Ok(())
}

fn persist_checkpoint(
    config: &mut TrainingConfig,
    tag: EpochTag,
    results: &ResultSeries,
    snapshot: &Option<ValidationSnapshot>,
    sample_input: &Option<Tensor>,
) -> Result<()> {
    let Some(sink) = config.checkpoint_sink.as_mut() else {
        return Ok(());
    };

    let model_state: Vec<Vec<f32>> =
        config.model.parameters().iter().map(Tensor::to_vec).collect();
    let event = CheckpointEvent {
        tag,
        model_state,
        results: results.clone(),
        snapshot: snapshot.clone(),
        sample_input: sample_input.as_ref().map(Tensor::to_vec),
    };
    sink.persist(&event)
}
