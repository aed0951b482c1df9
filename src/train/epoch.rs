//! One pass of a model over one data source

use crate::autograd::{backward, Tensor};
use crate::error::{Error, Result};
use crate::eval::{Average, ConfusionMatrix, MultiClassMetrics};
use crate::progress::ProgressBar;
use crate::train::TrainingConfig;
use std::time::Instant;

/// Which pass of an epoch is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Training,
    Validation,
}

impl Phase {
    pub(crate) fn prefix(self) -> &'static str {
        match self {
            Phase::Training => "training",
            Phase::Validation => "validation",
        }
    }
}

/// Classification scores for one pass, macro-averaged over classes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EpochScores {
    pub accuracy: f64,
    pub macro_recall: f64,
    pub macro_precision: f64,
    pub macro_f1score: f64,
}

/// Outcome of one pass over one data source.
#[derive(Debug, Clone)]
pub struct EpochReport {
    pub phase: Phase,
    pub epoch: usize,
    pub elapsed_secs: f64,
    pub mean_loss: f64,
    pub scores: Option<EpochScores>,
    /// `(y_true, y_pred)` label pairs, collected when classification
    /// metrics are enabled.
    pub labels: Option<(Vec<usize>, Vec<usize>)>,
    /// Detached first row of the last batch seen, kept around for latency
    /// measurement and checkpoint events.
    pub sample_input: Option<Tensor>,
}

/// Drive the model over every batch of the phase's data source.
///
/// Training passes run backward, an optimizer step and a gradient reset
/// after each batch; validation passes only run forward. The caller owns
/// the surrounding mode switch and any no-grad scope.
pub fn run_epoch(config: &mut TrainingConfig, epoch: usize, phase: Phase) -> Result<EpochReport> {
    let TrainingConfig {
        model,
        loss_fn,
        optimizer,
        training_source,
        validation_source,
        device,
        classification_metrics,
        progress_bar,
        logger,
        ..
    } = config;

    let source = match phase {
        Phase::Training => training_source,
        Phase::Validation => validation_source.as_mut().ok_or(Error::NoValidationSource)?,
    };

    let mut params = model.parameters();
    let collect = *classification_metrics;
    let device = *device;

    let mut bar = progress_bar.then(|| {
        ProgressBar::new(format!("{} batches", phase.prefix()), source.size_hint().unwrap_or(0))
    });

    let started = Instant::now();

    let mut losses = Vec::new();
    let mut y_true: Vec<usize> = Vec::new();
    let mut raw_predictions: Vec<f32> = Vec::new();
    let mut scored_rows = 0;
    let mut sample_input = None;

    for batch in source.batches() {
        let batch = batch.to_device(device);
        let rows = batch.targets.len();
        if rows == 0 || batch.inputs.len() % rows != 0 {
            return Err(Error::RaggedBatch { values: batch.inputs.len(), rows });
        }

        let width = batch.inputs.len() / rows;
        let row: Vec<f32> = batch.inputs.to_vec().into_iter().take(width).collect();
        sample_input = Some(Tensor::from_vec(row, false));

        let predictions = model.forward(&batch.inputs);
        if predictions.len() % rows != 0 {
            return Err(Error::RaggedBatch { values: predictions.len(), rows });
        }

        let mut loss = loss_fn.forward(&predictions, &batch.targets);
        losses.push(f64::from(loss.data()[0]));

        if phase == Phase::Training {
            backward(&mut loss, None);
            optimizer.step(&mut params);
            optimizer.zero_grad(&mut params);
        }

        if collect {
            y_true.extend(batch.targets.to_vec().iter().map(|&t| t as usize));
            raw_predictions.extend_from_slice(&predictions.to_vec());
            scored_rows += rows;
        }

        if let Some(bar) = &mut bar {
            bar.advance();
        }
    }

    if let Some(bar) = &bar {
        bar.clear();
    }

    let elapsed_secs = started.elapsed().as_secs_f64();
    let mean_loss = safe_mean(&losses);

    let mut scores = None;
    let mut labels = None;
    if collect && scored_rows > 0 {
        let y_pred = to_class_labels(&raw_predictions, scored_rows)?;
        let cm = ConfusionMatrix::from_predictions(&y_true, &y_pred);
        let metrics = MultiClassMetrics::from_confusion(&cm);
        scores = Some(EpochScores {
            accuracy: metrics.accuracy(),
            macro_recall: metrics.recall_avg(Average::Macro),
            macro_precision: metrics.precision_avg(Average::Macro),
            macro_f1score: metrics.f1_avg(Average::Macro),
        });
        labels = Some((y_true, y_pred));
    }

    if !*progress_bar && phase == Phase::Training {
        logger.info(&format!(
            "finished epoch {}, took {:.3} minutes",
            epoch + 1,
            elapsed_secs / 60.0
        ));
    }

    Ok(EpochReport {
        phase,
        epoch,
        elapsed_secs,
        mean_loss,
        scores,
        labels,
        sample_input,
    })
}

fn safe_mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

/// Reduce raw model outputs to one hard label per row.
///
/// A single output column is thresholded at 0.5; several columns take the
/// argmax, with the first index winning ties.
fn to_class_labels(raw: &[f32], rows: usize) -> Result<Vec<usize>> {
    if rows == 0 || raw.len() % rows != 0 {
        return Err(Error::RaggedBatch { values: raw.len(), rows });
    }
    let columns = raw.len() / rows;
    if columns == 0 {
        return Err(Error::RaggedBatch { values: raw.len(), rows });
    }

    if columns == 1 {
        return Ok(raw.iter().map(|&v| usize::from(v > 0.5)).collect());
    }

    Ok(raw
        .chunks_exact(columns)
        .map(|row| {
            let mut best = 0;
            for (class, &value) in row.iter().enumerate() {
                if value > row[best] {
                    best = class;
                }
            }
            best
        })
        .collect())
}
