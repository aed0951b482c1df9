//! Training configuration and its builder

use crate::artifacts::{CheckpointSink, JsonCheckpointSink};
use crate::data::DataSource;
use crate::device::{Device, DeviceSpec};
use crate::error::{Error, Result};
use crate::logging::RunLogger;
use crate::model::Model;
use crate::optim::{Optimizer, OptimizerKind};
use crate::train::LossFn;
use chrono::Utc;
use std::fmt;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Log file name inside a run directory.
pub const LOG_FILE: &str = "training.log";

/// What the target values mean. Classification runs extract hard labels
/// from predictions for metrics; regression runs never do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TaskKind {
    #[default]
    Regression,
    Classification,
}

enum OptimizerChoice {
    Kind(OptimizerKind),
    Named(String),
}

/// Fully validated, ready-to-run training setup.
///
/// Constructed through [`TrainingConfig::builder`]; once `build` returns,
/// the optimizer is bound, the device is concrete, the run directory (if
/// any) exists, and no option changes for the rest of the run.
pub struct TrainingConfig {
    pub(crate) model: Box<dyn Model>,
    pub(crate) loss_fn: Box<dyn LossFn>,
    pub(crate) optimizer: Box<dyn Optimizer>,
    pub(crate) training_source: Box<dyn DataSource>,
    pub(crate) validation_source: Option<Box<dyn DataSource>>,
    pub(crate) epochs: usize,
    pub(crate) device: Device,
    pub(crate) task: TaskKind,
    pub(crate) classification_metrics: bool,
    pub(crate) class_names: Option<Vec<String>>,
    pub(crate) run_dir: Option<PathBuf>,
    pub(crate) zip_result: bool,
    pub(crate) progress_bar: bool,
    pub(crate) checkpoint_epochs: Vec<usize>,
    pub(crate) checkpoint_sink: Option<Box<dyn CheckpointSink>>,
    pub(crate) logger: RunLogger,
}

impl TrainingConfig {
    /// Start building a configuration around the three mandatory
    /// collaborators.
    pub fn builder(
        model: Box<dyn Model>,
        loss_fn: Box<dyn LossFn>,
        training_source: Box<dyn DataSource>,
    ) -> TrainingConfigBuilder {
        TrainingConfigBuilder {
            model,
            loss_fn,
            training_source,
            validation_source: None,
            optimizer: OptimizerChoice::Kind(OptimizerKind::default()),
            learning_rate: 0.01,
            epochs: 1,
            device: DeviceSpec::default(),
            task: TaskKind::default(),
            classification_metrics: false,
            class_names: None,
            save: None,
            zip_result: false,
            progress_bar: true,
            checkpoint_epochs: Vec::new(),
            checkpoint_sink: None,
            logger: None,
            run_stamp: None,
        }
    }

    /// The run directory, when `save_results` was configured.
    #[must_use]
    pub fn run_dir(&self) -> Option<&Path> {
        self.run_dir.as_deref()
    }

    /// The concrete device every batch is placed on.
    #[must_use]
    pub fn device(&self) -> Device {
        self.device
    }
}

impl fmt::Debug for TrainingConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TrainingConfig")
            .field("epochs", &self.epochs)
            .field("device", &self.device)
            .field("task", &self.task)
            .field("classification_metrics", &self.classification_metrics)
            .field("run_dir", &self.run_dir)
            .field("zip_result", &self.zip_result)
            .field("progress_bar", &self.progress_bar)
            .field("checkpoint_epochs", &self.checkpoint_epochs)
            .finish_non_exhaustive()
    }
}

/// Builder with consuming setters. Defaults: one epoch, SGD at learning
/// rate 0.01, CPU, regression task, progress bar on, nothing saved.
pub struct TrainingConfigBuilder {
    model: Box<dyn Model>,
    loss_fn: Box<dyn LossFn>,
    training_source: Box<dyn DataSource>,
    validation_source: Option<Box<dyn DataSource>>,
    optimizer: OptimizerChoice,
    learning_rate: f32,
    epochs: usize,
    device: DeviceSpec,
    task: TaskKind,
    classification_metrics: bool,
    class_names: Option<Vec<String>>,
    save: Option<(PathBuf, String)>,
    zip_result: bool,
    progress_bar: bool,
    checkpoint_epochs: Vec<usize>,
    checkpoint_sink: Option<Box<dyn CheckpointSink>>,
    logger: Option<RunLogger>,
    run_stamp: Option<String>,
}

impl TrainingConfigBuilder {
    #[must_use]
    pub fn validation_source(mut self, source: Box<dyn DataSource>) -> Self {
        self.validation_source = Some(source);
        self
    }

    /// Select a built-in optimizer family directly.
    #[must_use]
    pub fn optimizer(mut self, kind: OptimizerKind) -> Self {
        self.optimizer = OptimizerChoice::Kind(kind);
        self
    }

    /// Select an optimizer by name. Unknown names fall back to SGD with a
    /// logged notice at build time.
    #[must_use]
    pub fn optimizer_selector(mut self, name: impl Into<String>) -> Self {
        self.optimizer = OptimizerChoice::Named(name.into());
        self
    }

    #[must_use]
    pub fn learning_rate(mut self, learning_rate: f32) -> Self {
        self.learning_rate = learning_rate;
        self
    }

    #[must_use]
    pub fn epochs(mut self, epochs: usize) -> Self {
        self.epochs = epochs;
        self
    }

    #[must_use]
    pub fn device(mut self, device: DeviceSpec) -> Self {
        self.device = device;
        self
    }

    #[must_use]
    pub fn task(mut self, task: TaskKind) -> Self {
        self.task = task;
        self
    }

    /// Track per-epoch classification scores and produce the end-of-run
    /// classification report. Implies [`TaskKind::Classification`] and
    /// requires a validation source.
    #[must_use]
    pub fn classification_metrics(mut self) -> Self {
        self.classification_metrics = true;
        self.task = TaskKind::Classification;
        self
    }

    /// Display names for class indices in reports.
    #[must_use]
    pub fn class_names(mut self, names: Vec<String>) -> Self {
        self.class_names = Some(names);
        self
    }

    /// Create a timestamped run directory `{path}/{stamp}_{model_name}`
    /// holding the log file, checkpoints and CSV reports.
    #[must_use]
    pub fn save_results(mut self, path: impl Into<PathBuf>, model_name: impl Into<String>) -> Self {
        self.save = Some((path.into(), model_name.into()));
        self
    }

    /// Package the run directory into `{run_dir}.zip` after the run.
    #[must_use]
    pub fn zip_result(mut self) -> Self {
        self.zip_result = true;
        self
    }

    #[must_use]
    pub fn progress_bar(mut self, enabled: bool) -> Self {
        self.progress_bar = enabled;
        self
    }

    /// Zero-based epoch indices after which to fire a checkpoint event.
    #[must_use]
    pub fn checkpoint_epochs(mut self, epochs: impl IntoIterator<Item = usize>) -> Self {
        self.checkpoint_epochs = epochs.into_iter().collect();
        self
    }

    /// Replace the default JSON file sink with a custom destination.
    #[must_use]
    pub fn checkpoint_sink(mut self, sink: Box<dyn CheckpointSink>) -> Self {
        self.checkpoint_sink = Some(sink);
        self
    }

    /// Route log lines to an explicit sink instead of the file/stderr
    /// default.
    #[must_use]
    pub fn logger(mut self, logger: RunLogger) -> Self {
        self.logger = Some(logger);
        self
    }

    /// Fix the run-directory timestamp instead of reading the clock.
    /// Mostly useful to make run directories reproducible in tests.
    #[must_use]
    pub fn run_stamp(mut self, stamp: impl Into<String>) -> Self {
        self.run_stamp = Some(stamp.into());
        self
    }

    /// Validate the configuration and perform build-time side effects:
    /// run-directory creation, logger construction, device resolution and
    /// optimizer binding.
    pub fn build(self) -> Result<TrainingConfig> {
        if self.epochs == 0 {
            return Err(Error::InvalidEpochs(self.epochs));
        }
        if self.classification_metrics && self.validation_source.is_none() {
            return Err(Error::MissingValidationSource);
        }
        if self.classification_metrics && self.task == TaskKind::Regression {
            return Err(Error::MetricsRequireClassification);
        }
        if self.zip_result && self.save.is_none() {
            return Err(Error::ZipWithoutSave);
        }
        if !self.checkpoint_epochs.is_empty()
            && self.save.is_none()
            && self.checkpoint_sink.is_none()
        {
            return Err(Error::CheckpointWithoutSink);
        }

        let run_dir = match &self.save {
            Some((base, model_name)) => {
                let stamp = self
                    .run_stamp
                    .unwrap_or_else(|| Utc::now().format("%Y%m%d_%H%M%S").to_string());
                let dir = base.join(format!("{stamp}_{model_name}"));
                fs::create_dir_all(base)?;
                match fs::create_dir(&dir) {
                    Ok(()) => {}
                    Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                        return Err(Error::RunDirExists(dir));
                    }
                    Err(e) => return Err(e.into()),
                }
                Some(dir)
            }
            None => None,
        };

        let logger = match self.logger {
            Some(logger) => logger,
            None => match &run_dir {
                Some(dir) => RunLogger::to_file(dir.join(LOG_FILE))?,
                None => RunLogger::to_stderr(),
            },
        };

        let kind = match self.optimizer {
            OptimizerChoice::Kind(kind) => kind,
            OptimizerChoice::Named(name) => OptimizerKind::from_selector(&name, &logger),
        };
        let optimizer = kind.bind(self.learning_rate);

        let device = self.device.resolve(&logger);
        logger.info(&format!("using device {device}"));

        let checkpoint_sink = match self.checkpoint_sink {
            Some(sink) => Some(sink),
            None => run_dir
                .as_ref()
                .map(|dir| Box::new(JsonCheckpointSink::new(dir)) as Box<dyn CheckpointSink>),
        };

        Ok(TrainingConfig {
            model: self.model,
            loss_fn: self.loss_fn,
            optimizer,
            training_source: self.training_source,
            validation_source: self.validation_source,
            epochs: self.epochs,
            device,
            task: self.task,
            classification_metrics: self.classification_metrics,
            class_names: self.class_names,
            run_dir,
            zip_result: self.zip_result,
            progress_bar: self.progress_bar,
            checkpoint_epochs: self.checkpoint_epochs,
            checkpoint_sink,
            logger,
        })
    }
}
