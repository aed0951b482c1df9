//! Classification evaluation: confusion matrix, per-class metrics, reports
//!
//! The training loop uses these to score each epoch and to render the
//! end-of-run classification reports. Everything operates on plain label
//! vectors so the module is also usable on its own.
//!
//! ## Example
//!
//! ```
//! use dionysus::eval::{classification_report, ConfusionMatrix};
//!
//! let y_true = vec![0, 1, 1, 0];
//! let y_pred = vec![0, 1, 0, 0];
//!
//! let cm = ConfusionMatrix::from_predictions(&y_true, &y_pred);
//! assert!(cm.accuracy() > 0.5);
//!
//! let report = classification_report(&y_true, &y_pred, None);
//! assert!(report.contains("Accuracy"));
//! ```

mod average;
mod baseline;
mod confusion;
mod metrics;
mod report;

pub use average::Average;
pub use baseline::MajorityClassBaseline;
pub use confusion::ConfusionMatrix;
pub use metrics::MultiClassMetrics;
pub use report::classification_report;
