//! Text classification report in the familiar sklearn layout

use super::{Average, ConfusionMatrix, MultiClassMetrics};

/// Render a per-class report with macro and weighted averages.
///
/// `class_names` supplies display names by class index; classes beyond the
/// provided names (or all classes, when `None`) fall back to `Class {i}`.
pub fn classification_report(
    y_true: &[usize],
    y_pred: &[usize],
    class_names: Option<&[String]>,
) -> String {
    let cm = ConfusionMatrix::from_predictions(y_true, y_pred);
    let metrics = MultiClassMetrics::from_confusion(&cm);

    let mut report = String::new();
    report.push_str(&format!(
        "{:>12} {:>10} {:>10} {:>10} {:>10}\n",
        "", "precision", "recall", "f1-score", "support"
    ));
    report.push_str(&"-".repeat(54));
    report.push('\n');

    for class in 0..metrics.n_classes() {
        let name = class_names
            .and_then(|names| names.get(class).cloned())
            .unwrap_or_else(|| format!("Class {class}"));
        report.push_str(&format!(
            "{:>12} {:>10.2} {:>10.2} {:>10.2} {:>10}\n",
            name,
            metrics.precision(class),
            metrics.recall(class),
            metrics.f1(class),
            metrics.support(class)
        ));
    }

    report.push('\n');
    for (label, average) in [("macro avg", Average::Macro), ("weighted avg", Average::Weighted)] {
        report.push_str(&format!(
            "{:>12} {:>10.2} {:>10.2} {:>10.2} {:>10}\n",
            label,
            metrics.precision_avg(average),
            metrics.recall_avg(average),
            metrics.f1_avg(average),
            cm.total()
        ));
    }

    report.push_str(&format!("\nAccuracy: {:.4}\n", metrics.accuracy()));
    report
}
