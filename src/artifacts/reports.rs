//! CSV exports written into the run directory

use crate::error::Result;
use crate::eval::ConfusionMatrix;
use crate::train::ResultSeries;
use std::fs;
use std::path::Path;

/// Write `loss.csv` with per-epoch training loss and, when tracked,
/// validation loss.
pub fn save_loss_curves(run_dir: &Path, results: &ResultSeries) -> Result<()> {
    let epochs = results.get("epoch").unwrap_or(&[]);
    let training = results.get("training_loss").unwrap_or(&[]);

    let mut csv = String::new();
    match results.get("validation_loss") {
        Some(validation) => {
            csv.push_str("epoch,training_loss,validation_loss\n");
            for ((e, t), v) in epochs.iter().zip(training).zip(validation) {
                csv.push_str(&format!("{e:.0},{t},{v}\n"));
            }
        }
        None => {
            csv.push_str("epoch,training_loss\n");
            for (e, t) in epochs.iter().zip(training) {
                csv.push_str(&format!("{e:.0},{t}\n"));
            }
        }
    }

    fs::write(run_dir.join("loss.csv"), csv)?;
    Ok(())
}

/// Write `{prefix}_metrics.csv` with the four classification scores the
/// loop tracks per epoch under that prefix.
pub fn save_metric_series(run_dir: &Path, results: &ResultSeries, prefix: &str) -> Result<()> {
    let epochs = results.get("epoch").unwrap_or(&[]);
    let accuracy = results.get(&format!("{prefix}_accuracy")).unwrap_or(&[]);
    let recall = results.get(&format!("{prefix}_macro_recall")).unwrap_or(&[]);
    let precision = results.get(&format!("{prefix}_macro_precision")).unwrap_or(&[]);
    let f1 = results.get(&format!("{prefix}_macro_f1score")).unwrap_or(&[]);

    let mut csv = String::from("epoch,accuracy,macro_recall,macro_precision,macro_f1score\n");
    for (i, e) in epochs.iter().enumerate() {
        let row = (accuracy.get(i), recall.get(i), precision.get(i), f1.get(i));
        if let (Some(a), Some(r), Some(p), Some(f)) = row {
            csv.push_str(&format!("{e:.0},{a},{r},{p},{f}\n"));
        }
    }

    fs::write(run_dir.join(format!("{prefix}_metrics.csv")), csv)?;
    Ok(())
}

/// Write `confusion_matrix.csv`, one row of counts per true class.
pub fn save_confusion_matrix(run_dir: &Path, cm: &ConfusionMatrix) -> Result<()> {
    let mut csv = String::new();
    for t in 0..cm.n_classes() {
        let row: Vec<String> = (0..cm.n_classes()).map(|p| cm.count(t, p).to_string()).collect();
        csv.push_str(&row.join(","));
        csv.push('\n');
    }

    fs::write(run_dir.join("confusion_matrix.csv"), csv)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series_with(keys: &[&str], rows: usize) -> ResultSeries {
        let mut results = ResultSeries::with_keys(keys.iter().copied());
        for i in 0..rows {
            for &key in keys {
                let value = if key == "epoch" { (i + 1) as f64 } else { i as f64 * 0.1 };
                results.append(key, value).unwrap();
            }
        }
        results
    }

    #[test]
    fn test_loss_csv_without_validation() {
        let dir = tempfile::tempdir().unwrap();
        let results = series_with(&["epoch", "training_loss"], 2);

        save_loss_curves(dir.path(), &results).unwrap();

        let csv = fs::read_to_string(dir.path().join("loss.csv")).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "epoch,training_loss");
        assert_eq!(lines.len(), 3);
        assert!(lines[1].starts_with("1,"));
        assert!(lines[2].starts_with("2,"));
    }

    #[test]
    fn test_loss_csv_with_validation() {
        let dir = tempfile::tempdir().unwrap();
        let results = series_with(&["epoch", "training_loss", "validation_loss"], 2);

        save_loss_curves(dir.path(), &results).unwrap();

        let csv = fs::read_to_string(dir.path().join("loss.csv")).unwrap();
        assert!(csv.starts_with("epoch,training_loss,validation_loss\n"));
        assert_eq!(csv.lines().count(), 3);
    }

    #[test]
    fn test_metric_csv_columns() {
        let dir = tempfile::tempdir().unwrap();
        let results = series_with(
            &[
                "epoch",
                "validation_accuracy",
                "validation_macro_recall",
                "validation_macro_precision",
                "validation_macro_f1score",
            ],
            3,
        );

        save_metric_series(dir.path(), &results, "validation").unwrap();

        let csv = fs::read_to_string(dir.path().join("validation_metrics.csv")).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "epoch,accuracy,macro_recall,macro_precision,macro_f1score");
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[1].matches(',').count(), 4);
    }

    #[test]
    fn test_confusion_csv_rows() {
        let dir = tempfile::tempdir().unwrap();
        let cm = ConfusionMatrix::from_predictions(&[0, 0, 1, 1], &[0, 1, 1, 1]);

        save_confusion_matrix(dir.path(), &cm).unwrap();

        let csv = fs::read_to_string(dir.path().join("confusion_matrix.csv")).unwrap();
        assert_eq!(csv, "1,1\n0,2\n");
    }
}
