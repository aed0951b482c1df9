//! Confusion matrix for multi-class classification

use std::fmt;

/// Confusion matrix with true classes as rows and predicted classes as
/// columns. Class count is inferred as `max label + 1` over both inputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfusionMatrix {
    matrix: Vec<Vec<usize>>,
    n_classes: usize,
}

impl ConfusionMatrix {
    /// Build from parallel label vectors.
    pub fn from_predictions(y_true: &[usize], y_pred: &[usize]) -> Self {
        assert_eq!(y_true.len(), y_pred.len(), "Label vectors must have same length");

        let n_classes = y_true
            .iter()
            .chain(y_pred.iter())
            .max()
            .map_or(0, |&max| max + 1);

        let mut matrix = vec![vec![0_usize; n_classes]; n_classes];
        for (&t, &p) in y_true.iter().zip(y_pred.iter()) {
            matrix[t][p] += 1;
        }

        Self { matrix, n_classes }
    }

    #[must_use]
    pub fn n_classes(&self) -> usize {
        self.n_classes
    }

    /// Count of samples with true class `t` predicted as `p`.
    #[must_use]
    pub fn count(&self, t: usize, p: usize) -> usize {
        self.matrix[t][p]
    }

    /// Correct predictions for `class` (the diagonal entry).
    #[must_use]
    pub fn true_positives(&self, class: usize) -> usize {
        self.matrix[class][class]
    }

    /// Samples of other classes predicted as `class` (column minus diagonal).
    #[must_use]
    pub fn false_positives(&self, class: usize) -> usize {
        (0..self.n_classes)
            .filter(|&i| i != class)
            .map(|i| self.matrix[i][class])
            .sum()
    }

    /// Samples of `class` predicted as something else (row minus diagonal).
    #[must_use]
    pub fn false_negatives(&self, class: usize) -> usize {
        (0..self.n_classes)
            .filter(|&j| j != class)
            .map(|j| self.matrix[class][j])
            .sum()
    }

    /// Number of samples whose true class is `class`.
    #[must_use]
    pub fn support(&self, class: usize) -> usize {
        self.matrix[class].iter().sum()
    }

    /// Total number of samples.
    #[must_use]
    pub fn total(&self) -> usize {
        self.matrix.iter().map(|row| row.iter().sum::<usize>()).sum()
    }

    /// Fraction of samples on the diagonal, 0.0 for an empty matrix.
    #[must_use]
    pub fn accuracy(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        let correct: usize = (0..self.n_classes).map(|c| self.matrix[c][c]).sum();
        correct as f64 / total as f64
    }
}

impl fmt::Display for ConfusionMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:>8}", "")?;
        for p in 0..self.n_classes {
            write!(f, "{:>8}", format!("pred {p}"))?;
        }
        writeln!(f)?;
        for (t, row) in self.matrix.iter().enumerate() {
            write!(f, "{:>8}", format!("true {t}"))?;
            for &count in row {
                write!(f, "{count:>8}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
