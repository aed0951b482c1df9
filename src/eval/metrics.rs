//! Per-class precision, recall and F1 with selectable averaging

use super::{Average, ConfusionMatrix};

/// Per-class classification metrics derived from a confusion matrix.
#[derive(Debug, Clone)]
pub struct MultiClassMetrics {
    precision: Vec<f64>,
    recall: Vec<f64>,
    f1: Vec<f64>,
    support: Vec<usize>,
    accuracy: f64,
    total_tp: usize,
    total_fp: usize,
    total_fn: usize,
}

impl MultiClassMetrics {
    /// Compute metrics for every class in the matrix.
    ///
    /// Undefined ratios (zero denominators) score 0.0 rather than NaN, so
    /// classes that are never predicted simply drag the averages down.
    pub fn from_confusion(cm: &ConfusionMatrix) -> Self {
        let n = cm.n_classes();
        let mut precision = Vec::with_capacity(n);
        let mut recall = Vec::with_capacity(n);
        let mut f1 = Vec::with_capacity(n);
        let mut support = Vec::with_capacity(n);
        let mut total_tp = 0;
        let mut total_fp = 0;
        let mut total_fn = 0;

        for class in 0..n {
            let tp = cm.true_positives(class);
            let fp = cm.false_positives(class);
            let fn_count = cm.false_negatives(class);
            total_tp += tp;
            total_fp += fp;
            total_fn += fn_count;

            let p = safe_ratio(tp, tp + fp);
            let r = safe_ratio(tp, tp + fn_count);
            precision.push(p);
            recall.push(r);
            f1.push(harmonic(p, r));
            support.push(cm.support(class));
        }

        Self {
            precision,
            recall,
            f1,
            support,
            accuracy: cm.accuracy(),
            total_tp,
            total_fp,
            total_fn,
        }
    }

    #[must_use]
    pub fn n_classes(&self) -> usize {
        self.precision.len()
    }

    #[must_use]
    pub fn precision(&self, class: usize) -> f64 {
        self.precision[class]
    }

    #[must_use]
    pub fn recall(&self, class: usize) -> f64 {
        self.recall[class]
    }

    #[must_use]
    pub fn f1(&self, class: usize) -> f64 {
        self.f1[class]
    }

    #[must_use]
    pub fn support(&self, class: usize) -> usize {
        self.support[class]
    }

    #[must_use]
    pub fn accuracy(&self) -> f64 {
        self.accuracy
    }

    #[must_use]
    pub fn precision_avg(&self, average: Average) -> f64 {
        match average {
            Average::Macro => mean(&self.precision),
            Average::Micro => safe_ratio(self.total_tp, self.total_tp + self.total_fp),
            Average::Weighted => self.weighted(&self.precision),
        }
    }

    #[must_use]
    pub fn recall_avg(&self, average: Average) -> f64 {
        match average {
            Average::Macro => mean(&self.recall),
            Average::Micro => safe_ratio(self.total_tp, self.total_tp + self.total_fn),
            Average::Weighted => self.weighted(&self.recall),
        }
    }

    #[must_use]
    pub fn f1_avg(&self, average: Average) -> f64 {
        match average {
            Average::Macro => mean(&self.f1),
            Average::Micro => harmonic(
                self.precision_avg(Average::Micro),
                self.recall_avg(Average::Micro),
            ),
            Average::Weighted => self.weighted(&self.f1),
        }
    }

    fn weighted(&self, scores: &[f64]) -> f64 {
        let total: usize = self.support.iter().sum();
        if total == 0 {
            return 0.0;
        }
        scores
            .iter()
            .zip(self.support.iter())
            .map(|(&s, &w)| s * w as f64)
            .sum::<f64>()
            / total as f64
    }
}

fn safe_ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

fn harmonic(p: f64, r: f64) -> f64 {
    if p + r == 0.0 {
        0.0
    } else {
        2.0 * p * r / (p + r)
    }
}

fn mean(scores: &[f64]) -> f64 {
    if scores.is_empty() {
        0.0
    } else {
        scores.iter().sum::<f64>() / scores.len() as f64
    }
}
