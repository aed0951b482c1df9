//! Majority-class baseline for sanity-checking trained models

/// Predicts the most frequent class from a fitted label vector.
///
/// The end-of-run report prints this baseline next to the model's own
/// report; a model that cannot beat it has learned nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MajorityClassBaseline {
    class: usize,
}

impl MajorityClassBaseline {
    /// Fit on true labels. Ties resolve to the smallest class index, and
    /// an empty vector yields class 0.
    pub fn fit(y_true: &[usize]) -> Self {
        let n_classes = y_true.iter().max().map_or(0, |&max| max + 1);
        let mut counts = vec![0_usize; n_classes];
        for &label in y_true {
            counts[label] += 1;
        }

        let mut class = 0;
        let mut best = 0;
        for (candidate, &count) in counts.iter().enumerate() {
            if count > best {
                best = count;
                class = candidate;
            }
        }

        Self { class }
    }

    #[must_use]
    pub fn class(&self) -> usize {
        self.class
    }

    /// Predict `n` samples, all of the majority class.
    #[must_use]
    pub fn predict(&self, n: usize) -> Vec<usize> {
        vec![self.class; n]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_picks_most_frequent_class() {
        let baseline = MajorityClassBaseline::fit(&[0, 1, 1, 2, 1]);
        assert_eq!(baseline.class(), 1);
    }

    #[test]
    fn test_tie_resolves_to_smallest_index() {
        let baseline = MajorityClassBaseline::fit(&[2, 2, 0, 0]);
        assert_eq!(baseline.class(), 0);
    }

    #[test]
    fn test_empty_labels_default_to_zero() {
        let baseline = MajorityClassBaseline::fit(&[]);
        assert_eq!(baseline.class(), 0);
    }

    #[test]
    fn test_predict_repeats_majority() {
        let baseline = MajorityClassBaseline::fit(&[3, 3, 1]);
        assert_eq!(baseline.predict(4), vec![3, 3, 3, 3]);
    }

    #[test]
    fn test_predict_zero_samples() {
        let baseline = MajorityClassBaseline::fit(&[0]);
        assert!(baseline.predict(0).is_empty());
    }

    #[test]
    fn test_skewed_labels_set_the_accuracy_floor() {
        use crate::eval::ConfusionMatrix;

        let y_true = [0, 0, 0, 1];
        let baseline = MajorityClassBaseline::fit(&y_true);
        let y_pred = baseline.predict(y_true.len());

        assert_eq!(y_pred, vec![0, 0, 0, 0]);
        let cm = ConfusionMatrix::from_predictions(&y_true, &y_pred);
        assert!((cm.accuracy() - 0.75).abs() < 1e-9);
    }
}
