//! Batches and batch sources

use crate::autograd::Tensor;
use crate::device::Device;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// A single batch of training data.
///
/// Inputs hold `rows * features` values in row-major order; targets hold
/// one value per row, so `targets.len()` is the row count.
#[derive(Clone)]
pub struct Batch {
    pub inputs: Tensor,
    pub targets: Tensor,
}

impl Batch {
    pub fn new(inputs: Tensor, targets: Tensor) -> Self {
        Self { inputs, targets }
    }

    /// Number of samples in the batch.
    #[must_use]
    pub fn size(&self) -> usize {
        self.targets.len()
    }

    /// Retag both tensors for `device`.
    #[must_use]
    pub fn to_device(&self, device: Device) -> Self {
        Self {
            inputs: self.inputs.to_device(device),
            targets: self.targets.to_device(device),
        }
    }
}

/// Source of batches for one pass over a dataset.
///
/// `batches` takes `&mut self` so sources can reshuffle or advance internal
/// cursors between epochs.
pub trait DataSource {
    /// Iterate over the batches of one epoch.
    fn batches(&mut self) -> Box<dyn Iterator<Item = Batch> + '_>;

    /// Number of batches per epoch, when known up front.
    fn size_hint(&self) -> Option<usize> {
        None
    }
}

/// In-memory batch source with optional per-epoch shuffling.
pub struct InMemorySource {
    batches: Vec<Batch>,
    shuffle_seed: Option<u64>,
    epoch: u64,
}

impl InMemorySource {
    pub fn new(batches: Vec<Batch>) -> Self {
        Self { batches, shuffle_seed: None, epoch: 0 }
    }

    /// Shuffle batch order every epoch, deterministically from `seed`.
    #[must_use]
    pub fn with_shuffle(mut self, seed: u64) -> Self {
        self.shuffle_seed = Some(seed);
        self
    }
}

impl DataSource for InMemorySource {
    fn batches(&mut self) -> Box<dyn Iterator<Item = Batch> + '_> {
        let mut epoch_batches = self.batches.clone();
        if let Some(seed) = self.shuffle_seed {
            // Different order each epoch, same orders for the same seed
            let mut rng = StdRng::seed_from_u64(seed.wrapping_add(self.epoch));
            epoch_batches.shuffle(&mut rng);
        }
        self.epoch += 1;
        Box::new(epoch_batches.into_iter())
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.batches.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn batch(id: f32) -> Batch {
        Batch::new(
            Tensor::from_vec(vec![id, id], false),
            Tensor::from_vec(vec![id], false),
        )
    }

    #[test]
    fn test_batch_size_counts_targets() {
        let b = Batch::new(
            Tensor::from_vec(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], false),
            Tensor::from_vec(vec![0.0, 1.0], false),
        );
        assert_eq!(b.size(), 2);
    }

    #[test]
    fn test_in_memory_source_preserves_order_without_seed() {
        let mut source = InMemorySource::new(vec![batch(0.0), batch(1.0), batch(2.0)]);

        for _ in 0..2 {
            let ids: Vec<f32> = source.batches().map(|b| b.targets.to_vec()[0]).collect();
            assert_eq!(ids, vec![0.0, 1.0, 2.0]);
        }
    }

    #[test]
    fn test_in_memory_source_shuffles_deterministically() {
        let make = || {
            InMemorySource::new((0..8).map(|i| batch(i as f32)).collect()).with_shuffle(42)
        };

        let mut first = make();
        let mut second = make();
        for _ in 0..3 {
            let a: Vec<f32> = first.batches().map(|b| b.targets.to_vec()[0]).collect();
            let b: Vec<f32> = second.batches().map(|b| b.targets.to_vec()[0]).collect();
            assert_eq!(a, b);
        }
    }

    #[test]
    fn test_in_memory_source_reshuffles_between_epochs() {
        let mut source =
            InMemorySource::new((0..16).map(|i| batch(i as f32)).collect()).with_shuffle(7);

        let first: Vec<f32> = source.batches().map(|b| b.targets.to_vec()[0]).collect();
        let second: Vec<f32> = source.batches().map(|b| b.targets.to_vec()[0]).collect();
        assert_ne!(first, second);
    }

    #[test]
    fn test_size_hint_reports_batch_count() {
        let source = InMemorySource::new(vec![batch(0.0), batch(1.0)]);
        assert_eq!(source.size_hint(), Some(2));
    }
}
