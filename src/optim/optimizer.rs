//! Optimizer trait

use crate::autograd::Tensor;

/// Trait for optimization algorithms.
///
/// The training loop fetches parameter handles from the model once and
/// passes the same slice to every call, so stateful optimizers can keep
/// per-parameter buffers indexed by position.
pub trait Optimizer {
    /// Perform a single optimization step
    fn step(&mut self, params: &mut [Tensor]);

    /// Zero out all gradients
    fn zero_grad(&mut self, params: &mut [Tensor]) {
        for param in params {
            param.zero_grad();
        }
    }

    /// Get learning rate
    fn lr(&self) -> f32;

    /// Set learning rate
    fn set_lr(&mut self, lr: f32);
}
