//! Model abstraction consumed by the training loop

use crate::autograd::Tensor;
use crate::device::Device;

/// Forward-pass mode. Layers such as dropout behave differently between
/// the two; the training loop switches the model before every pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Train,
    Eval,
}

/// A trainable model.
///
/// Implementations own their parameter tensors and hand out shared handles
/// through [`Model::parameters`], so the optimizer and checkpointing see
/// the same storage the forward pass reads.
pub trait Model {
    /// Run the forward pass over a flattened batch of inputs.
    fn forward(&mut self, inputs: &Tensor) -> Tensor;

    /// Shared handles to every trainable parameter.
    fn parameters(&self) -> Vec<Tensor>;

    /// Switch between training and evaluation behaviour.
    fn set_mode(&mut self, mode: Mode);

    /// The currently active mode.
    fn mode(&self) -> Mode;

    /// Move parameters to `device`. The default is a no-op for models
    /// whose tensors are device-agnostic.
    fn place(&mut self, _device: Device) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_default_is_train() {
        assert_eq!(Mode::default(), Mode::Train);
    }

    struct Stateless;

    impl Model for Stateless {
        fn forward(&mut self, inputs: &Tensor) -> Tensor {
            inputs.clone()
        }

        fn parameters(&self) -> Vec<Tensor> {
            Vec::new()
        }

        fn set_mode(&mut self, _mode: Mode) {}

        fn mode(&self) -> Mode {
            Mode::Eval
        }
    }

    #[test]
    fn test_place_default_is_noop() {
        let mut model = Stateless;
        model.place(Device::Cpu);
        assert!(model.parameters().is_empty());
    }
}
