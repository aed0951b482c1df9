//! Minimal tape autograd
//!
//! Loss functions and model forwards attach [`BackwardOp`] nodes to the
//! tensors they produce; [`backward`] seeds the output gradient and walks
//! the chain. A [`no_grad`] guard disables tape construction for a scope,
//! which the training loop uses to wrap entire validation passes.

mod backward;
mod tensor;

pub use backward::BackwardOp;
pub use tensor::Tensor;

use std::cell::Cell;

thread_local! {
    static GRAD_ENABLED: Cell<bool> = const { Cell::new(true) };
}

/// Whether backward ops should currently be recorded.
#[must_use]
pub fn grad_enabled() -> bool {
    GRAD_ENABLED.with(Cell::get)
}

/// Disable gradient recording until the returned guard is dropped.
/// Guards nest; each restores the state it observed.
#[must_use]
pub fn no_grad() -> NoGradGuard {
    let previous = GRAD_ENABLED.with(|flag| flag.replace(false));
    NoGradGuard { previous }
}

/// Scope guard created by [`no_grad`].
pub struct NoGradGuard {
    previous: bool,
}

impl Drop for NoGradGuard {
    fn drop(&mut self) {
        GRAD_ENABLED.with(|flag| flag.set(self.previous));
    }
}

/// Perform a backward pass from `tensor`.
///
/// Seeds the gradient with ones when `grad_output` is not given, matching
/// the scalar-loss case, then runs the attached backward op chain.
pub fn backward(tensor: &mut Tensor, grad_output: Option<ndarray::Array1<f32>>) {
    if let Some(grad) = grad_output {
        tensor.set_grad(grad);
    } else {
        tensor.set_grad(ndarray::Array1::ones(tensor.len()));
    }

    if let Some(op) = tensor.backward_op() {
        op.backward();
    }
}
