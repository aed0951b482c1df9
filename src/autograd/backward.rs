//! Backward operation trait

/// A node in the gradient tape.
///
/// An implementation accumulates gradients into the grad cells of the
/// tensors that produced its output, then invokes the backward ops of
/// those inputs so the chain continues down to the leaves.
pub trait BackwardOp {
    /// Propagate gradients one step backwards.
    fn backward(&self);
}
