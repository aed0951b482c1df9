//! Shared-storage tensor with gradient tape hooks
//!
//! A [`Tensor`] is a handle: cloning shares the underlying value and
//! gradient cells, so a model, an optimizer, and a checkpoint writer all
//! observe the same storage. Data is a flat `f32` array; batches are
//! row-major flattened.

use std::cell::{RefCell, RefMut};
use std::fmt;
use std::rc::Rc;

use ndarray::Array1;

use super::backward::BackwardOp;
use crate::device::Device;

/// A 1-D tensor of `f32` values with optional gradient tracking.
#[derive(Clone)]
pub struct Tensor {
    data: Rc<RefCell<Array1<f32>>>,
    grad: Rc<RefCell<Option<Array1<f32>>>>,
    requires_grad: bool,
    backward_op: Option<Rc<dyn BackwardOp>>,
    device: Device,
}

impl Tensor {
    /// Create a tensor from an ndarray.
    #[must_use]
    pub fn new(data: Array1<f32>, requires_grad: bool) -> Self {
        Self {
            data: Rc::new(RefCell::new(data)),
            grad: Rc::new(RefCell::new(None)),
            requires_grad,
            backward_op: None,
            device: Device::Cpu,
        }
    }

    /// Create a tensor from a plain vector.
    #[must_use]
    pub fn from_vec(data: Vec<f32>, requires_grad: bool) -> Self {
        Self::new(Array1::from(data), requires_grad)
    }

    /// Create a zero-filled tensor.
    #[must_use]
    pub fn zeros(len: usize, requires_grad: bool) -> Self {
        Self::new(Array1::zeros(len), requires_grad)
    }

    /// Snapshot of the current values.
    #[must_use]
    pub fn data(&self) -> Array1<f32> {
        self.data.borrow().clone()
    }

    /// Mutable access to the shared storage.
    pub fn data_mut(&self) -> RefMut<'_, Array1<f32>> {
        self.data.borrow_mut()
    }

    /// Current values as a plain vector.
    #[must_use]
    pub fn to_vec(&self) -> Vec<f32> {
        self.data.borrow().to_vec()
    }

    /// Number of elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.borrow().len()
    }

    /// Whether the tensor holds no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether gradients are tracked for this tensor.
    #[must_use]
    pub fn requires_grad(&self) -> bool {
        self.requires_grad
    }

    /// Snapshot of the accumulated gradient, if any.
    #[must_use]
    pub fn grad(&self) -> Option<Array1<f32>> {
        self.grad.borrow().clone()
    }

    /// Replace the gradient.
    pub fn set_grad(&self, grad: Array1<f32>) {
        *self.grad.borrow_mut() = Some(grad);
    }

    /// Add into the gradient, setting it on first use.
    pub fn accumulate_grad(&self, grad: Array1<f32>) {
        let mut slot = self.grad.borrow_mut();
        if let Some(existing) = slot.as_mut() {
            *existing = &*existing + &grad;
        } else {
            *slot = Some(grad);
        }
    }

    /// Reset the gradient.
    pub fn zero_grad(&self) {
        *self.grad.borrow_mut() = None;
    }

    /// The shared gradient cell, for backward ops to write into.
    #[must_use]
    pub fn grad_cell(&self) -> Rc<RefCell<Option<Array1<f32>>>> {
        Rc::clone(&self.grad)
    }

    /// The backward op attached to this handle, if any.
    #[must_use]
    pub fn backward_op(&self) -> Option<Rc<dyn BackwardOp>> {
        self.backward_op.clone()
    }

    /// Attach the backward op that produced this tensor.
    pub fn set_backward_op(&mut self, op: Rc<dyn BackwardOp>) {
        self.backward_op = Some(op);
    }

    /// Deep copy with no gradient tracking and no tape history.
    #[must_use]
    pub fn detach(&self) -> Tensor {
        let mut detached = Tensor::new(self.data(), false);
        detached.device = self.device;
        detached
    }

    /// Re-tag this handle for `device`. Storage stays shared; only the
    /// placement tag of the returned handle differs.
    #[must_use]
    pub fn to_device(&self, device: Device) -> Tensor {
        let mut moved = self.clone();
        moved.device = device;
        moved
    }

    /// The device this handle is placed on.
    #[must_use]
    pub fn device(&self) -> Device {
        self.device
    }
}

impl fmt::Debug for Tensor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tensor")
            .field("data", &self.data.borrow())
            .field("requires_grad", &self.requires_grad)
            .field("device", &self.device)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::arr1;

    #[test]
    fn test_clone_shares_storage() {
        let a = Tensor::from_vec(vec![1.0, 2.0, 3.0], true);
        let b = a.clone();

        *a.data_mut() = arr1(&[9.0, 8.0, 7.0]);

        assert_eq!(b.to_vec(), vec![9.0, 8.0, 7.0]);
    }

    #[test]
    fn test_clone_shares_gradient() {
        let a = Tensor::from_vec(vec![1.0, 2.0], true);
        let b = a.clone();

        b.set_grad(arr1(&[0.5, 0.5]));

        assert_eq!(a.grad().unwrap(), arr1(&[0.5, 0.5]));
    }

    #[test]
    fn test_detach_deep_copies() {
        let a = Tensor::from_vec(vec![1.0, 2.0], true);
        let d = a.detach();

        *a.data_mut() = arr1(&[5.0, 5.0]);

        assert_eq!(d.to_vec(), vec![1.0, 2.0]);
        assert!(!d.requires_grad());
        assert!(d.backward_op().is_none());
    }

    #[test]
    fn test_accumulate_grad_adds() {
        let t = Tensor::from_vec(vec![0.0, 0.0], true);
        t.accumulate_grad(arr1(&[1.0, 2.0]));
        t.accumulate_grad(arr1(&[0.5, 0.5]));

        assert_eq!(t.grad().unwrap(), arr1(&[1.5, 2.5]));
    }

    #[test]
    fn test_zero_grad_clears() {
        let t = Tensor::from_vec(vec![1.0], true);
        t.set_grad(arr1(&[3.0]));
        t.zero_grad();

        assert!(t.grad().is_none());
    }

    #[test]
    fn test_to_device_retags_without_copy() {
        let a = Tensor::from_vec(vec![1.0, 2.0], false);
        let moved = a.to_device(Device::Cuda { device_id: 0 });

        assert_eq!(moved.device(), Device::Cuda { device_id: 0 });
        assert_eq!(a.device(), Device::Cpu);

        *moved.data_mut() = arr1(&[4.0, 4.0]);
        assert_eq!(a.to_vec(), vec![4.0, 4.0]);
    }

    #[test]
    fn test_zeros_and_len() {
        let t = Tensor::zeros(4, false);
        assert_eq!(t.len(), 4);
        assert!(!t.is_empty());
        assert_eq!(t.to_vec(), vec![0.0; 4]);
    }
}
