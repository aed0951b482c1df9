//! Loss functions for training

use crate::autograd::{grad_enabled, BackwardOp, Tensor};
use ndarray::Array1;
use std::cell::RefCell;
use std::rc::Rc;

/// Trait for loss functions
pub trait LossFn {
    /// Compute loss given predictions and targets
    ///
    /// Returns a scalar loss value and sets up gradients for backpropagation
    fn forward(&self, predictions: &Tensor, targets: &Tensor) -> Tensor;

    /// Name of the loss function
    fn name(&self) -> &str;
}

/// Mean Squared Error Loss
///
/// L = mean((predictions - targets)²)
///
/// # Example
///
/// ```
/// use dionysus::train::{LossFn, MSELoss};
/// use dionysus::autograd::Tensor;
///
/// let loss_fn = MSELoss;
/// let pred = Tensor::from_vec(vec![1.0, 2.0, 3.0], true);
/// let target = Tensor::from_vec(vec![1.5, 2.5, 3.5], false);
///
/// let loss = loss_fn.forward(&pred, &target);
/// assert!(loss.data()[0] > 0.0);
/// ```
pub struct MSELoss;

impl LossFn for MSELoss {
    fn forward(&self, predictions: &Tensor, targets: &Tensor) -> Tensor {
        assert_eq!(
            predictions.len(),
            targets.len(),
            "Predictions and targets must have same length"
        );

        // Compute squared error
        let diff = predictions.data() - targets.data();
        let squared = &diff * &diff;
        let mse = squared.mean().unwrap_or(0.0);

        // Create loss tensor
        let mut loss = Tensor::from_vec(vec![mse], true);

        // Set up gradient: d(MSE)/d(pred) = 2 * (pred - target) / n
        let n = predictions.len() as f32;
        let grad = &diff * (2.0 / n);

        struct MSEBackward {
            pred_grad_cell: Rc<RefCell<Option<Array1<f32>>>>,
            pred_op: Option<Rc<dyn BackwardOp>>,
            grad: Array1<f32>,
        }

        impl BackwardOp for MSEBackward {
            fn backward(&self) {
                {
                    // Accumulate gradient to predictions
                    let mut pred_grad = self.pred_grad_cell.borrow_mut();
                    if let Some(existing) = pred_grad.as_mut() {
                        *existing = &*existing + &self.grad;
                    } else {
                        *pred_grad = Some(self.grad.clone());
                    }
                }
                // Continue into whatever produced the predictions
                if let Some(op) = &self.pred_op {
                    op.backward();
                }
            }
        }

        if predictions.requires_grad() && grad_enabled() {
            loss.set_backward_op(Rc::new(MSEBackward {
                pred_grad_cell: predictions.grad_cell(),
                pred_op: predictions.backward_op(),
                grad,
            }));
        }

        loss
    }

    fn name(&self) -> &'static str {
        "MSE"
    }
}

/// Cross Entropy Loss (for classification)
///
/// Predictions are row-major logits, `rows * n_classes` long; targets hold
/// one class index per row. Softmax is applied per row and the loss is the
/// mean negative log-likelihood of the target classes.
///
/// # Example
///
/// ```
/// use dionysus::train::{CrossEntropyLoss, LossFn};
/// use dionysus::autograd::Tensor;
///
/// // Two rows, three classes each
/// let logits = Tensor::from_vec(vec![2.0, 1.0, 0.5, 0.1, 3.0, 0.2], true);
/// let targets = Tensor::from_vec(vec![0.0, 1.0], false);
///
/// let loss = CrossEntropyLoss.forward(&logits, &targets);
/// assert!(loss.data()[0] > 0.0);
/// ```
pub struct CrossEntropyLoss;

impl CrossEntropyLoss {
    /// Compute softmax over one row of logits: exp(x_i) / sum(exp(x_j))
    fn softmax(row: &[f32]) -> Vec<f32> {
        let max = row.iter().fold(f32::NEG_INFINITY, |a, &b| a.max(b));
        let exp_row: Vec<f32> = row.iter().map(|&v| (v - max).exp()).collect();
        let sum: f32 = exp_row.iter().sum();
        exp_row.into_iter().map(|e| e / sum).collect()
    }
}

impl LossFn for CrossEntropyLoss {
    fn forward(&self, predictions: &Tensor, targets: &Tensor) -> Tensor {
        let rows = targets.len();
        assert!(rows > 0, "Targets must not be empty");
        assert_eq!(
            predictions.len() % rows,
            0,
            "Predictions length must be a multiple of target rows"
        );
        let n_classes = predictions.len() / rows;

        let logits = predictions.to_vec();
        let target_vals = targets.to_vec();

        let mut total = 0.0_f32;
        let mut grad = vec![0.0_f32; logits.len()];
        for (r, row) in logits.chunks_exact(n_classes).enumerate() {
            let probs = Self::softmax(row);
            let class = target_vals[r] as usize;
            assert!(class < n_classes, "Target class {class} out of range for {n_classes} outputs");

            total -= (probs[class] + 1e-10).ln();

            // d(CE)/d(logits) = (probs - one_hot) / rows
            for (c, &p) in probs.iter().enumerate() {
                let one_hot = if c == class { 1.0 } else { 0.0 };
                grad[r * n_classes + c] = (p - one_hot) / rows as f32;
            }
        }

        let mut loss = Tensor::from_vec(vec![total / rows as f32], true);

        struct CEBackward {
            pred_grad_cell: Rc<RefCell<Option<Array1<f32>>>>,
            pred_op: Option<Rc<dyn BackwardOp>>,
            grad: Array1<f32>,
        }

        impl BackwardOp for CEBackward {
            fn backward(&self) {
                {
                    let mut pred_grad = self.pred_grad_cell.borrow_mut();
                    if let Some(existing) = pred_grad.as_mut() {
                        *existing = &*existing + &self.grad;
                    } else {
                        *pred_grad = Some(self.grad.clone());
                    }
                }
                if let Some(op) = &self.pred_op {
                    op.backward();
                }
            }
        }

        if predictions.requires_grad() && grad_enabled() {
            loss.set_backward_op(Rc::new(CEBackward {
                pred_grad_cell: predictions.grad_cell(),
                pred_op: predictions.backward_op(),
                grad: Array1::from(grad),
            }));
        }

        loss
    }

    fn name(&self) -> &'static str {
        "CrossEntropy"
    }
}
