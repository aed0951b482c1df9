//! Stochastic Gradient Descent optimizer

use super::Optimizer;
use crate::autograd::Tensor;
use ndarray::Array1;

/// SGD optimizer with optional momentum
pub struct SGD {
    lr: f32,
    momentum: f32,
    velocities: Vec<Option<Array1<f32>>>,
}

impl SGD {
    /// Create a new SGD optimizer
    pub fn new(lr: f32, momentum: f32) -> Self {
        Self {
            lr,
            momentum,
            velocities: Vec::new(),
        }
    }

    /// Initialize velocities if needed
    fn ensure_velocities(&mut self, params: &[Tensor]) {
        if self.velocities.is_empty() {
            self.velocities = params.iter().map(|_| None).collect();
        }
    }
}

impl Optimizer for SGD {
    fn step(&mut self, params: &mut [Tensor]) {
        self.ensure_velocities(params);

        for (i, param) in params.iter_mut().enumerate() {
            if let Some(grad) = param.grad() {
                if self.momentum > 0.0 {
                    // v = momentum * v - lr * grad
                    let velocity = if let Some(v) = &self.velocities[i] {
                        v * self.momentum - &grad * self.lr
                    } else {
                        &grad * (-self.lr)
                    };

                    *param.data_mut() = param.data() + &velocity;
                    self.velocities[i] = Some(velocity);
                } else {
                    // Simple SGD: param -= lr * grad
                    *param.data_mut() = param.data() - &(&grad * self.lr);
                }
            }
        }
    }

    fn lr(&self) -> f32 {
        self.lr
    }

    fn set_lr(&mut self, lr: f32) {
        self.lr = lr;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::arr1;

    #[test]
    fn test_sgd_simple_step() {
        let mut opt = SGD::new(0.1, 0.0);
        let param = Tensor::from_vec(vec![1.0, 2.0], true);
        param.set_grad(arr1(&[1.0, -1.0]));

        opt.step(&mut [param.clone()]);

        let data = param.to_vec();
        assert_abs_diff_eq!(data[0], 0.9, epsilon = 1e-6);
        assert_abs_diff_eq!(data[1], 2.1, epsilon = 1e-6);
    }

    #[test]
    fn test_sgd_momentum_accumulates() {
        let mut opt = SGD::new(0.1, 0.9);
        let param = Tensor::from_vec(vec![0.0], true);

        // Same gradient twice: second update includes carried velocity
        param.set_grad(arr1(&[1.0]));
        opt.step(&mut [param.clone()]);
        assert_abs_diff_eq!(param.to_vec()[0], -0.1, epsilon = 1e-6);

        param.set_grad(arr1(&[1.0]));
        opt.step(&mut [param.clone()]);
        // v = 0.9 * (-0.1) - 0.1 = -0.19, param = -0.1 - 0.19
        assert_abs_diff_eq!(param.to_vec()[0], -0.29, epsilon = 1e-6);
    }

    #[test]
    fn test_sgd_converges_on_quadratic() {
        // Minimize f(x) = x^2 from x = 5.0; grad = 2x
        let mut opt = SGD::new(0.1, 0.0);
        let param = Tensor::from_vec(vec![5.0], true);

        for _ in 0..100 {
            let x = param.to_vec()[0];
            param.set_grad(arr1(&[2.0 * x]));
            opt.step(&mut [param.clone()]);
            opt.zero_grad(&mut [param.clone()]);
        }

        assert!(param.to_vec()[0].abs() < 1e-3);
    }

    #[test]
    fn test_sgd_skips_params_without_grad() {
        let mut opt = SGD::new(0.1, 0.9);
        let param = Tensor::from_vec(vec![1.0, 2.0], true);

        opt.step(&mut [param.clone()]);

        assert_eq!(param.to_vec(), vec![1.0, 2.0]);
    }
}
