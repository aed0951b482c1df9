//! Model size and inference latency measurements for the final report

use crate::autograd::{no_grad, Tensor};
use crate::model::{Mode, Model};
use std::time::Instant;

const BYTES_PER_PARAM: usize = 4;

/// Total parameter storage in megabytes, assuming f32 parameters.
#[must_use]
pub fn model_size_mb(model: &dyn Model) -> f64 {
    let params: usize = model.parameters().iter().map(Tensor::len).sum();
    (params * BYTES_PER_PARAM) as f64 / (1024.0 * 1024.0)
}

/// Time single-sample forward passes and return (mean, std) in
/// milliseconds.
///
/// Runs `warmup` untimed passes first, then `iterations` timed ones, all
/// under eval mode with gradients disabled. The model's mode is restored
/// afterwards.
pub fn measure_latency(
    model: &mut dyn Model,
    sample: &Tensor,
    warmup: usize,
    iterations: usize,
) -> (f64, f64) {
    if iterations == 0 {
        return (0.0, 0.0);
    }

    let previous = model.mode();
    model.set_mode(Mode::Eval);

    let timings = {
        let _guard = no_grad();

        for _ in 0..warmup {
            let _ = model.forward(sample);
        }

        let mut timings = Vec::with_capacity(iterations);
        for _ in 0..iterations {
            let start = Instant::now();
            let _ = model.forward(sample);
            timings.push(start.elapsed().as_secs_f64() * 1000.0);
        }
        timings
    };

    model.set_mode(previous);

    let mean = timings.iter().sum::<f64>() / timings.len() as f64;
    let variance =
        timings.iter().map(|t| (t - mean).powi(2)).sum::<f64>() / timings.len() as f64;
    (mean, variance.sqrt())
}
