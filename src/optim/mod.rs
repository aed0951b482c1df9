//! Optimizers and optimizer selection

mod adamw;
mod optimizer;
mod sgd;

pub use adamw::AdamW;
pub use optimizer::Optimizer;
pub use sgd::SGD;

use crate::logging::RunLogger;

/// Built-in optimizer families the training loop can construct itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OptimizerKind {
    #[default]
    Sgd,
    AdamW,
}

impl OptimizerKind {
    /// Resolve a string selector. Unknown selectors fall back to SGD with
    /// a logged notice rather than failing the run.
    pub fn from_selector(selector: &str, logger: &RunLogger) -> Self {
        match selector {
            "sgd" => Self::Sgd,
            "adam" | "adamw" => Self::AdamW,
            other => {
                logger.info(&format!("unknown optimizer {other:?}, falling back to sgd"));
                Self::Sgd
            }
        }
    }

    /// Construct the optimizer with its family defaults at `learning_rate`.
    pub fn bind(self, learning_rate: f32) -> Box<dyn Optimizer> {
        match self {
            Self::Sgd => Box::new(SGD::new(learning_rate, 0.0)),
            Self::AdamW => Box::new(AdamW::default_params(learning_rate)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selector_known_names() {
        let (logger, _buffer) = RunLogger::in_memory();
        assert_eq!(OptimizerKind::from_selector("sgd", &logger), OptimizerKind::Sgd);
        assert_eq!(OptimizerKind::from_selector("adam", &logger), OptimizerKind::AdamW);
        assert_eq!(OptimizerKind::from_selector("adamw", &logger), OptimizerKind::AdamW);
    }

    #[test]
    fn test_selector_unknown_falls_back_to_sgd() {
        let (logger, buffer) = RunLogger::in_memory();
        assert_eq!(OptimizerKind::from_selector("lbfgs", &logger), OptimizerKind::Sgd);
        assert!(buffer.contents().contains("unknown optimizer \"lbfgs\""));
    }

    #[test]
    fn test_bind_uses_requested_rate() {
        let optimizer = OptimizerKind::Sgd.bind(0.05);
        assert!((optimizer.lr() - 0.05).abs() < 1e-9);
        let optimizer = OptimizerKind::AdamW.bind(0.001);
        assert!((optimizer.lr() - 0.001).abs() < 1e-9);
    }
}
