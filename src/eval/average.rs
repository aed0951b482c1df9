//! Averaging strategies for multi-class metrics

/// How per-class scores are aggregated into a single number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Average {
    /// Unweighted mean over classes
    Macro,
    /// Computed from global true/false positive counts
    Micro,
    /// Mean over classes weighted by support
    Weighted,
}
