//! Keyed metric series collected over a run

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Append-only store of per-epoch metric series.
///
/// Keys are registered up front; appending to an unregistered key is an
/// error so a typo in a metric name surfaces on the first epoch instead of
/// silently growing a parallel series.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultSeries {
    series: BTreeMap<String, Vec<f64>>,
}

impl ResultSeries {
    /// Create a store tracking exactly `keys`.
    pub fn with_keys<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            series: keys.into_iter().map(|k| (k.into(), Vec::new())).collect(),
        }
    }

    /// Append one value to a registered series.
    pub fn append(&mut self, key: &str, value: f64) -> Result<()> {
        match self.series.get_mut(key) {
            Some(values) => {
                values.push(value);
                Ok(())
            }
            None => Err(Error::UntrackedMetric(key.to_string())),
        }
    }

    /// The values recorded under `key`, if the key is registered.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&[f64]> {
        self.series.get(key).map(Vec::as_slice)
    }

    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.series.contains_key(key)
    }

    /// Registered keys in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.series.keys().map(String::as_str)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}
