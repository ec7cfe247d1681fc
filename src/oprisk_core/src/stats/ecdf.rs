//! Empirical distribution functions.
use itertools::Itertools;
use serde::{Deserialize, Serialize};

/// Empirical cumulative distribution function of a sample.
///
/// The function steps up by `1/n` at each of the `n` sorted values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ecdf {
    sorted: Vec<f64>,
}

impl Ecdf {
    /// Build the ECDF of the finite values of a sample.
    pub fn new(sample: &[f64]) -> Self {
        let mut sorted = sample
            .iter()
            .filter(|x| x.is_finite())
            .copied()
            .collect_vec();
        sorted.sort_by(|a, b| a.total_cmp(b));
        Ecdf { sorted }
    }

    /// Number of values in the sample.
    pub fn len(&self) -> usize {
        self.sorted.len()
    }

    /// Is the sample empty.
    pub fn is_empty(&self) -> bool {
        self.sorted.is_empty()
    }

    /// Fraction of the sample less than or equal to `x`, 0.0 for an empty sample.
    pub fn eval(&self, x: f64) -> f64 {
        if self.sorted.is_empty() {
            return 0.0;
        }
        let count = self.sorted.partition_point(|v| *v <= x);
        count as f64 / self.sorted.len() as f64
    }

    /// The step points of the function, sorted values paired with `i/n`.
    ///
    /// Repeated values appear once per occurrence, as needed for drawing the steps.
    pub fn points(&self) -> Vec<(f64, f64)> {
        let n = self.sorted.len() as f64;
        self.sorted
            .iter()
            .enumerate()
            .map(|(idx, x)| (*x, (idx + 1) as f64 / n))
            .collect()
    }
}
