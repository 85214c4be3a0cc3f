//! Weighted index draws over trained distributions.
//!
//! Draws use a cumulative distribution and a single uniform value in
//! `[0, 1)` from the caller's RNG, so a seeded RNG gives reproducible walks.

use rand::Rng;
use tracing::trace;

use crate::matrix::Matrix;
use crate::{Error, Result};

/// Pick the index whose cumulative weight first exceeds `u * total`.
///
/// `u` must lie in `[0, 1)`. Zero-weight entries are never chosen. Returns
/// `None` when the weights are empty or do not sum to a positive value.
pub fn pick_index(weights: &[f64], u: f64) -> Option<usize> {
    let total: f64 = weights.iter().filter(|w| w.is_finite() && **w > 0.0).sum();
    if total <= 0.0 {
        return None;
    }

    let target = u * total;
    let mut cumulative = 0.0;
    let mut last_positive = None;
    for (i, &w) in weights.iter().enumerate() {
        if !(w.is_finite() && w > 0.0) {
            continue;
        }
        cumulative += w;
        last_positive = Some(i);
        if cumulative > target {
            return Some(i);
        }
    }
    // rounding can leave the final cumulative a hair under target
    last_positive
}

/// Draw an index from `weights` using `rng`.
pub fn sample_index<R: Rng>(weights: &[f64], rng: &mut R) -> Result<usize> {
    let u: f64 = rng.random();
    pick_index(weights, u).ok_or(Error::EmptyDistribution)
}

/// Borrowed view over a trained chain's distributions.
#[derive(Debug, Clone, Copy)]
pub struct Sampler<'a> {
    initial: &'a [f64],
    transitions: &'a Matrix,
}

impl<'a> Sampler<'a> {
    pub fn new(initial: &'a [f64], transitions: &'a Matrix) -> Self {
        Self {
            initial,
            transitions,
        }
    }

    /// Draw a starting index from the initial distribution.
    pub fn start_index<R: Rng>(&self, rng: &mut R) -> Result<usize> {
        sample_index(self.initial, rng)
    }

    /// True when row `index` has any observed outgoing transition.
    pub fn has_successor(&self, index: usize) -> bool {
        self.transitions.row_sum(index).is_some_and(|sum| sum > 0.0)
    }

    /// Draw the index that follows `current`.
    ///
    /// A state with no observed successor restarts from the initial
    /// distribution instead of ending the walk.
    pub fn next_index<R: Rng>(&self, current: usize, rng: &mut R) -> Result<usize> {
        match self.transitions.row(current) {
            Some(row) if self.has_successor(current) => sample_index(row, rng),
            _ => {
                trace!(index = current, "no observed successor, restarting from initial distribution");
                self.start_index(rng)
            }
        }
    }
}
