//! Frequency counting over a training sequence.
//!
//! Both estimators validate every symbol against the catalogue before
//! returning anything: a single unknown symbol fails the whole call.

use std::fmt::Display;
use std::hash::Hash;

use crate::catalogue::Catalogue;
use crate::matrix::Matrix;
use crate::Result;

/// Map a whole sequence to catalogue indices, failing on the first unknown
/// symbol.
pub fn indices<S>(catalogue: &Catalogue<S>, sequence: &[S]) -> Result<Vec<usize>>
where
    S: Clone + Eq + Hash + Display,
{
    sequence.iter().map(|s| catalogue.index_of(s)).collect()
}

/// Occurrence count of every state in `sequence`, indexed by catalogue
/// position.
pub fn estimate_initial<S>(catalogue: &Catalogue<S>, sequence: &[S]) -> Result<Vec<f64>>
where
    S: Clone + Eq + Hash + Display,
{
    let mut counts = vec![0.0; catalogue.len()];
    for index in indices(catalogue, sequence)? {
        counts[index] += 1.0;
    }
    Ok(counts)
}

/// One-hot count of the state that opens `sequence`.
///
/// The remaining symbols are still validated so a bad training melody is
/// rejected the same way under either estimate.
pub fn estimate_sequence_start<S>(catalogue: &Catalogue<S>, sequence: &[S]) -> Result<Vec<f64>>
where
    S: Clone + Eq + Hash + Display,
{
    let mut counts = vec![0.0; catalogue.len()];
    if let Some(&first) = indices(catalogue, sequence)?.first() {
        counts[first] += 1.0;
    }
    Ok(counts)
}

/// Count of each adjacent `(current, next)` pair in `sequence`.
pub fn estimate_transitions<S>(catalogue: &Catalogue<S>, sequence: &[S]) -> Result<Matrix>
where
    S: Clone + Eq + Hash + Display,
{
    let mut counts = Matrix::zeros(catalogue.len());
    let indices = indices(catalogue, sequence)?;
    for pair in indices.windows(2) {
        counts.add(pair[0], pair[1], 1.0);
    }
    Ok(counts)
}
