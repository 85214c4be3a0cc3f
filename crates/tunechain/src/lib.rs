//! First-order Markov chain melody engine.
//!
//! A [`MarkovChain`] is built over a fixed [`Catalogue`] of states, trained
//! once (or re-trained from scratch) on an observed melody, and then walked
//! to produce new melodies.
//!
//! # Example
//!
//! ```
//! use tunechain::{Catalogue, MarkovChain, State};
//!
//! let a = State::new("A4", 1.0).unwrap();
//! let b = State::new("B4", 1.0).unwrap();
//! let catalogue = Catalogue::new(vec![a.clone(), b.clone()]).unwrap();
//!
//! let mut chain = MarkovChain::seeded(catalogue, 7);
//! chain.train(&[a.clone(), b.clone(), a.clone(), b.clone()]).unwrap();
//!
//! let melody = chain.generate(8).unwrap();
//! assert_eq!(melody.len(), 8);
//! ```

pub mod catalogue;
pub mod chain;
pub mod estimate;
pub mod matrix;
pub mod normalize;
pub mod sampler;
pub mod state;

pub use catalogue::Catalogue;
pub use chain::{ChainSummary, InitialEstimate, MarkovChain, Walk};
pub use matrix::Matrix;
pub use state::{QuarterLength, State};

/// Errors from catalogue construction, training, and sampling.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    #[error("unknown symbol {symbol}: not in the state catalogue")]
    UnknownSymbol { symbol: String },

    #[error("cannot sample from a distribution whose weights sum to zero")]
    EmptyDistribution,

    #[error("model has not been trained")]
    NotTrained,

    #[error("duplicate state {symbol} at catalogue positions {first} and {second}")]
    DuplicateState {
        symbol: String,
        first: usize,
        second: usize,
    },

    #[error("invalid duration {0}: must be finite and greater than zero")]
    InvalidDuration(f64),
}

pub type Result<T> = std::result::Result<T, Error>;
