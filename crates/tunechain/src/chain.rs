use std::fmt::{self, Display};
use std::hash::Hash;
use std::str::FromStr;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::catalogue::Catalogue;
use crate::estimate;
use crate::matrix::Matrix;
use crate::normalize::{normalize_matrix, normalize_vector};
use crate::sampler::Sampler;
use crate::state::State;
use crate::{Error, Result};

/// How training turns the melody into starting-state weights.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InitialEstimate {
    /// Every occurrence of a state counts toward its starting weight.
    #[default]
    Frequency,
    /// Only the state that opens the training melody can start a walk.
    SequenceStart,
}

impl Display for InitialEstimate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InitialEstimate::Frequency => write!(f, "frequency"),
            InitialEstimate::SequenceStart => write!(f, "sequence-start"),
        }
    }
}

impl FromStr for InitialEstimate {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "frequency" => Ok(InitialEstimate::Frequency),
            "sequence-start" | "sequence_start" | "start" => Ok(InitialEstimate::SequenceStart),
            other => Err(format!(
                "unknown initial estimate '{other}' (expected frequency or sequence-start)"
            )),
        }
    }
}

#[derive(Debug, Clone)]
struct Distributions {
    initial: Vec<f64>,
    transitions: Matrix,
}

#[derive(Debug, Clone)]
enum Training {
    Uninitialized,
    Trained(Distributions),
}

impl Training {
    fn distributions(&self) -> Result<&Distributions> {
        match self {
            Training::Trained(d) => Ok(d),
            Training::Uninitialized => Err(Error::NotTrained),
        }
    }
}

/// Inspection snapshot of a trained chain.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChainSummary<S = State> {
    pub states: usize,
    /// States with a non-zero starting weight.
    pub start_states: usize,
    /// Non-zero cells of the transition matrix.
    pub transitions: usize,
    /// States with no observed successor, in catalogue order.
    pub absorbing: Vec<S>,
}

/// First-order Markov chain over a fixed state catalogue.
///
/// The chain starts untrained. [`train`](Self::train) derives the initial
/// distribution and transition matrix from one melody, replacing anything a
/// previous call produced. Generation only advances the RNG and never
/// touches the trained distributions.
#[derive(Debug, Clone)]
pub struct MarkovChain<S = State, R = StdRng> {
    catalogue: Catalogue<S>,
    initial_estimate: InitialEstimate,
    training: Training,
    rng: R,
}

impl<S> MarkovChain<S, StdRng>
where
    S: Clone + Eq + Hash + Display,
{
    /// Chain with a deterministic RNG: equal seeds give equal melodies.
    pub fn seeded(catalogue: Catalogue<S>, seed: u64) -> Self {
        Self::new(catalogue, StdRng::seed_from_u64(seed))
    }

    pub fn from_os_rng(catalogue: Catalogue<S>) -> Self {
        Self::new(catalogue, StdRng::from_os_rng())
    }
}

impl<S, R> MarkovChain<S, R>
where
    S: Clone + Eq + Hash + Display,
    R: Rng,
{
    pub fn new(catalogue: Catalogue<S>, rng: R) -> Self {
        Self {
            catalogue,
            initial_estimate: InitialEstimate::default(),
            training: Training::Uninitialized,
            rng,
        }
    }

    pub fn with_initial_estimate(mut self, estimate: InitialEstimate) -> Self {
        self.initial_estimate = estimate;
        self
    }

    pub fn initial_estimate(&self) -> InitialEstimate {
        self.initial_estimate
    }

    pub fn catalogue(&self) -> &Catalogue<S> {
        &self.catalogue
    }

    pub fn is_trained(&self) -> bool {
        matches!(self.training, Training::Trained(_))
    }

    /// Normalized starting weights, once trained.
    pub fn initial_distribution(&self) -> Option<&[f64]> {
        self.training.distributions().ok().map(|d| d.initial.as_slice())
    }

    /// Row-stochastic transition matrix, once trained.
    pub fn transition_matrix(&self) -> Option<&Matrix> {
        self.training.distributions().ok().map(|d| &d.transitions)
    }

    /// Learn both distributions from `sequence`.
    ///
    /// Every symbol must be in the catalogue. On error the chain keeps
    /// whatever it held before the call.
    pub fn train(&mut self, sequence: &[S]) -> Result<()> {
        let initial_counts = match self.initial_estimate {
            InitialEstimate::Frequency => estimate::estimate_initial(&self.catalogue, sequence)?,
            InitialEstimate::SequenceStart => {
                estimate::estimate_sequence_start(&self.catalogue, sequence)?
            }
        };
        let transition_counts = estimate::estimate_transitions(&self.catalogue, sequence)?;

        let distributions = Distributions {
            initial: normalize_vector(&initial_counts),
            transitions: normalize_matrix(&transition_counts),
        };

        let absorbing = (0..self.catalogue.len())
            .filter(|&i| distributions.transitions.row_sum(i) == Some(0.0))
            .count();
        debug!(
            notes = sequence.len(),
            states = self.catalogue.len(),
            absorbing,
            estimate = %self.initial_estimate,
            "trained markov chain"
        );

        self.training = Training::Trained(distributions);
        Ok(())
    }

    /// Whether `state` was ever followed by another state in training.
    pub fn has_successor(&self, state: &S) -> Result<bool> {
        let d = self.training.distributions()?;
        let index = self.catalogue.index_of(state)?;
        Ok(Sampler::new(&d.initial, &d.transitions).has_successor(index))
    }

    /// Draw a state from the initial distribution.
    pub fn generate_starting_symbol(&mut self) -> Result<S> {
        let d = self.training.distributions()?;
        let index = Sampler::new(&d.initial, &d.transitions).start_index(&mut self.rng)?;
        Ok(self.catalogue.states()[index].clone())
    }

    /// Draw the state that follows `current`, restarting from the initial
    /// distribution when `current` has no observed successor.
    pub fn generate_next(&mut self, current: &S) -> Result<S> {
        let d = self.training.distributions()?;
        let from = self.catalogue.index_of(current)?;
        let index = Sampler::new(&d.initial, &d.transitions).next_index(from, &mut self.rng)?;
        Ok(self.catalogue.states()[index].clone())
    }

    /// A melody of exactly `length` states. `0` yields an empty melody.
    pub fn generate(&mut self, length: usize) -> Result<Vec<S>> {
        if length == 0 {
            return Ok(Vec::new());
        }
        self.walk().take(length).collect()
    }

    /// Lazy, unbounded walk over the chain.
    pub fn walk(&mut self) -> Walk<'_, S, R> {
        Walk {
            chain: self,
            previous: None,
            failed: false,
        }
    }

    pub fn summary(&self) -> Option<ChainSummary<S>> {
        let d = self.training.distributions().ok()?;
        let absorbing = self
            .catalogue
            .iter()
            .enumerate()
            .filter(|(i, _)| d.transitions.row_sum(*i) == Some(0.0))
            .map(|(_, s)| s.clone())
            .collect();
        Some(ChainSummary {
            states: self.catalogue.len(),
            start_states: d.initial.iter().filter(|&&p| p > 0.0).count(),
            transitions: d
                .transitions
                .rows()
                .map(|row| row.iter().filter(|&&p| p > 0.0).count())
                .sum(),
            absorbing,
        })
    }
}

/// Iterator over successive states of a chain walk.
///
/// The first item is drawn from the initial distribution, each later item
/// from the previous item's row. After an error the walk ends.
pub struct Walk<'a, S, R> {
    chain: &'a mut MarkovChain<S, R>,
    previous: Option<S>,
    failed: bool,
}

impl<S, R> Iterator for Walk<'_, S, R>
where
    S: Clone + Eq + Hash + Display,
    R: Rng,
{
    type Item = Result<S>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        let step = match &self.previous {
            None => self.chain.generate_starting_symbol(),
            Some(previous) => self.chain.generate_next(previous),
        };
        match &step {
            Ok(state) => self.previous = Some(state.clone()),
            Err(_) => self.failed = true,
        }
        Some(step)
    }
}
