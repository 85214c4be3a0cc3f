use std::collections::HashMap;
use std::fmt::Display;
use std::hash::Hash;

use crate::state::State;
use crate::{Error, Result};

/// The fixed, ordered universe of states a chain can occupy.
///
/// Holds the states in their given order together with a reverse index, so
/// `index_of` and `symbol_at` are inverses over `[0, len)`. The catalogue
/// never changes after construction.
#[derive(Debug, Clone)]
pub struct Catalogue<S = State> {
    states: Vec<S>,
    index: HashMap<S, usize>,
}

impl<S> Catalogue<S>
where
    S: Clone + Eq + Hash + Display,
{
    /// Build a catalogue from duplicate-free states.
    ///
    /// A repeated state is a caller error and fails with
    /// [`Error::DuplicateState`], naming both positions.
    pub fn new(states: Vec<S>) -> Result<Self> {
        let mut index = HashMap::with_capacity(states.len());
        for (position, state) in states.iter().enumerate() {
            if let Some(&first) = index.get(state) {
                return Err(Error::DuplicateState {
                    symbol: state.to_string(),
                    first,
                    second: position,
                });
            }
            index.insert(state.clone(), position);
        }
        Ok(Self { states, index })
    }

    /// Build a catalogue from states that may repeat, keeping the first
    /// occurrence of each.
    pub fn dedup<I>(states: I) -> Self
    where
        I: IntoIterator<Item = S>,
    {
        let mut unique = Vec::new();
        let mut index = HashMap::new();
        for state in states {
            if !index.contains_key(&state) {
                index.insert(state.clone(), unique.len());
                unique.push(state);
            }
        }
        Self {
            states: unique,
            index,
        }
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Dense index of `state`, or [`Error::UnknownSymbol`].
    pub fn index_of(&self, state: &S) -> Result<usize> {
        self.index
            .get(state)
            .copied()
            .ok_or_else(|| Error::UnknownSymbol {
                symbol: state.to_string(),
            })
    }

    pub fn symbol_at(&self, index: usize) -> Option<&S> {
        self.states.get(index)
    }

    pub fn contains(&self, state: &S) -> bool {
        self.index.contains_key(state)
    }

    pub fn states(&self) -> &[S] {
        &self.states
    }

    pub fn iter(&self) -> std::slice::Iter<'_, S> {
        self.states.iter()
    }
}

impl<'a, S> IntoIterator for &'a Catalogue<S> {
    type Item = &'a S;
    type IntoIter = std::slice::Iter<'a, S>;

    fn into_iter(self) -> Self::IntoIter {
        self.states.iter()
    }
}
