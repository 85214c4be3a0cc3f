use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};

use crate::{Error, Result};

/// Note duration in quarter lengths (1.0 = quarter note, 0.5 = eighth).
///
/// Always finite and strictly positive, which makes bitwise equality and
/// hashing agree with numeric equality.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct QuarterLength(f64);

impl QuarterLength {
    pub fn new(value: f64) -> Result<Self> {
        if value.is_finite() && value > 0.0 {
            Ok(Self(value))
        } else {
            Err(Error::InvalidDuration(value))
        }
    }

    pub fn get(self) -> f64 {
        self.0
    }
}

impl Eq for QuarterLength {}

impl Hash for QuarterLength {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.to_bits().hash(state);
    }
}

impl TryFrom<f64> for QuarterLength {
    type Error = Error;

    fn try_from(value: f64) -> Result<Self> {
        Self::new(value)
    }
}

impl From<QuarterLength> for f64 {
    fn from(value: QuarterLength) -> Self {
        value.0
    }
}

impl fmt::Display for QuarterLength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One symbol of a melody: a pitch label paired with a duration.
///
/// Two states are equal only when both the pitch label and the duration
/// match, so `C4/1` and `C4/0.5` are distinct states of the chain.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct State {
    /// Pitch name with octave, e.g. "C4", "F#5", "B-3".
    pub pitch: String,
    pub duration: QuarterLength,
}

impl State {
    pub fn new(pitch: impl Into<String>, duration: f64) -> Result<Self> {
        Ok(Self {
            pitch: pitch.into(),
            duration: QuarterLength::new(duration)?,
        })
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.pitch, self.duration)
    }
}
