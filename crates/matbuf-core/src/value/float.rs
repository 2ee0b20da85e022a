use derive_more::Display;
use serde::{Deserialize, Serialize};
use std::{
    cmp::Ordering,
    hash::{Hash, Hasher},
};
use thiserror::Error as ThisError;

///
/// Float64
///
/// Finite f64 that can sit inside an identity key. Equality, ordering and
/// hashing all go through `ordered_bits`, and -0.0 is stored as 0.0.
///

#[derive(Clone, Copy, Debug, Deserialize, Display, Serialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Float64(f64);

impl Float64 {
    #[must_use]
    pub fn try_new(v: f64) -> Option<Self> {
        // adding +0.0 turns -0.0 into 0.0 and leaves every other value alone
        v.is_finite().then(|| Self(v + 0.0))
    }

    #[must_use]
    pub const fn get(self) -> f64 {
        self.0
    }

    // sign-flipped bit pattern whose unsigned order is the numeric order
    const fn ordered_bits(self) -> u64 {
        let bits = self.0.to_bits();
        if bits >> 63 == 0 {
            bits | (1 << 63)
        } else {
            !bits
        }
    }
}

impl Eq for Float64 {}

impl PartialEq for Float64 {
    fn eq(&self, other: &Self) -> bool {
        self.ordered_bits() == other.ordered_bits()
    }
}

impl Ord for Float64 {
    fn cmp(&self, other: &Self) -> Ordering {
        self.ordered_bits().cmp(&other.ordered_bits())
    }
}

impl PartialOrd for Float64 {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Hash for Float64 {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.ordered_bits().hash(state);
    }
}

///
/// NonFiniteFloat
///

#[derive(Debug, ThisError)]
#[error("float64 key values must be finite, got {0}")]
pub struct NonFiniteFloat(pub f64);

impl TryFrom<f64> for Float64 {
    type Error = NonFiniteFloat;

    fn try_from(v: f64) -> Result<Self, Self::Error> {
        Self::try_new(v).ok_or(NonFiniteFloat(v))
    }
}

impl From<Float64> for f64 {
    fn from(v: Float64) -> Self {
        v.0
    }
}
