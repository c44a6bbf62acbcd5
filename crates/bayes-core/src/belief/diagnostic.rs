//! Binary tests (diagnostics) whose outcome selects one of two likelihood vectors.

use super::error::{BeliefError, Result};
use super::label::Weights;

/// Per-class likelihoods of a positive and of a negative test outcome.
#[derive(Debug, Clone, PartialEq)]
pub struct TestSpec {
    positive: Weights,
    negative: Weights,
}

impl TestSpec {
    pub fn new(positive: impl Into<Weights>, negative: impl Into<Weights>) -> Self {
        Self {
            positive: positive.into(),
            negative: negative.into(),
        }
    }

    /// Builds a test from the per-class rate of positive outcomes.
    ///
    /// A negative outcome has likelihood `1 - rate` under each class.
    pub fn from_rates(rates: impl Into<Weights>) -> Result<Self> {
        let positive = rates.into();
        positive.validate()?;
        if let Some(rate) = positive.values().find(|rate| *rate > 1.0) {
            return Err(BeliefError::malformed(format!(
                "rate {rate} is outside [0, 1]"
            )));
        }
        let negative = positive.map_values(|rate| 1.0 - rate);
        Ok(Self { positive, negative })
    }

    /// Builds a test from positive-outcome odds; a negative outcome uses the inverted odds.
    ///
    /// Inversion takes the reciprocal of every entry. When any entry is zero, zeros become
    /// 1 and every other entry becomes 0.
    pub fn from_odds(odds: impl Into<Weights>) -> Result<Self> {
        let positive = odds.into();
        positive.validate()?;
        let negative = invert(&positive);
        Ok(Self { positive, negative })
    }

    pub fn positive(&self) -> &Weights {
        &self.positive
    }

    pub fn negative(&self) -> &Weights {
        &self.negative
    }

    /// Likelihoods matching an observed outcome.
    pub fn branch(&self, result: bool) -> &Weights {
        if result {
            &self.positive
        } else {
            &self.negative
        }
    }
}

fn invert(odds: &Weights) -> Weights {
    if odds.values().any(|value| value == 0.0) {
        odds.map_values(|value| if value == 0.0 { 1.0 } else { 0.0 })
    } else {
        odds.map_values(|value| 1.0 / value)
    }
}
