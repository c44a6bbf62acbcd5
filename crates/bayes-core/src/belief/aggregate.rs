//! Folding of independent observations into one combined reweighting.
//!
//! Likelihoods of conditionally independent observations multiply. The product is kept as
//! a per-class sum of natural logarithms so that long event sequences (documents with
//! thousands of words) do not underflow before the distribution renormalizes.

use super::error::{BeliefError, Result};
use super::label::{Label, Weights};

/// Accumulates per-class likelihoods for a fixed class order.
#[derive(Debug, Clone)]
pub struct EventAggregator<'a> {
    labels: &'a [Label],
    log_likelihoods: Vec<f64>,
    observations: usize,
}

impl<'a> EventAggregator<'a> {
    pub fn new(labels: &'a [Label]) -> Self {
        Self {
            labels,
            log_likelihoods: vec![0.0; labels.len()],
            observations: 0,
        }
    }

    pub fn labels(&self) -> &'a [Label] {
        self.labels
    }

    /// Number of observations folded so far.
    pub fn observations(&self) -> usize {
        self.observations
    }

    /// Folds one likelihood specification, aligned positionally or by label.
    pub fn observe(&mut self, likelihoods: &Weights) -> Result<()> {
        let aligned = likelihoods.align(self.labels)?;
        for (acc, likelihood) in self.log_likelihoods.iter_mut().zip(aligned) {
            *acc += likelihood.ln();
        }
        self.observations += 1;
        Ok(())
    }

    /// Folds one observation already expressed as per-class log-likelihoods.
    ///
    /// `-inf` marks an observation impossible under that class. `NaN` and `+inf` are
    /// rejected.
    pub fn observe_log(&mut self, log_likelihoods: &[f64]) -> Result<()> {
        if log_likelihoods.len() != self.labels.len() {
            return Err(BeliefError::malformed(format!(
                "expected {} log-likelihoods, got {}",
                self.labels.len(),
                log_likelihoods.len()
            )));
        }
        if let Some(index) = log_likelihoods
            .iter()
            .position(|value| value.is_nan() || *value == f64::INFINITY)
        {
            return Err(BeliefError::malformed(format!(
                "log-likelihood {} for class '{}' is not usable",
                log_likelihoods[index], self.labels[index]
            )));
        }

        for (acc, value) in self.log_likelihoods.iter_mut().zip(log_likelihoods) {
            *acc += value;
        }
        self.observations += 1;
        Ok(())
    }

    pub fn finish(self) -> CombinedEvidence {
        CombinedEvidence {
            labels: self.labels.to_vec(),
            log_likelihoods: self.log_likelihoods,
            observations: self.observations,
        }
    }
}

/// Net reweighting of a sequence of observations, ready to apply in one update.
///
/// Carries the class order it was folded against; it only applies to a distribution with
/// the same order.
#[derive(Debug, Clone, PartialEq)]
pub struct CombinedEvidence {
    labels: Vec<Label>,
    log_likelihoods: Vec<f64>,
    observations: usize,
}

impl CombinedEvidence {
    pub fn len(&self) -> usize {
        self.log_likelihoods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.log_likelihoods.is_empty()
    }

    pub fn observations(&self) -> usize {
        self.observations
    }

    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    pub fn log_likelihoods(&self) -> &[f64] {
        &self.log_likelihoods
    }

    /// Linear likelihoods rescaled so the largest is 1.0.
    ///
    /// Proportional to the raw product, which is all an update depends on.
    pub fn relative_likelihoods(&self) -> Vec<f64> {
        let max = self
            .log_likelihoods
            .iter()
            .copied()
            .fold(f64::NEG_INFINITY, f64::max);
        if max == f64::NEG_INFINITY {
            return vec![0.0; self.log_likelihoods.len()];
        }
        self.log_likelihoods
            .iter()
            .map(|value| (value - max).exp())
            .collect()
    }
}
