//! Normalized probability mass over a fixed, ordered set of class labels.

use super::aggregate::{CombinedEvidence, EventAggregator};
use super::diagnostic::TestSpec;
use super::error::{BeliefError, Result};
use super::label::{Label, Weights};
use super::odds::OddsTable;
use super::telemetry::log_update;
use core::fmt;
use serde::ser::{Serialize, SerializeSeq, Serializer};
use std::borrow::Borrow;
use std::collections::{BTreeMap, HashSet};
use std::fmt::Debug;
use std::hash::Hash;

/// Belief over mutually exclusive classes.
///
/// Probabilities always sum to 1.0. The label set is fixed at construction; updates only
/// reweight existing classes. `update*` methods mutate in place and leave the
/// distribution untouched when they fail. [`BeliefDistribution::updated`] returns a new
/// instance instead.
#[derive(Debug, Clone, PartialEq)]
pub struct BeliefDistribution {
    labels: Vec<Label>,
    probs: Vec<f64>,
}

impl BeliefDistribution {
    /// Builds a distribution from any weight shape, normalizing the weights.
    pub fn new(weights: impl Into<Weights>) -> Result<Self> {
        let (labels, raw) = weights.into().into_columns()?;
        let probs = normalize(&raw, "prior weights")?;
        Ok(Self { labels, probs })
    }

    /// Unlabeled weights; classes are labeled `0..n`.
    pub fn from_weights(weights: impl IntoIterator<Item = f64>) -> Result<Self> {
        Self::new(Weights::Unlabeled(weights.into_iter().collect()))
    }

    /// Weights named by an external label list, which also fixes the class order.
    ///
    /// Positional weights are matched to `labels` one to one. Labeled or mapped weights
    /// are reordered to follow `labels` and must cover exactly those labels.
    pub fn with_labels<L: Into<Label>>(
        weights: impl Into<Weights>,
        labels: impl IntoIterator<Item = L>,
    ) -> Result<Self> {
        let labels: Vec<Label> = labels.into_iter().map(Into::into).collect();
        let mut seen = HashSet::with_capacity(labels.len());
        if let Some(duplicate) = labels.iter().find(|label| !seen.insert(*label)) {
            return Err(BeliefError::DuplicateLabel {
                label: duplicate.clone(),
            });
        }
        let raw = weights.into().align(&labels)?;
        let probs = normalize(&raw, "prior weights")?;
        Ok(Self { labels, probs })
    }

    /// `(label, weight)` pairs, kept in the given order.
    pub fn from_pairs<L: Into<Label>>(pairs: impl IntoIterator<Item = (L, f64)>) -> Result<Self> {
        Self::new(Weights::Labeled(
            pairs
                .into_iter()
                .map(|(label, weight)| (label.into(), weight))
                .collect(),
        ))
    }

    /// Label to weight mapping; classes are ordered by label.
    pub fn from_map<L: Into<Label>>(map: impl IntoIterator<Item = (L, f64)>) -> Result<Self> {
        Self::new(Weights::Mapped(
            map.into_iter()
                .map(|(label, weight)| (label.into(), weight))
                .collect::<BTreeMap<_, _>>(),
        ))
    }

    /// Equal mass on every label, in the given order.
    pub fn uniform<L: Into<Label>>(labels: impl IntoIterator<Item = L>) -> Result<Self> {
        Self::from_pairs(labels.into_iter().map(|label| (label, 1.0)))
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    pub fn probabilities(&self) -> &[f64] {
        &self.probs
    }

    /// `(label, probability)` pairs in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = (&Label, f64)> + '_ {
        self.labels.iter().zip(self.probs.iter().copied())
    }

    fn index_of(&self, label: &Label) -> Result<usize> {
        self.labels
            .iter()
            .position(|candidate| candidate == label)
            .ok_or_else(|| BeliefError::UnknownLabel {
                label: label.clone(),
            })
    }

    /// Multiplies every class by its likelihood and renormalizes.
    ///
    /// Goes through the same log-space fold as the event updates, so a tiny but positive
    /// posterior mass survives where a linear product would underflow.
    pub fn update(&mut self, likelihoods: impl Into<Weights>) -> Result<&mut Self> {
        let mut aggregator = EventAggregator::new(&self.labels);
        aggregator.observe(&likelihoods.into())?;
        let evidence = aggregator.finish();
        self.apply_evidence(&evidence)?;
        log_update("update", self, 1, 0);
        Ok(self)
    }

    /// Like [`update`](Self::update) but returns the posterior as a new distribution.
    pub fn updated(&self, likelihoods: impl Into<Weights>) -> Result<Self> {
        let mut next = self.clone();
        next.update(likelihoods)?;
        Ok(next)
    }

    /// Applies folded evidence in a single renormalization.
    ///
    /// The evidence must have been folded against this distribution's class order.
    pub fn apply_evidence(&mut self, evidence: &CombinedEvidence) -> Result<&mut Self> {
        if evidence.labels() != self.labels.as_slice() {
            return Err(BeliefError::malformed(format!(
                "evidence folded over classes {:?}, distribution has {:?}",
                evidence.labels(),
                self.labels
            )));
        }
        if evidence.observations() == 0 {
            return Ok(self);
        }

        let log_posterior: Vec<f64> = self
            .probs
            .iter()
            .zip(evidence.log_likelihoods())
            .map(|(prior, log_likelihood)| {
                if *prior == 0.0 {
                    f64::NEG_INFINITY
                } else {
                    prior.ln() + log_likelihood
                }
            })
            .collect();
        let max = log_posterior
            .iter()
            .copied()
            .fold(f64::NEG_INFINITY, f64::max);
        if max == f64::NEG_INFINITY {
            return Err(BeliefError::DegenerateDistribution {
                context: "posterior weights",
            });
        }

        let shifted: Vec<f64> = log_posterior
            .iter()
            .map(|value| (value - max).exp())
            .collect();
        self.probs = normalize(&shifted, "posterior weights")?;
        Ok(self)
    }

    /// Treats every event as independent evidence and applies their combined likelihood.
    ///
    /// Events may repeat. Fails with [`BeliefError::UnknownEvent`] if any event is missing
    /// from `odds`; nothing is applied in that case.
    pub fn update_from_events<E, I>(&mut self, events: I, odds: &OddsTable<E>) -> Result<&mut Self>
    where
        E: Eq + Hash + Debug,
        I: IntoIterator,
        I::Item: Borrow<E>,
    {
        let mut aggregator = EventAggregator::new(&self.labels);
        for event in events {
            let event: &E = event.borrow();
            let likelihoods = odds
                .get(event)
                .ok_or_else(|| BeliefError::unknown_event(event))?;
            aggregator.observe(likelihoods)?;
        }
        let evidence = aggregator.finish();
        self.apply_evidence(&evidence)?;
        log_update("events", self, evidence.observations(), 0);
        Ok(self)
    }

    /// Like [`update_from_events`](Self::update_from_events) but skips events missing
    /// from `odds`. Returns how many events were skipped.
    pub fn update_from_known_events<E, I>(&mut self, events: I, odds: &OddsTable<E>) -> Result<usize>
    where
        E: Eq + Hash,
        I: IntoIterator,
        I::Item: Borrow<E>,
    {
        let mut aggregator = EventAggregator::new(&self.labels);
        let mut skipped = 0;
        for event in events {
            let event: &E = event.borrow();
            match odds.get(event) {
                Some(likelihoods) => aggregator.observe(likelihoods)?,
                None => skipped += 1,
            }
        }
        let evidence = aggregator.finish();
        self.apply_evidence(&evidence)?;
        log_update("known_events", self, evidence.observations(), skipped);
        Ok(skipped)
    }

    /// Pairs every test outcome with its spec and applies the combined likelihood.
    pub fn update_from_tests(&mut self, results: &[bool], specs: &[TestSpec]) -> Result<&mut Self> {
        if results.len() != specs.len() {
            return Err(BeliefError::malformed(format!(
                "{} test results for {} test specs",
                results.len(),
                specs.len()
            )));
        }
        self.apply_tests(results.iter().copied().zip(specs))
    }

    /// Applies the same test spec to every outcome in `results`.
    pub fn update_from_repeated_test(&mut self, results: &[bool], spec: &TestSpec) -> Result<&mut Self> {
        self.apply_tests(results.iter().map(|result| (*result, spec)))
    }

    fn apply_tests<'a>(
        &mut self,
        outcomes: impl Iterator<Item = (bool, &'a TestSpec)>,
    ) -> Result<&mut Self> {
        let mut aggregator = EventAggregator::new(&self.labels);
        for (result, spec) in outcomes {
            aggregator.observe(spec.branch(result))?;
        }
        let evidence = aggregator.finish();
        self.apply_evidence(&evidence)?;
        log_update("tests", self, evidence.observations(), 0);
        Ok(self)
    }

    fn leader(&self) -> usize {
        let mut best = 0;
        for (index, prob) in self.probs.iter().enumerate().skip(1) {
            if *prob > self.probs[best] {
                best = index;
            }
        }
        best
    }

    /// Label with the highest probability; ties go to the earliest label.
    pub fn most_likely(&self) -> &Label {
        &self.labels[self.leader()]
    }

    /// Most likely label if its probability exceeds `cutoff`.
    pub fn most_likely_above(&self, cutoff: f64) -> Option<&Label> {
        let best = self.leader();
        (self.probs[best] > cutoff).then(|| &self.labels[best])
    }

    /// Whether `label` has probability greater than `minimum_probability`.
    pub fn is_likely(&self, label: impl Into<Label>, minimum_probability: f64) -> Result<bool> {
        Ok(self.probability_of(label)? > minimum_probability)
    }

    pub fn probability_of(&self, label: impl Into<Label>) -> Result<f64> {
        let index = self.index_of(&label.into())?;
        Ok(self.probs[index])
    }

    /// Probability of `label` against the combined mass of every other class.
    pub fn odds_of(&self, label: impl Into<Label>) -> Result<f64> {
        let index = self.index_of(&label.into())?;
        let others: f64 = self
            .probs
            .iter()
            .enumerate()
            .filter(|(other, _)| *other != index)
            .map(|(_, prob)| prob)
            .sum();
        Ok(self.probs[index] / others)
    }

    /// Probability of `label` divided by the probability of `other`.
    pub fn odds_between(&self, label: impl Into<Label>, other: impl Into<Label>) -> Result<f64> {
        let numerator = self.probability_of(label)?;
        let denominator = self.probability_of(other)?;
        Ok(numerator / denominator)
    }

    /// Swaps the two probabilities of a two-class distribution.
    pub fn opposite(&self) -> Result<Self> {
        match self.probs.as_slice() {
            [first, second] => Ok(Self {
                labels: self.labels.clone(),
                probs: vec![*second, *first],
            }),
            _ => Err(BeliefError::UnsupportedArity {
                expected: 2,
                actual: self.len(),
            }),
        }
    }

    /// Shannon entropy in nats.
    pub fn entropy(&self) -> f64 {
        self.probs
            .iter()
            .filter(|prob| **prob > 0.0)
            .map(|prob| -prob * prob.ln())
            .sum()
    }
}

fn normalize(weights: &[f64], context: &'static str) -> Result<Vec<f64>> {
    let total: f64 = weights.iter().sum();
    if !(total > 0.0) || !total.is_finite() {
        return Err(BeliefError::DegenerateDistribution { context });
    }
    Ok(weights.iter().map(|weight| weight / total).collect())
}

impl fmt::Display for BeliefDistribution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Bayes(")?;
        for (index, (label, prob)) in self.iter().enumerate() {
            if index > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{label}: {:.2}%", prob * 100.0)?;
        }
        f.write_str(")")
    }
}

#[derive(serde::Serialize)]
struct ClassEntry<'a> {
    label: &'a Label,
    probability: f64,
}

impl Serialize for BeliefDistribution {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.len()))?;
        for (label, probability) in self.iter() {
            seq.serialize_element(&ClassEntry { label, probability })?;
        }
        seq.end()
    }
}
