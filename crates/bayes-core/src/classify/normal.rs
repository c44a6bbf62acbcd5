//! Per-feature Gaussian classifier for numeric measurements.
//!
//! Each class's training population is summarised as one normal distribution per
//! property. A new instance is scored by the density of each measured property under
//! every class, and the densities are folded as independent evidence.

use crate::belief::telemetry::UpdateMetrics;
use crate::belief::{BeliefDistribution, BeliefError, EventAggregator, Label, Result, Weights};
use serde::{Deserialize, Serialize};
use statrs::distribution::{Continuous, Normal};
use statrs::statistics::Statistics;
use std::collections::BTreeMap;
use tracing::{Level, event};

/// One measured instance: property name to value.
pub type Observation = BTreeMap<String, f64>;

/// Normal distribution fitted to a sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GaussianFit {
    pub mean: f64,
    pub variance: f64,
}

impl GaussianFit {
    /// Mean and unbiased (n - 1) variance; `None` for fewer than two samples.
    pub fn from_samples(samples: &[f64]) -> Option<Self> {
        if samples.len() < 2 {
            return None;
        }
        Some(Self {
            mean: samples.iter().mean(),
            variance: samples.iter().variance(),
        })
    }

    /// Log-density of `sample`.
    ///
    /// A zero-variance fit is a point mass: 0.0 at the mean, `-inf` anywhere else.
    pub fn ln_likelihood(&self, sample: f64) -> f64 {
        if self.variance == 0.0 {
            return if sample == self.mean { 0.0 } else { f64::NEG_INFINITY };
        }
        match Normal::new(self.mean, self.variance.sqrt()) {
            Ok(normal) => normal.ln_pdf(sample),
            Err(_) => f64::NAN,
        }
    }

    pub fn likelihood(&self, sample: f64) -> f64 {
        self.ln_likelihood(sample).exp()
    }
}

/// `{class: [observation]}` into `{property: {class: fit}}`.
pub fn property_distributions(
    classes_population: &BTreeMap<Label, Vec<Observation>>,
) -> Result<BTreeMap<String, BTreeMap<Label, GaussianFit>>> {
    let mut distributions: BTreeMap<String, BTreeMap<Label, GaussianFit>> = BTreeMap::new();
    for (label, population) in classes_population {
        let mut samples: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
        for observation in population {
            for (property, value) in observation {
                samples.entry(property.as_str()).or_default().push(*value);
            }
        }
        for (property, values) in samples {
            let fit = GaussianFit::from_samples(&values).ok_or_else(|| {
                BeliefError::InsufficientSamples {
                    label: label.clone(),
                    property: property.to_string(),
                    count: values.len(),
                }
            })?;
            distributions
                .entry(property.to_string())
                .or_default()
                .insert(label.clone(), fit);
        }
    }
    Ok(distributions)
}

/// Posterior over classes after measuring `instance`.
///
/// Without `priors` every class of the population starts with equal mass.
pub fn posterior_normal(
    instance: &Observation,
    classes_population: &BTreeMap<Label, Vec<Observation>>,
    priors: Option<Weights>,
) -> Result<BeliefDistribution> {
    let mut belief = match priors {
        Some(weights) => BeliefDistribution::new(weights)?,
        None => BeliefDistribution::uniform(classes_population.keys().cloned())?,
    };
    let distributions = property_distributions(classes_population)?;

    let mut aggregator = EventAggregator::new(belief.labels());
    for (property, value) in instance {
        let fits = distributions
            .get(property)
            .ok_or_else(|| BeliefError::unknown_event(property))?;
        let log_likelihoods = aggregator
            .labels()
            .iter()
            .map(|label| {
                fits.get(label)
                    .map(|fit| fit.ln_likelihood(*value))
                    .ok_or_else(|| {
                        BeliefError::malformed(format!(
                            "class '{label}' has no samples of '{property}'"
                        ))
                    })
            })
            .collect::<Result<Vec<f64>>>()?;
        aggregator.observe_log(&log_likelihoods)?;
    }
    let evidence = aggregator.finish();
    belief.apply_evidence(&evidence)?;

    if tracing::enabled!(Level::DEBUG) {
        let metrics = UpdateMetrics::from_distribution("normal", &belief, evidence.observations(), 0);
        event!(
            target: "bayes_core::classify",
            Level::DEBUG,
            properties = metrics.observations,
            entropy = metrics.entropy,
            leader = %belief.most_likely(),
            leader_probability = metrics.leader_probability,
        );
    }
    Ok(belief)
}

/// Most likely class of `instance` under per-property normal distributions.
pub fn classify_normal(
    instance: &Observation,
    classes_population: &BTreeMap<Label, Vec<Observation>>,
    priors: Option<Weights>,
) -> Result<Label> {
    Ok(posterior_normal(instance, classes_population, priors)?
        .most_likely()
        .clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn observation(pairs: &[(&str, f64)]) -> Observation {
        pairs
            .iter()
            .map(|(name, value)| (name.to_string(), *value))
            .collect()
    }

    fn population() -> BTreeMap<Label, Vec<Observation>> {
        let mut population = BTreeMap::new();
        population.insert(
            Label::from("female"),
            vec![
                observation(&[("height", 5.0), ("weight", 100.0)]),
                observation(&[("height", 5.5), ("weight", 150.0)]),
                observation(&[("height", 5.42), ("weight", 130.0)]),
                observation(&[("height", 5.75), ("weight", 150.0)]),
            ],
        );
        population.insert(
            Label::from("male"),
            vec![
                observation(&[("height", 6.0), ("weight", 180.0)]),
                observation(&[("height", 5.92), ("weight", 190.0)]),
                observation(&[("height", 5.58), ("weight", 170.0)]),
                observation(&[("height", 5.92), ("weight", 165.0)]),
            ],
        );
        population
    }

    #[test]
    fn fit_uses_sample_variance() {
        let fit = GaussianFit::from_samples(&[1.0, 2.0, 3.0, 4.0]).unwrap();
        assert!((fit.mean - 2.5).abs() < 1e-12);
        assert!((fit.variance - 5.0 / 3.0).abs() < 1e-12);
        assert!(GaussianFit::from_samples(&[1.0]).is_none());
    }

    #[test]
    fn density_matches_closed_form() {
        let fit = GaussianFit {
            mean: 0.0,
            variance: 4.0,
        };
        let expected = (-(1.0f64 * 1.0) / 8.0).exp() / (2.0 * std::f64::consts::PI * 4.0).sqrt();
        assert!((fit.likelihood(1.0) - expected).abs() < 1e-12);
    }

    #[test]
    fn zero_variance_is_a_point_mass() {
        let fit = GaussianFit::from_samples(&[3.0, 3.0]).unwrap();
        assert_eq!(fit.likelihood(3.0), 1.0);
        assert_eq!(fit.likelihood(3.1), 0.0);
    }

    #[test]
    fn classifies_measurements() {
        let population = population();
        let tall_heavy = observation(&[("height", 6.0), ("weight", 175.0)]);
        let short_light = observation(&[("height", 5.1), ("weight", 110.0)]);
        assert_eq!(
            classify_normal(&tall_heavy, &population, None).unwrap(),
            Label::from("male")
        );
        assert_eq!(
            classify_normal(&short_light, &population, None).unwrap(),
            Label::from("female")
        );
    }

    #[test]
    fn unknown_property_is_an_unknown_event() {
        let err = classify_normal(&observation(&[("age", 30.0)]), &population(), None).unwrap_err();
        assert!(matches!(err, BeliefError::UnknownEvent { .. }));
    }

    #[test]
    fn single_sample_class_is_rejected() {
        let mut population = population();
        population.insert(
            Label::from("child"),
            vec![observation(&[("height", 4.0)])],
        );
        let err = property_distributions(&population).unwrap_err();
        assert!(matches!(
            err,
            BeliefError::InsufficientSamples { count: 1, .. }
        ));
    }
}
