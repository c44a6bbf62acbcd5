use super::error::{BeliefError, Result};
use core::fmt;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};

/// Identifier of one class hypothesis.
///
/// Unlabeled inputs get sequential `Index` labels. Indices order before names.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Label {
    Index(usize),
    Name(String),
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Label::Index(index) => write!(f, "{index}"),
            Label::Name(name) => f.write_str(name),
        }
    }
}

impl From<usize> for Label {
    fn from(index: usize) -> Self {
        Label::Index(index)
    }
}

impl From<&str> for Label {
    fn from(name: &str) -> Self {
        Label::Name(name.to_string())
    }
}

impl From<String> for Label {
    fn from(name: String) -> Self {
        Label::Name(name)
    }
}

impl From<&String> for Label {
    fn from(name: &String) -> Self {
        Label::Name(name.clone())
    }
}

impl From<&Label> for Label {
    fn from(label: &Label) -> Self {
        label.clone()
    }
}

/// Per-class weights in one of the accepted input shapes.
///
/// Priors and likelihoods share this type. For priors the shape decides the canonical
/// class order: positional for `Unlabeled`, insertion order for `Labeled`, sorted label
/// order for `Mapped`. For likelihoods the shape decides how values are matched to an
/// existing distribution: by position or by label.
#[derive(Debug, Clone, PartialEq)]
pub enum Weights {
    Unlabeled(Vec<f64>),
    Labeled(Vec<(Label, f64)>),
    Mapped(BTreeMap<Label, f64>),
}

impl Weights {
    pub fn len(&self) -> usize {
        match self {
            Weights::Unlabeled(values) => values.len(),
            Weights::Labeled(pairs) => pairs.len(),
            Weights::Mapped(map) => map.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Raw values in the order of this shape.
    pub fn values(&self) -> Box<dyn Iterator<Item = f64> + '_> {
        match self {
            Weights::Unlabeled(values) => Box::new(values.iter().copied()),
            Weights::Labeled(pairs) => Box::new(pairs.iter().map(|(_, value)| *value)),
            Weights::Mapped(map) => Box::new(map.values().copied()),
        }
    }

    /// Applies `f` to every value while keeping the shape and labels.
    pub fn map_values(&self, mut f: impl FnMut(f64) -> f64) -> Weights {
        match self {
            Weights::Unlabeled(values) => {
                Weights::Unlabeled(values.iter().map(|value| f(*value)).collect())
            }
            Weights::Labeled(pairs) => Weights::Labeled(
                pairs
                    .iter()
                    .map(|(label, value)| (label.clone(), f(*value)))
                    .collect(),
            ),
            Weights::Mapped(map) => Weights::Mapped(
                map.iter()
                    .map(|(label, value)| (label.clone(), f(*value)))
                    .collect(),
            ),
        }
    }

    /// Checks that every value is finite and non-negative.
    pub fn validate(&self) -> Result<()> {
        match self {
            Weights::Unlabeled(values) => values
                .iter()
                .enumerate()
                .try_for_each(|(index, value)| check_weight(&Label::Index(index), *value)),
            Weights::Labeled(pairs) => pairs
                .iter()
                .try_for_each(|(label, value)| check_weight(label, *value)),
            Weights::Mapped(map) => map
                .iter()
                .try_for_each(|(label, value)| check_weight(label, *value)),
        }
    }

    /// Resolves the shape into canonical `(labels, raw weights)` columns.
    pub(crate) fn into_columns(self) -> Result<(Vec<Label>, Vec<f64>)> {
        self.validate()?;
        match self {
            Weights::Unlabeled(values) => {
                let labels = (0..values.len()).map(Label::Index).collect();
                Ok((labels, values))
            }
            Weights::Labeled(pairs) => {
                let mut seen = HashSet::with_capacity(pairs.len());
                for (label, _) in &pairs {
                    if !seen.insert(label) {
                        return Err(BeliefError::DuplicateLabel {
                            label: label.clone(),
                        });
                    }
                }
                Ok(pairs.into_iter().unzip())
            }
            Weights::Mapped(map) => Ok(map.into_iter().unzip()),
        }
    }

    /// Lines the values up with `labels`, by position or by label lookup.
    pub(crate) fn align(&self, labels: &[Label]) -> Result<Vec<f64>> {
        self.validate()?;
        match self {
            Weights::Unlabeled(values) => {
                if values.len() != labels.len() {
                    return Err(BeliefError::malformed(format!(
                        "expected {} values, one per class, got {}",
                        labels.len(),
                        values.len()
                    )));
                }
                Ok(values.clone())
            }
            Weights::Labeled(pairs) => {
                let mut lookup = HashMap::with_capacity(pairs.len());
                for (label, value) in pairs {
                    if lookup.insert(label, *value).is_some() {
                        return Err(BeliefError::DuplicateLabel {
                            label: label.clone(),
                        });
                    }
                }
                align_lookup(labels, pairs.iter().map(|(label, _)| label), |label| {
                    lookup.get(label).copied()
                })
            }
            Weights::Mapped(map) => {
                align_lookup(labels, map.keys(), |label| map.get(label).copied())
            }
        }
    }
}

fn align_lookup<'a>(
    labels: &[Label],
    mut provided: impl Iterator<Item = &'a Label>,
    get: impl Fn(&Label) -> Option<f64>,
) -> Result<Vec<f64>> {
    if let Some(extra) = provided.find(|label| !labels.contains(*label)) {
        return Err(BeliefError::UnknownLabel {
            label: extra.clone(),
        });
    }

    labels
        .iter()
        .map(|label| {
            get(label).ok_or_else(|| {
                BeliefError::malformed(format!("no value given for class '{label}'"))
            })
        })
        .collect()
}

fn check_weight(label: &Label, value: f64) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(BeliefError::InvalidWeight {
            label: label.clone(),
            value,
        })
    }
}

impl From<Vec<f64>> for Weights {
    fn from(values: Vec<f64>) -> Self {
        Weights::Unlabeled(values)
    }
}

impl From<&[f64]> for Weights {
    fn from(values: &[f64]) -> Self {
        Weights::Unlabeled(values.to_vec())
    }
}

impl<const N: usize> From<[f64; N]> for Weights {
    fn from(values: [f64; N]) -> Self {
        Weights::Unlabeled(values.to_vec())
    }
}

impl<L: Into<Label>> From<Vec<(L, f64)>> for Weights {
    fn from(pairs: Vec<(L, f64)>) -> Self {
        Weights::Labeled(
            pairs
                .into_iter()
                .map(|(label, value)| (label.into(), value))
                .collect(),
        )
    }
}

impl<L: Into<Label>, const N: usize> From<[(L, f64); N]> for Weights {
    fn from(pairs: [(L, f64); N]) -> Self {
        Weights::Labeled(
            pairs
                .into_iter()
                .map(|(label, value)| (label.into(), value))
                .collect(),
        )
    }
}

impl<L: Into<Label>> From<BTreeMap<L, f64>> for Weights {
    fn from(map: BTreeMap<L, f64>) -> Self {
        Weights::Mapped(
            map.into_iter()
                .map(|(label, value)| (label.into(), value))
                .collect(),
        )
    }
}

impl<L: Into<Label>> From<HashMap<L, f64>> for Weights {
    fn from(map: HashMap<L, f64>) -> Self {
        Weights::Mapped(
            map.into_iter()
                .map(|(label, value)| (label.into(), value))
                .collect(),
        )
    }
}

impl From<&Weights> for Weights {
    fn from(weights: &Weights) -> Self {
        weights.clone()
    }
}
