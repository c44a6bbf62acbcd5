//! Direct numeric updates entered on the command line.

use bayes_core::belief::{BeliefDistribution, Label, Result, Weights};

/// One `label=value` argument.
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    pub label: String,
    pub value: f64,
}

/// Parses `label=value`; the label is everything before the last `=`.
pub fn parse_assignment(raw: &str) -> std::result::Result<Assignment, String> {
    let (label, value) = raw
        .rsplit_once('=')
        .ok_or_else(|| format!("expected LABEL=VALUE, got '{raw}'"))?;
    let label = label.trim();
    if label.is_empty() {
        return Err(format!("missing label in '{raw}'"));
    }
    let value = value
        .trim()
        .parse::<f64>()
        .map_err(|err| format!("invalid number in '{raw}': {err}"))?;
    Ok(Assignment {
        label: label.to_string(),
        value,
    })
}

fn to_weights(assignments: &[Assignment]) -> Weights {
    Weights::Labeled(
        assignments
            .iter()
            .map(|assignment| (Label::from(&assignment.label), assignment.value))
            .collect(),
    )
}

/// Builds the prior in argument order and applies the likelihoods, if any, as one update.
pub fn evaluate(priors: &[Assignment], likelihoods: &[Assignment]) -> Result<BeliefDistribution> {
    let mut belief = BeliefDistribution::new(to_weights(priors))?;
    if !likelihoods.is_empty() {
        belief.update(to_weights(likelihoods))?;
    }
    Ok(belief)
}
