use super::distribution::BeliefDistribution;
use tracing::{Level, event};

/// Summary of a distribution right after an update.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateMetrics {
    pub kind: &'static str,
    pub classes: usize,
    pub observations: usize,
    pub skipped: usize,
    pub entropy: f64,
    pub leader_probability: f64,
}

impl UpdateMetrics {
    pub fn from_distribution(
        kind: &'static str,
        belief: &BeliefDistribution,
        observations: usize,
        skipped: usize,
    ) -> Self {
        let leader = belief.most_likely();
        Self {
            kind,
            classes: belief.len(),
            observations,
            skipped,
            entropy: belief.entropy(),
            leader_probability: belief.probability_of(leader).unwrap_or(0.0),
        }
    }
}

pub(crate) fn log_update(
    kind: &'static str,
    belief: &BeliefDistribution,
    observations: usize,
    skipped: usize,
) {
    if !tracing::enabled!(Level::DEBUG) {
        return;
    }

    let metrics = UpdateMetrics::from_distribution(kind, belief, observations, skipped);
    event!(
        target: "bayes_core::update",
        Level::DEBUG,
        kind = metrics.kind,
        classes = metrics.classes,
        events = metrics.observations,
        skipped = metrics.skipped,
        entropy = metrics.entropy,
        leader = %belief.most_likely(),
        leader_probability = metrics.leader_probability,
    );
}
