use super::distribution::BeliefDistribution;
use super::error::Result;
use super::label::Label;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClassProbability {
    pub label: Label,
    pub probability: f64,
}

/// Serializable view of a posterior for reporting.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PosteriorSnapshot {
    pub classes: Vec<ClassProbability>,
    pub most_likely: Label,
    pub entropy: f64,
}

impl PosteriorSnapshot {
    pub fn capture(belief: &BeliefDistribution) -> Self {
        PosteriorSnapshot {
            classes: belief
                .iter()
                .map(|(label, probability)| ClassProbability {
                    label: label.clone(),
                    probability,
                })
                .collect(),
            most_likely: belief.most_likely().clone(),
            entropy: belief.entropy(),
        }
    }

    /// Rebuilds the distribution, keeping the captured class order.
    pub fn restore(self) -> Result<BeliefDistribution> {
        BeliefDistribution::from_pairs(
            self.classes
                .into_iter()
                .map(|class| (class.label, class.probability)),
        )
    }

    pub fn to_json(belief: &BeliefDistribution) -> serde_json::Result<String> {
        serde_json::to_string(&Self::capture(belief))
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_serializes_to_json() {
        let belief = BeliefDistribution::from_pairs([("genuine", 9.0), ("spam", 1.0)]).unwrap();
        let json = PosteriorSnapshot::to_json(&belief).unwrap();
        assert!(json.contains("\"most_likely\":\"genuine\""));
        assert!(json.contains("{\"label\":\"spam\",\"probability\":0.1}"));
    }

    #[test]
    fn snapshot_roundtrip_keeps_order_and_mass() {
        let belief = BeliefDistribution::from_pairs([(2usize, 1.0), (0usize, 3.0)]).unwrap();
        let json = PosteriorSnapshot::to_json(&belief).unwrap();
        let restored = PosteriorSnapshot::from_json(&json).unwrap().restore().unwrap();
        assert_eq!(restored.labels(), belief.labels());
        for (a, b) in restored.probabilities().iter().zip(belief.probabilities()) {
            assert!((a - b).abs() < 1e-15);
        }
    }
}
