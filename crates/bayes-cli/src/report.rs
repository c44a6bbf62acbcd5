use std::path::Path;

use bayes_core::belief::{BeliefDistribution, Label, PosteriorSnapshot};
use serde::Serialize;

/// Classification outcome of one file.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct FileReport {
    pub path: String,
    /// Winning class, absent when its probability does not exceed the cutoff.
    pub label: Option<Label>,
    pub posterior: PosteriorSnapshot,
}

impl FileReport {
    pub fn new(path: &Path, posterior: &BeliefDistribution, cutoff: f64) -> Self {
        Self {
            path: path.display().to_string(),
            label: posterior.most_likely_above(cutoff).cloned(),
            posterior: PosteriorSnapshot::capture(posterior),
        }
    }

    /// `path<TAB>label`, with `-` for an undecided file.
    pub fn to_text(&self) -> String {
        match &self.label {
            Some(label) => format!("{}\t{label}", self.path),
            None => format!("{}\t-", self.path),
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
