//! Naive Bayes classification built on the belief engine.
//!
//! Everything here goes through the public `belief` API only: an odds table is counted
//! from a labeled corpus, a prior is built, and the instance's events are folded in.

pub mod normal;

use crate::belief::{
    BeliefDistribution, Label, OddsConfig, OddsTable, Result, Weights, extract_events_odds,
};
use std::collections::BTreeMap;
use std::hash::Hash;

/// Splits on whitespace; the default event extractor for text.
pub fn whitespace_tokenizer(text: &str) -> Vec<String> {
    text.split_whitespace().map(str::to_string).collect()
}

/// Trained odds table plus the prior every classification starts from.
#[derive(Debug, Clone)]
pub struct NaiveBayesClassifier<E: Eq + Hash> {
    odds: OddsTable<E>,
    prior: BeliefDistribution,
}

impl<E: Eq + Hash + Clone> NaiveBayesClassifier<E> {
    /// Counts events over `classes_instances`.
    ///
    /// Without `priors` every corpus class starts with equal mass.
    pub fn train<I, F, T>(
        classes_instances: &BTreeMap<Label, Vec<I>>,
        tokenizer: F,
        priors: Option<Weights>,
        config: &OddsConfig,
    ) -> Result<Self>
    where
        F: FnMut(&I) -> T,
        T: IntoIterator<Item = E>,
    {
        let prior = match priors {
            Some(weights) => BeliefDistribution::new(weights)?,
            None => BeliefDistribution::uniform(classes_instances.keys().cloned())?,
        };
        let odds = extract_events_odds(classes_instances, tokenizer, config);
        Ok(Self { odds, prior })
    }

    pub fn odds(&self) -> &OddsTable<E> {
        &self.odds
    }

    pub fn prior(&self) -> &BeliefDistribution {
        &self.prior
    }

    /// Posterior after observing `events`; events never seen in training are ignored.
    pub fn posterior(&self, events: impl IntoIterator<Item = E>) -> Result<BeliefDistribution> {
        let mut belief = self.prior.clone();
        belief.update_from_known_events(events, &self.odds)?;
        Ok(belief)
    }

    pub fn classify(&self, events: impl IntoIterator<Item = E>) -> Result<Label> {
        Ok(self.posterior(events)?.most_likely().clone())
    }
}

/// One-shot classification of `instance` against a labeled corpus.
pub fn classify<I, E, F, T>(
    instance: &I,
    classes_instances: &BTreeMap<Label, Vec<I>>,
    mut tokenizer: F,
    priors: Option<Weights>,
    config: &OddsConfig,
) -> Result<Label>
where
    E: Eq + Hash + Clone,
    F: FnMut(&I) -> T,
    T: IntoIterator<Item = E>,
{
    let classifier = NaiveBayesClassifier::train(classes_instances, &mut tokenizer, priors, config)?;
    classifier.classify(tokenizer(instance))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corpus() -> BTreeMap<Label, Vec<String>> {
        let mut corpus = BTreeMap::new();
        corpus.insert(
            Label::from("genuine"),
            vec![
                "let's schedule a meeting".to_string(),
                "meeting notes for tomorrow".to_string(),
            ],
        );
        corpus.insert(
            Label::from("spam"),
            vec!["buy viagra now".to_string(), "buy cheap pills".to_string()],
        );
        corpus
    }

    #[test]
    fn classifies_by_trained_words() {
        let corpus = corpus();
        let tokenize = |text: &String| whitespace_tokenizer(text);
        let config = OddsConfig::default();
        let spam = "buy some viagra".to_string();
        let genuine = "meeting tomorrow".to_string();

        assert_eq!(
            classify(&spam, &corpus, tokenize, None, &config).unwrap(),
            Label::from("spam")
        );
        assert_eq!(
            classify(&genuine, &corpus, tokenize, None, &config).unwrap(),
            Label::from("genuine")
        );
    }

    #[test]
    fn unseen_words_leave_the_prior_alone() {
        let classifier = NaiveBayesClassifier::train(
            &corpus(),
            |text: &String| whitespace_tokenizer(text),
            Some(Weights::from(vec![("genuine", 3.0), ("spam", 1.0)])),
            &OddsConfig::default(),
        )
        .unwrap();
        let posterior = classifier
            .posterior(whitespace_tokenizer("completely novel words"))
            .unwrap();
        assert_eq!(&posterior, classifier.prior());
    }

    #[test]
    fn priors_must_match_corpus_classes() {
        let classifier = NaiveBayesClassifier::train(
            &corpus(),
            |text: &String| whitespace_tokenizer(text),
            Some(Weights::from(vec![("genuine", 1.0), ("ham", 1.0)])),
            &OddsConfig::default(),
        )
        .unwrap();
        assert!(classifier.posterior(whitespace_tokenizer("buy")).is_err());
    }
}
