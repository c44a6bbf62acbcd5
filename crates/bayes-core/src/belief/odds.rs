//! Odds tables and their construction from labeled corpora.

use super::label::{Label, Weights};
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::env;
use std::hash::Hash;
use std::str::FromStr;
use tracing::{Level, event};

const MIN_PSEUDO_COUNT: f64 = 1e-6;
const MAX_PSEUDO_COUNT: f64 = 1e6;

/// Mapping from an observable event to its per-class likelihoods.
#[derive(Debug, Clone, PartialEq)]
pub struct OddsTable<E: Eq + Hash> {
    entries: HashMap<E, Weights>,
}

impl<E: Eq + Hash> Default for OddsTable<E> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }
}

impl<E: Eq + Hash> OddsTable<E> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces the likelihoods for `event`, returning the previous entry.
    pub fn insert(&mut self, event: E, likelihoods: impl Into<Weights>) -> Option<Weights> {
        self.entries.insert(event, likelihoods.into())
    }

    pub fn get<Q>(&self, event: &Q) -> Option<&Weights>
    where
        E: Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        self.entries.get(event)
    }

    pub fn contains<Q>(&self, event: &Q) -> bool
    where
        E: Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        self.entries.contains_key(event)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&E, &Weights)> {
        self.entries.iter()
    }
}

impl<E: Eq + Hash, W: Into<Weights>> FromIterator<(E, W)> for OddsTable<E> {
    fn from_iter<T: IntoIterator<Item = (E, W)>>(iter: T) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(event, likelihoods)| (event, likelihoods.into()))
                .collect(),
        }
    }
}

/// How training instances contribute to an event count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CountMode {
    /// Every occurrence of the event counts.
    #[default]
    Occurrences,
    /// An instance counts at most once per event.
    Documents,
}

impl FromStr for CountMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "occurrences" | "occurrence" => Ok(CountMode::Occurrences),
            "documents" | "document" => Ok(CountMode::Documents),
            other => Err(format!("unknown count mode '{other}'")),
        }
    }
}

/// Tuning for [`extract_events_odds`].
///
/// The likelihood of an event for a class is `count + pseudo_count` (additive smoothing,
/// add-one by default). `pseudo_count` is kept strictly positive so that an event never
/// rules out a class it was not seen with during training.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OddsConfig {
    pub pseudo_count: f64,
    pub count_mode: CountMode,
}

impl Default for OddsConfig {
    fn default() -> Self {
        Self {
            pseudo_count: 1.0,
            count_mode: CountMode::Occurrences,
        }
    }
}

impl OddsConfig {
    /// Defaults overridden by `BAYES_PSEUDO_COUNT` and `BAYES_COUNT_MODE`.
    pub fn from_env() -> Self {
        let base = Self::default();
        let pseudo_count = env::var("BAYES_PSEUDO_COUNT")
            .ok()
            .and_then(|value| value.trim().parse::<f64>().ok())
            .filter(|value| value.is_finite())
            .unwrap_or(base.pseudo_count);
        let count_mode = env::var("BAYES_COUNT_MODE")
            .ok()
            .and_then(|value| value.parse::<CountMode>().ok())
            .unwrap_or(base.count_mode);

        Self {
            pseudo_count,
            count_mode,
        }
        .sanitized()
    }

    /// Clamps the pseudo count into its usable range.
    pub fn sanitized(self) -> Self {
        let pseudo_count = if self.pseudo_count.is_finite() {
            self.pseudo_count.clamp(MIN_PSEUDO_COUNT, MAX_PSEUDO_COUNT)
        } else {
            Self::default().pseudo_count
        };
        Self {
            pseudo_count,
            ..self
        }
    }
}

/// Builds an odds table by counting events per class over a labeled corpus.
///
/// `tokenizer` maps one instance to its events. Every entry of the result is a by-label
/// mapping over all classes of `classes_instances`, including classes in which the event
/// never occurred.
pub fn extract_events_odds<I, E, F, T>(
    classes_instances: &BTreeMap<Label, Vec<I>>,
    mut tokenizer: F,
    config: &OddsConfig,
) -> OddsTable<E>
where
    E: Eq + Hash + Clone,
    F: FnMut(&I) -> T,
    T: IntoIterator<Item = E>,
{
    let config = config.sanitized();
    let classes = classes_instances.len();
    let mut counts: HashMap<E, Vec<f64>> = HashMap::new();
    let mut instances = 0usize;

    for (class_index, instances_of_class) in classes_instances.values().enumerate() {
        for instance in instances_of_class {
            instances += 1;
            let mut bump = |event: E| {
                counts.entry(event).or_insert_with(|| vec![0.0; classes])[class_index] += 1.0;
            };
            match config.count_mode {
                CountMode::Occurrences => tokenizer(instance).into_iter().for_each(&mut bump),
                CountMode::Documents => {
                    let mut seen = HashSet::new();
                    for event in tokenizer(instance) {
                        if seen.insert(event.clone()) {
                            bump(event);
                        }
                    }
                }
            }
        }
    }

    if tracing::enabled!(Level::DEBUG) {
        event!(
            target: "bayes_core::odds",
            Level::DEBUG,
            classes,
            instances,
            events = counts.len(),
            pseudo_count = config.pseudo_count,
            count_mode = ?config.count_mode,
            "extracted odds table"
        );
    }

    counts
        .into_iter()
        .map(|(event, per_class)| {
            let likelihoods: BTreeMap<Label, f64> = classes_instances
                .keys()
                .cloned()
                .zip(per_class.into_iter().map(|count| count + config.pseudo_count))
                .collect();
            (event, Weights::Mapped(likelihoods))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corpus() -> BTreeMap<Label, Vec<&'static str>> {
        let mut corpus = BTreeMap::new();
        corpus.insert(
            Label::from("genuine"),
            vec!["meeting tomorrow", "meeting notes meeting"],
        );
        corpus.insert(Label::from("spam"), vec!["buy now", "buy buy viagra"]);
        corpus
    }

    fn entry(table: &OddsTable<&'static str>, event: &str, label: &str) -> f64 {
        match table.get(event).expect("event present") {
            Weights::Mapped(map) => map[&Label::from(label)],
            other => panic!("unexpected shape {other:?}"),
        }
    }

    #[test]
    fn occurrences_are_counted_with_add_one_smoothing() {
        let table = extract_events_odds(
            &corpus(),
            |text| text.split_whitespace(),
            &OddsConfig::default(),
        );
        assert_eq!(entry(&table, "meeting", "genuine"), 4.0);
        assert_eq!(entry(&table, "meeting", "spam"), 1.0);
        assert_eq!(entry(&table, "buy", "spam"), 4.0);
        assert_eq!(entry(&table, "buy", "genuine"), 1.0);
        assert!(!table.contains("coffee"));
        assert_eq!(table.len(), 6);
    }

    #[test]
    fn document_mode_counts_each_instance_once() {
        let config = OddsConfig {
            pseudo_count: 1.0,
            count_mode: CountMode::Documents,
        };
        let table = extract_events_odds(&corpus(), |text| text.split_whitespace(), &config);
        assert_eq!(entry(&table, "meeting", "genuine"), 3.0);
        assert_eq!(entry(&table, "buy", "spam"), 3.0);
    }

    #[test]
    fn pseudo_count_never_reaches_zero() {
        let config = OddsConfig {
            pseudo_count: 0.0,
            count_mode: CountMode::Occurrences,
        };
        let table = extract_events_odds(&corpus(), |text| text.split_whitespace(), &config);
        assert!(entry(&table, "viagra", "genuine") > 0.0);
        assert_eq!(OddsConfig { pseudo_count: f64::NAN, ..config }.sanitized().pseudo_count, 1.0);
    }

    #[test]
    fn env_overrides_are_parsed_and_clamped() {
        unsafe {
            std::env::set_var("BAYES_PSEUDO_COUNT", "0.25");
            std::env::set_var("BAYES_COUNT_MODE", "documents");
        }
        assert_eq!(
            OddsConfig::from_env(),
            OddsConfig {
                pseudo_count: 0.25,
                count_mode: CountMode::Documents,
            }
        );

        unsafe {
            std::env::set_var("BAYES_PSEUDO_COUNT", "1e9");
            std::env::set_var("BAYES_COUNT_MODE", "paragraphs");
        }
        assert_eq!(
            OddsConfig::from_env(),
            OddsConfig {
                pseudo_count: MAX_PSEUDO_COUNT,
                count_mode: CountMode::Occurrences,
            }
        );

        unsafe {
            std::env::set_var("BAYES_PSEUDO_COUNT", "-3");
        }
        assert_eq!(OddsConfig::from_env().pseudo_count, MIN_PSEUDO_COUNT);

        unsafe {
            std::env::set_var("BAYES_PSEUDO_COUNT", "plenty");
            std::env::remove_var("BAYES_COUNT_MODE");
        }
        assert_eq!(OddsConfig::from_env(), OddsConfig::default());

        unsafe {
            std::env::remove_var("BAYES_PSEUDO_COUNT");
        }
    }

    #[test]
    fn count_mode_parses_from_text() {
        assert_eq!("Documents".parse::<CountMode>(), Ok(CountMode::Documents));
        assert_eq!(" occurrences ".parse::<CountMode>(), Ok(CountMode::Occurrences));
        assert!("words".parse::<CountMode>().is_err());
    }

    #[test]
    fn table_collects_from_pairs() {
        let table: OddsTable<&str> = [("buy", [5.0, 100.0]), ("meeting", [15.0, 2.0])]
            .into_iter()
            .collect();
        assert_eq!(table.get("buy"), Some(&Weights::from([5.0, 100.0])));
        assert!(table.get("viagra").is_none());
    }
}
