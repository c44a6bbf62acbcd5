//! Filesystem corpora: one folder per class, one document per file.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use bayes_core::belief::{BeliefDistribution, BeliefError, Label, OddsConfig, Weights};
use bayes_core::classify::NaiveBayesClassifier;
use thiserror::Error;
use tracing::{Level, event};

use crate::config::{ClassConfig, ClassifierConfig, TokenizerConfig};

#[derive(Debug, Error)]
pub enum CorpusError {
    #[error("{context} {path:?}: {source}")]
    Io {
        context: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{path:?} contains no class subfolders")]
    NoClasses { path: PathBuf },
    #[error(transparent)]
    Belief(#[from] BeliefError),
}

/// Documents grouped by class label.
pub type Corpus = BTreeMap<Label, Vec<String>>;

/// Regular files directly inside `folder`, sorted by path.
pub fn list_files(folder: &Path) -> Result<Vec<PathBuf>, CorpusError> {
    let (_, files) = split_entries(folder)?;
    Ok(files)
}

/// Subfolders and regular files directly inside `folder`, both sorted by path.
pub fn split_entries(folder: &Path) -> Result<(Vec<PathBuf>, Vec<PathBuf>), CorpusError> {
    let io_err = |source| CorpusError::Io {
        context: "listing",
        path: folder.to_path_buf(),
        source,
    };
    let mut subfolders = Vec::new();
    let mut files = Vec::new();
    for entry in fs::read_dir(folder).map_err(io_err)? {
        let path = entry.map_err(io_err)?.path();
        if path.is_dir() {
            subfolders.push(path);
        } else if path.is_file() {
            files.push(path);
        }
    }
    subfolders.sort();
    files.sort();
    Ok((subfolders, files))
}

/// Reads a document, replacing invalid UTF-8.
pub fn read_document(path: &Path) -> Result<String, CorpusError> {
    let bytes = fs::read(path).map_err(|source| CorpusError::Io {
        context: "reading",
        path: path.to_path_buf(),
        source,
    })?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Loads every document of every configured class.
pub fn load_classes(classes: &[ClassConfig]) -> Result<Corpus, CorpusError> {
    let mut corpus = Corpus::new();
    for class in classes {
        let documents = list_files(&class.folder)?
            .iter()
            .map(|path| read_document(path))
            .collect::<Result<Vec<_>, _>>()?;
        corpus.insert(Label::from(&class.label), documents);
    }
    Ok(corpus)
}

/// Trains a text classifier from a corpus.
pub fn train(
    corpus: &Corpus,
    tokenizer: &TokenizerConfig,
    priors: Option<Weights>,
    odds: &OddsConfig,
) -> Result<NaiveBayesClassifier<String>, CorpusError> {
    let classifier =
        NaiveBayesClassifier::train(corpus, |text: &String| tokenizer.tokenize(text), priors, odds)?;

    if tracing::enabled!(Level::INFO) {
        event!(
            target: "bayes_cli::corpus",
            Level::INFO,
            classes = corpus.len(),
            documents = corpus.values().map(Vec::len).sum::<usize>(),
            vocabulary = classifier.odds().len(),
            "trained classifier"
        );
    }
    Ok(classifier)
}

/// Trains from the folders listed in `config`.
pub fn train_from_config(
    config: &ClassifierConfig,
) -> Result<NaiveBayesClassifier<String>, CorpusError> {
    let corpus = load_classes(&config.classes)?;
    train(
        &corpus,
        &config.tokenizer,
        config.prior_weights(),
        &config.odds,
    )
}

/// Posterior for one file.
pub fn classify_file(
    path: &Path,
    classifier: &NaiveBayesClassifier<String>,
    tokenizer: &TokenizerConfig,
) -> Result<BeliefDistribution, CorpusError> {
    let text = read_document(path)?;
    Ok(classifier.posterior(tokenizer.tokenize(&text))?)
}

/// A file and the class folder it belongs in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placement {
    pub file: PathBuf,
    pub destination: PathBuf,
    pub moved: bool,
}

/// Classifies every file directly inside `folder` against its subfolders and moves it
/// into the winning subfolder.
///
/// Each subfolder is a class and its files are that class's training documents. A file
/// is left in place when the destination already holds a file of the same name, or when
/// `dry_run` is set.
pub fn sort_folder(
    folder: &Path,
    tokenizer: &TokenizerConfig,
    odds: &OddsConfig,
    dry_run: bool,
) -> Result<Vec<Placement>, CorpusError> {
    let (subfolders, files) = split_entries(folder)?;
    if subfolders.is_empty() {
        return Err(CorpusError::NoClasses {
            path: folder.to_path_buf(),
        });
    }

    let mut corpus = Corpus::new();
    let mut destinations = BTreeMap::new();
    for subfolder in &subfolders {
        let label = Label::from(
            subfolder
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default(),
        );
        let documents = list_files(subfolder)?
            .iter()
            .map(|path| read_document(path))
            .collect::<Result<Vec<_>, _>>()?;
        corpus.insert(label.clone(), documents);
        destinations.insert(label, subfolder.clone());
    }

    let classifier = train(&corpus, tokenizer, None, odds)?;
    let mut placements = Vec::with_capacity(files.len());
    for file in files {
        let posterior = classify_file(&file, &classifier, tokenizer)?;
        let label = posterior.most_likely();
        let Some(folder) = destinations.get(label) else {
            continue;
        };
        let Some(name) = file.file_name() else {
            continue;
        };
        let destination = folder.join(name);
        let moved = if dry_run || destination.exists() {
            false
        } else {
            fs::rename(&file, &destination).map_err(|source| CorpusError::Io {
                context: "moving",
                path: file.clone(),
                source,
            })?;
            true
        };
        event!(
            target: "bayes_cli::sort",
            Level::INFO,
            file = %file.display(),
            class = %label,
            moved,
        );
        placements.push(Placement {
            file,
            destination,
            moved,
        });
    }
    Ok(placements)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn write(path: &Path, text: &str) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, text).unwrap();
    }

    #[test]
    fn loads_documents_per_class() {
        let dir = tempdir().expect("temp dir");
        write(&dir.path().join("spam/a.txt"), "buy viagra");
        write(&dir.path().join("spam/b.txt"), "buy now");
        write(&dir.path().join("genuine/c.txt"), "meeting notes");
        let classes = vec![
            ClassConfig {
                label: "spam".to_string(),
                folder: dir.path().join("spam"),
            },
            ClassConfig {
                label: "genuine".to_string(),
                folder: dir.path().join("genuine"),
            },
        ];

        let corpus = load_classes(&classes).unwrap();
        assert_eq!(corpus[&Label::from("spam")], vec!["buy viagra", "buy now"]);
        assert_eq!(corpus[&Label::from("genuine")].len(), 1);
    }

    #[test]
    fn missing_folder_is_an_io_error() {
        let dir = tempdir().expect("temp dir");
        let err = list_files(&dir.path().join("nope")).unwrap_err();
        assert!(matches!(err, CorpusError::Io { context: "listing", .. }));
    }

    #[test]
    fn sort_folder_requires_subfolders() {
        let dir = tempdir().expect("temp dir");
        write(&dir.path().join("loose.txt"), "hello");
        let err = sort_folder(
            dir.path(),
            &TokenizerConfig::default(),
            &OddsConfig::default(),
            true,
        )
        .unwrap_err();
        assert!(matches!(err, CorpusError::NoClasses { .. }));
    }
}
