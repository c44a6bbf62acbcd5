use bayes_core::belief::{Label, OddsConfig, Weights};
use serde::Deserialize;
use std::collections::{BTreeMap, HashSet};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::Level;

const LABEL_FORBIDDEN: &[char] = &['/', '\\', '\0'];

/// Root classifier configuration loaded from YAML.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ClassifierConfig {
    pub classes: Vec<ClassConfig>,
    #[serde(default)]
    pub priors: Option<BTreeMap<String, f64>>,
    #[serde(default)]
    pub odds: OddsConfig,
    #[serde(default)]
    pub tokenizer: TokenizerConfig,
    #[serde(default)]
    pub cutoff: f64,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl ClassifierConfig {
    /// Load configuration from a YAML file on disk.
    ///
    /// Relative class folders are resolved against the directory holding the file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let path_buf = path.to_path_buf();
        let file = File::open(path).map_err(|source| ConfigError::Read {
            source,
            path: path_buf.clone(),
        })?;
        let reader = BufReader::new(file);
        let mut cfg: ClassifierConfig =
            serde_yaml::from_reader(reader).map_err(|source| ConfigError::Parse {
                source,
                path: path_buf.clone(),
            })?;
        cfg.validate().map_err(|source| ConfigError::Invalid {
            path: path_buf.clone(),
            source,
        })?;
        if let Some(base) = path.parent() {
            cfg.resolve_folders(base);
        }
        Ok(cfg)
    }

    /// Validate the configuration without performing I/O.
    pub fn validate(&mut self) -> Result<(), ValidationError> {
        validate_classes(&self.classes)?;
        if let Some(priors) = self.priors.as_ref() {
            validate_priors(priors, &self.classes)?;
        }
        validate_odds(&self.odds)?;
        if !(0.0..1.0).contains(&self.cutoff) {
            return Err(ValidationError::InvalidField {
                field: "cutoff".to_string(),
                message: "cutoff must be within [0, 1)".to_string(),
            });
        }
        self.logging.normalize();
        Ok(())
    }

    /// Prior weights in class order, or `None` for a uniform prior.
    pub fn prior_weights(&self) -> Option<Weights> {
        let priors = self.priors.as_ref()?;
        Some(Weights::Labeled(
            self.classes
                .iter()
                .map(|class| {
                    let weight = priors.get(&class.label).copied().unwrap_or(0.0);
                    (Label::from(&class.label), weight)
                })
                .collect(),
        ))
    }

    fn resolve_folders(&mut self, base: &Path) {
        for class in &mut self.classes {
            if class.folder.is_relative() {
                class.folder = base.join(&class.folder);
            }
        }
    }
}

/// One class and the folder holding its training documents.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ClassConfig {
    pub label: String,
    pub folder: PathBuf,
}

/// How documents are split into events.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct TokenizerConfig {
    #[serde(default)]
    pub lowercase: bool,
    #[serde(default = "default_min_length")]
    pub min_length: usize,
}

impl Default for TokenizerConfig {
    fn default() -> Self {
        Self {
            lowercase: false,
            min_length: default_min_length(),
        }
    }
}

impl TokenizerConfig {
    pub fn tokenize(&self, text: &str) -> Vec<String> {
        text.split_whitespace()
            .filter(|word| word.chars().count() >= self.min_length)
            .map(|word| {
                if self.lowercase {
                    word.to_lowercase()
                } else {
                    word.to_string()
                }
            })
            .collect()
    }
}

fn default_min_length() -> usize {
    1
}

/// Logging configuration defaults to human-readable logs on stderr.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct LoggingConfig {
    #[serde(default)]
    pub enable_structured: bool,
    #[serde(default = "default_tracing_level")]
    pub tracing_level: String,
    #[serde(default)]
    pub log_dir: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enable_structured: false,
            tracing_level: default_tracing_level(),
            log_dir: None,
        }
    }
}

impl LoggingConfig {
    fn normalize(&mut self) {
        if self.tracing_level.trim().is_empty() {
            self.tracing_level = default_tracing_level();
        }
    }

    pub fn level(&self) -> Option<Level> {
        match self.tracing_level.to_ascii_lowercase().as_str() {
            "trace" => Some(Level::TRACE),
            "debug" => Some(Level::DEBUG),
            "info" => Some(Level::INFO),
            "warn" | "warning" => Some(Level::WARN),
            "error" => Some(Level::ERROR),
            _ => None,
        }
    }
}

fn default_tracing_level() -> String {
    "warn".to_string()
}

fn validate_classes(classes: &[ClassConfig]) -> Result<(), ValidationError> {
    if classes.is_empty() {
        return Err(ValidationError::InvalidField {
            field: "classes".to_string(),
            message: "at least one class must be specified".to_string(),
        });
    }

    let mut seen = HashSet::new();
    for class in classes {
        if class.label.trim().is_empty() {
            return Err(ValidationError::InvalidField {
                field: "classes.label".to_string(),
                message: "class label must not be empty".to_string(),
            });
        }

        if class.label.contains(LABEL_FORBIDDEN) {
            return Err(ValidationError::InvalidField {
                field: format!("classes[{}].label", class.label),
                message: "class label contains invalid characters".to_string(),
            });
        }

        if class.folder.as_os_str().is_empty() {
            return Err(ValidationError::InvalidField {
                field: format!("classes[{}].folder", class.label),
                message: "folder must not be empty".to_string(),
            });
        }

        if !seen.insert(class.label.as_str()) {
            return Err(ValidationError::InvalidField {
                field: "classes".to_string(),
                message: format!("class '{}' defined more than once", class.label),
            });
        }
    }

    Ok(())
}

fn validate_priors(
    priors: &BTreeMap<String, f64>,
    classes: &[ClassConfig],
) -> Result<(), ValidationError> {
    for (label, weight) in priors {
        if !classes.iter().any(|class| &class.label == label) {
            return Err(ValidationError::InvalidField {
                field: format!("priors.{label}"),
                message: format!("class '{label}' is not defined in classes list"),
            });
        }
        if !weight.is_finite() || *weight < 0.0 {
            return Err(ValidationError::InvalidField {
                field: format!("priors.{label}"),
                message: "prior weight must be finite and non-negative".to_string(),
            });
        }
    }

    if !priors.values().any(|weight| *weight > 0.0) {
        return Err(ValidationError::InvalidField {
            field: "priors".to_string(),
            message: "at least one prior weight must be positive".to_string(),
        });
    }

    Ok(())
}

fn validate_odds(odds: &OddsConfig) -> Result<(), ValidationError> {
    if !odds.pseudo_count.is_finite() || odds.pseudo_count <= 0.0 {
        return Err(ValidationError::InvalidField {
            field: "odds.pseudo_count".to_string(),
            message: "pseudo count must be greater than zero".to_string(),
        });
    }
    Ok(())
}

/// Errors surfaced when loading configuration files.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path:?}: {source}")]
    Read {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },
    #[error("failed to parse config {path:?}: {source}")]
    Parse {
        #[source]
        source: serde_yaml::Error,
        path: PathBuf,
    },
    #[error("invalid configuration in {path:?}: {source}")]
    Invalid {
        path: PathBuf,
        source: ValidationError,
    },
}

/// Validation failures captured with contextual metadata.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("{field}: {message}")]
    InvalidField { field: String, message: String },
}
