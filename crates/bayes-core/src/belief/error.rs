use super::label::Label;
use thiserror::Error;

/// Errors raised by belief construction, updates and queries.
///
/// Every failing operation leaves the distribution exactly as it was before the call.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BeliefError {
    #[error("degenerate distribution: {context} sum to zero")]
    DegenerateDistribution { context: &'static str },
    #[error("unknown label '{label}'")]
    UnknownLabel { label: Label },
    #[error("unknown event {event}")]
    UnknownEvent { event: String },
    #[error("operation requires {expected} classes, distribution has {actual}")]
    UnsupportedArity { expected: usize, actual: usize },
    #[error("malformed odds: {message}")]
    MalformedOddsSpec { message: String },
    #[error("label '{label}' defined more than once")]
    DuplicateLabel { label: Label },
    #[error("invalid weight {value} for '{label}': weights must be finite and non-negative")]
    InvalidWeight { label: Label, value: f64 },
    #[error("class '{label}' has {count} samples of '{property}', at least 2 are required")]
    InsufficientSamples {
        label: Label,
        property: String,
        count: usize,
    },
}

impl BeliefError {
    pub(crate) fn malformed(message: impl Into<String>) -> Self {
        BeliefError::MalformedOddsSpec {
            message: message.into(),
        }
    }

    pub(crate) fn unknown_event(event: &impl std::fmt::Debug) -> Self {
        BeliefError::UnknownEvent {
            event: format!("{event:?}"),
        }
    }
}

pub type Result<T> = std::result::Result<T, BeliefError>;
