//! Bayesian belief revision over a finite set of classes.
//!
//! This module is composed of:
//! - `label`: class identifiers and the accepted weight shapes (`Label`, `Weights`).
//! - `distribution`: the normalized distribution and its update/query operations.
//! - `aggregate`: folding of independent observations into one reweighting.
//! - `odds`: odds tables and their construction from labeled corpora.
//! - `diagnostic`: binary tests whose outcome selects a likelihood vector.
//! - `snapshot`: serializable posterior view for reporting.

mod aggregate;
mod diagnostic;
mod distribution;
mod error;
mod label;
pub mod odds;
pub mod snapshot;
pub mod telemetry;

pub use aggregate::{CombinedEvidence, EventAggregator};
pub use diagnostic::TestSpec;
pub use distribution::BeliefDistribution;
pub use error::{BeliefError, Result};
pub use label::{Label, Weights};
pub use odds::{CountMode, OddsConfig, OddsTable, extract_events_odds};
pub use snapshot::{ClassProbability, PosteriorSnapshot};
