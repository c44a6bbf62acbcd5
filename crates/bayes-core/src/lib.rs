#![deny(warnings)]
pub mod belief;
pub mod classify;

pub use belief::{BeliefDistribution, BeliefError, Label, OddsTable, Weights};

pub struct AppInfo;

impl AppInfo {
    pub const fn name() -> &'static str {
        "bayes"
    }

    pub const fn version() -> &'static str {
        env!("CARGO_PKG_VERSION")
    }
}
