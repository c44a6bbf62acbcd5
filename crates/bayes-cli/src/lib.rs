pub mod config;
pub mod corpus;
pub mod logging;
pub mod query;
pub mod report;
