//! Suite configuration loading and validation.
mod loader;
mod parse;
pub mod types;


pub use loader::load_suite_config;
pub use parse::parse_duration_value;
pub use types::{DurationValue, PlannedRun, SuiteConfig, SuitePlan, SuiteRunConfig};
