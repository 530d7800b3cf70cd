//! CLI argument types and parsing helpers.
mod cli;
mod parsers;
mod types;


pub use cli::{Cli, Command, CompareArgs, RunArgs, SuiteArgs};
pub use types::PositiveUsize;
