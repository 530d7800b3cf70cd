//! Core library for the `loadship` CLI.
//!
//! `loadship` drives a fixed number of HTTP connections against one URL for
//! a fixed window while sampling the resource usage of the Docker container
//! that serves it, then reduces both into a latency and utilisation summary.
//! The engine lives in [`orchestrator`], [`http`], [`container`] and
//! [`metrics`]; the remaining modules persist, compare, and schedule runs.
mod app;
pub mod args;
pub mod comparison;
pub mod config;
pub mod container;
pub mod domain;
pub mod entry;
pub mod error;
pub mod http;
pub mod logger;
pub mod metrics;
pub mod orchestrator;
pub mod output;
pub mod shutdown;

#[cfg(test)]
mod test_support;
