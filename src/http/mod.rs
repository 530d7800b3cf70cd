//! Open-loop HTTP load: per-connection probe loops, their pool, and the
//! transport failure taxonomy.
mod classify;
mod client;
mod generator;
mod worker;


pub use classify::{classify_error, classify_failure};
pub use client::{PREFLIGHT_TIMEOUT, PROBE_TIMEOUT, build_preflight_client, build_probe_client};
pub use generator::LoadGenerator;
