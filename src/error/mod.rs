mod app;
mod config;
mod container;
mod http;
mod metrics;
mod run;
mod validation;


pub use app::{AppError, AppResult};
pub use config::ConfigError;
pub use container::ContainerError;
pub use http::HttpError;
pub use metrics::MetricsError;
pub use run::RunError;
pub use validation::ValidationError;
