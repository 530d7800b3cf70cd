use tracing_subscriber::{EnvFilter, FmtSubscriber};

const LOG_ENV: &str = "LOADSHIP_LOG";

/// Installs the global `tracing` subscriber. `LOADSHIP_LOG` wins over
/// `RUST_LOG`; without either, `--verbose` selects debug level.
pub fn init_logging(verbose: bool, no_color: bool) {
    let filter = std::env::var(LOG_ENV)
        .or_else(|_| std::env::var("RUST_LOG"))
        .map_or_else(
            |_| default_filter(verbose),
            |value| EnvFilter::try_new(value).unwrap_or_else(|_| default_filter(verbose)),
        );

    if let Err(err) = tracing::subscriber::set_global_default(build_subscriber(filter, no_color))
    {
        eprintln!("Failed to set global default subscriber: {}", err);
    }
}

fn build_subscriber(
    filter: EnvFilter,
    no_color: bool,
) -> impl tracing::Subscriber + Send + Sync + 'static {
    FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_ansi(!no_color)
        .with_writer(std::io::stderr)
        .finish()
}

fn default_filter(verbose: bool) -> EnvFilter {
    if verbose {
        EnvFilter::new("loadship=debug,info")
    } else {
        EnvFilter::new("info")
    }
}
