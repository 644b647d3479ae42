use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Install the global tracing subscriber writing to stderr.
///
/// `RUST_LOG` wins over `level` when it is set.
pub fn init_logging(level: &str) {
    let default_filter = format!("dreamlife={level}");
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&default_filter));

    let installed = tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_thread_ids(false),
        )
        .try_init();

    if let Err(e) = installed {
        eprintln!("Warning: logging already initialized: {e}");
    }
}
