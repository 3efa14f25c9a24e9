use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install the global subscriber. `RUST_LOG` wins over `--log-level`.
///
/// Logs go to stderr so the JSON this tool prints on stdout stays pipeable.
pub fn init(level: &str) {
    let fallback = match level {
        "trace" | "debug" | "info" | "warn" | "error" => level,
        _ => "info",
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback)))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
