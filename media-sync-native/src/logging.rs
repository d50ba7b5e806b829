use tracing_subscriber::{
    Layer, filter::EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt,
};

/// Installs the stderr subscriber. `filter` uses `EnvFilter` directive syntax;
/// an unparsable filter falls back to `info`.
///
/// Only the first call in a process takes effect.
pub fn init(filter: &str) {
    let env_filter = EnvFilter::try_new(filter).unwrap_or_else(|e| {
        eprintln!("Invalid log filter {filter:?}: {e}");
        EnvFilter::new("info")
    });

    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_thread_names(true)
        .with_target(false)
        .with_filter(env_filter);

    if tracing_subscriber::registry()
        .with(console_layer)
        .try_init()
        .is_ok()
    {
        tracing::info!("logging initialized with filter {filter:?}");
    }
}
