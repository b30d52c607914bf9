use tracing::{subscriber, Subscriber};
use tracing_subscriber::{layer::SubscriberExt, EnvFilter, Registry};

/// Installs the stderr subscriber. Filter comes from `RUST_LOG`, default `info`.
///
/// Call after the config's `.env` has been loaded so it can set `RUST_LOG`.
pub fn init() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    // Only fails when a subscriber is already set, which is fine to keep.
    let _ = subscriber::set_global_default(make_subscriber(env_filter));
}

fn make_subscriber(env_filter: EnvFilter) -> impl Subscriber {
    Registry::default()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .with(env_filter)
}
