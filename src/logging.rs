use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Install the stderr subscriber. `RUST_LOG` wins over `verbose`.
pub fn init_tracing(verbose: bool) {
    let default_directive = if verbose {
        "entity_lookup=debug"
    } else {
        "entity_lookup=info"
    };

    // A second init (tests, embedding) keeps the first subscriber.
    let _ = tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_directive.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();
}
