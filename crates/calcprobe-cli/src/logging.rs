//! Tracing setup for the binary

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Verbosity;

/// Install the global subscriber, writing compact lines to stderr.
///
/// `RUST_LOG` wins over the verbosity flags when set. Calling this twice is
/// harmless; the second subscriber is ignored.
pub fn init(verbosity: Verbosity, use_color: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(verbosity.log_filter()));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(use_color)
                .with_target(true)
                .compact(),
        )
        .try_init();
}
