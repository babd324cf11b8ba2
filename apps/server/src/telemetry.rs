//! Process logging setup.
//!
//! Filtering follows `RUST_LOG`, defaulting to info for this crate and
//! warn for everything else. `LOG_FORMAT=json` switches to structured
//! JSON lines for log aggregation; the default is compact terminal
//! output.

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn,belot_server=info"));

    let registry = tracing_subscriber::registry().with(filter);

    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);
    if json {
        registry
            .with(
                fmt::layer()
                    .json()
                    .flatten_event(true)
                    .with_current_span(true)
                    .with_target(true),
            )
            .init();
    } else {
        registry
            .with(fmt::layer().compact().with_target(true).with_ansi(true))
            .init();
    }
}
