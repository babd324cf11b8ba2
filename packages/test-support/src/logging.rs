//! Test logging for the workspace.
//!
//! The server crate installs this through `ctor` hooks, once from its
//! lib's unit tests and once from the integration suites' shared support
//! module, so initialization has to tolerate repeated calls from either
//! path.

use once_cell::sync::OnceCell;
use tracing_subscriber::{fmt, EnvFilter};

static INIT: OnceCell<()> = OnceCell::new();

/// Install the test subscriber once per process.
///
/// `TEST_LOG` overrides `RUST_LOG`; with neither set, `belot_server`
/// logs at debug and everything else stays at warn, so a failing test
/// carries its entity-actor context without drowning the run.
pub fn init() {
    INIT.get_or_init(|| {
        let directives = std::env::var("TEST_LOG")
            .or_else(|_| std::env::var("RUST_LOG"))
            .unwrap_or_else(|_| "warn,belot_server=debug".to_string());

        // try_init: another harness may already have installed a
        // subscriber for this process.
        let _ = fmt()
            .with_env_filter(EnvFilter::new(directives))
            .with_test_writer()
            .without_time()
            .compact()
            .try_init();
    });
}
