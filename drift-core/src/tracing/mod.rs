//! Tracing initialization.

use std::sync::Once;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

static INIT: Once = Once::new();

/// Initialize the Drift tracing subscriber.
///
/// Reads `DRIFT_LOG` for per-subsystem levels, e.g.
/// `DRIFT_LOG=scanner=debug,detectors=info,storage=warn`, falling back to
/// `drift=info`. Idempotent; safe to call from tests and embedders.
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_env("DRIFT_LOG")
            .unwrap_or_else(|_| EnvFilter::new("drift=info"));

        tracing_subscriber::registry()
            .with(fmt::layer().with_target(true))
            .with(filter)
            .init();
    });
}
