//! Logging initialization
//!
//! Console logging through tracing-subscriber. `RUST_LOG` wins when set;
//! otherwise CLI verbosity picks the default level for this crate.

use anyhow::{Result, anyhow};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the global subscriber. `verbosity` is the CLI `-v` count:
/// 0 = info, 1 = debug, 2+ = trace.
pub fn init_logging(verbosity: u8) -> Result<()> {
    let default_level = match verbosity {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("ypharvest={default_level}")));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false))
        .try_init()
        .map_err(|err| anyhow!("failed to initialize logging: {err}"))
}
