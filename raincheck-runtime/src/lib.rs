pub mod runtime;

mod error;

pub use crate::error::RuntimeError;
pub use crate::runtime::{run, BurstUrlCli};

use tracing::error;
use tracing_subscriber::EnvFilter;

/// Log filter used when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "raincheck=info,raincheck_runtime=info,bursturl=info";

/// Target of the messages the `bursturl` binary itself emits.
pub const BIN_TARGET: &str = "bursturl";

/// Filter from `RUST_LOG`, otherwise `default_filter`.
pub fn env_filter(default_filter: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter))
}

/// Install the fmt subscriber, filtered by `RUST_LOG` and otherwise by `default_filter`.
pub fn init_tracing(default_filter: &str) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter(default_filter))
        .try_init();
}

/// Log why a run failed.
pub fn report_failure(err: &RuntimeError) {
    error!(target: BIN_TARGET, "{err}");
}
