use std::time::Duration;

/// Profile creator used by the burst-url workload.
pub const BURST_URL_PROFILE_CREATOR: &str = "radlab.rain.workload.httptest.BurstUrlProfileCreator";

/// Response time budget for a single request of a burst.
pub const DEFAULT_NOMINAL_RESPONSE_TIME: Duration = Duration::from_millis(500);

/// Maximum acceptable percentage of failed operations.
pub const DEFAULT_PCT_FAILED_OPS_THRESHOLD: f64 = 5.0;

/// Maximum acceptable percentage of overhead operations.
pub const DEFAULT_PCT_OVERHEAD_OPS_THRESHOLD: f64 = 10.0;

pub const DEFAULT_POPULAR_HOST_BURST: u32 = 5;
pub const DEFAULT_LESS_POPULAR_HOST_BURST: u32 = 2;

pub const DEFAULT_PIPE_PORT: u16 = 7851;
