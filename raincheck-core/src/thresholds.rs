use crate::{
    ResponseTimes, ResultTrack, TrackThresholds, DEFAULT_LESS_POPULAR_HOST_BURST,
    DEFAULT_NOMINAL_RESPONSE_TIME, DEFAULT_PCT_FAILED_OPS_THRESHOLD,
    DEFAULT_PCT_OVERHEAD_OPS_THRESHOLD, DEFAULT_POPULAR_HOST_BURST,
};
use std::time::Duration;
#[allow(unused_imports)]
use tracing::{debug, trace};

/// Pass/fail policy applied to every track of a burst-url run.
///
/// A burst of size N issues the base url plus N further requests serially, so the response
/// time budget of a burst operation is `nominal_response_time * (N + 1)`, used for both the
/// 90th and the 99th percentile. Only the two burst operation families receive response time
/// thresholds.
#[derive(Clone, Debug, PartialEq)]
pub struct ThresholdPolicy {
    pub pct_failed_ops: f64,
    pub pct_overhead_ops: f64,
    pub nominal_response_time: Duration,
    pub popular_host_burst: u32,
    pub less_popular_host_burst: u32,
}

impl Default for ThresholdPolicy {
    fn default() -> Self {
        Self {
            pct_failed_ops: DEFAULT_PCT_FAILED_OPS_THRESHOLD,
            pct_overhead_ops: DEFAULT_PCT_OVERHEAD_OPS_THRESHOLD,
            nominal_response_time: DEFAULT_NOMINAL_RESPONSE_TIME,
            popular_host_burst: DEFAULT_POPULAR_HOST_BURST,
            less_popular_host_burst: DEFAULT_LESS_POPULAR_HOST_BURST,
        }
    }
}

impl ThresholdPolicy {
    pub fn bursts(mut self, popular_host_burst: u32, less_popular_host_burst: u32) -> Self {
        self.popular_host_burst = popular_host_burst;
        self.less_popular_host_burst = less_popular_host_burst;
        self
    }

    /// Response time budget, in seconds, for a burst of `burst_size`.
    pub fn scaled_response_time(&self, burst_size: u32) -> f64 {
        self.nominal_response_time.as_secs_f64() * (f64::from(burst_size) + 1.)
    }

    /// Thresholds to attach to each track.
    ///
    /// Equal burst sizes name the same operation and yield a single entry.
    pub fn thresholds(&self) -> TrackThresholds {
        [self.popular_host_burst, self.less_popular_host_burst]
            .into_iter()
            .fold(
                TrackThresholds::new()
                    .pct_failed_ops(self.pct_failed_ops)
                    .pct_overhead_ops(self.pct_overhead_ops),
                |thresholds, burst_size| {
                    let budget = self.scaled_response_time(burst_size);
                    thresholds.response_time(
                        &burst_operation_name(burst_size),
                        ResponseTimes::new(budget, budget),
                    )
                },
            )
    }
}

/// Name under which the harness reports a burst of `burst_size`.
pub fn burst_operation_name(burst_size: u32) -> String {
    format!("BurstUrl({burst_size})")
}

/// Attach the thresholds of `policy` to every parsed track.
pub fn attach_thresholds(tracks: Vec<ResultTrack>, policy: &ThresholdPolicy) -> Vec<ResultTrack> {
    let thresholds = policy.thresholds();
    debug!("Attaching thresholds {thresholds:?} to {} tracks", tracks.len());
    tracks
        .into_iter()
        .map(|track| track.with_thresholds(thresholds.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scaling_law() {
        let policy = ThresholdPolicy::default();
        for burst_size in 0..64 {
            assert_eq!(
                policy.scaled_response_time(burst_size),
                0.5 * (burst_size as f64 + 1.)
            );
        }
    }

    #[test]
    fn default_thresholds() {
        let thresholds = ThresholdPolicy::default().thresholds();

        assert_eq!(thresholds.pct_failed_ops, Some(5.0));
        assert_eq!(thresholds.pct_overhead_ops, Some(10.0));
        assert_eq!(
            thresholds.response_times(),
            &[
                ("BurstUrl(5)".to_string(), ResponseTimes::new(3.0, 3.0)),
                ("BurstUrl(2)".to_string(), ResponseTimes::new(1.5, 1.5)),
            ]
        );
    }

    #[test]
    fn equal_bursts_collapse() {
        let thresholds = ThresholdPolicy::default().bursts(3, 3).thresholds();
        assert_eq!(thresholds.response_times().len(), 1);
        assert_eq!(
            thresholds.response_time_for("BurstUrl(3)"),
            Some(ResponseTimes::new(2.0, 2.0))
        );
    }

    #[tracing_test::traced_test]
    #[test]
    fn attaches_to_every_track() {
        let mut a = ResultTrack::new("a");
        a.record_response_times("BurstUrl(5)", ResponseTimes::new(0.1, 0.2));
        a.record_response_times("Other", ResponseTimes::new(0.1, 0.2));
        let b = ResultTrack::new("b");

        let tracks = attach_thresholds(vec![a, b], &ThresholdPolicy::default());

        assert!(logs_contain("Attaching thresholds"));
        for track in &tracks {
            assert_eq!(track.pct_failed_ops_threshold(), Some(5.0));
            assert_eq!(
                track.op_response_time_threshold("BurstUrl(2)"),
                Some(ResponseTimes::new(1.5, 1.5))
            );
            assert_eq!(track.op_response_time_threshold("Other"), None);
        }
        assert_eq!(tracks[0].response_times("Other"), Some(ResponseTimes::new(0.1, 0.2)));
    }
}
