use std::fmt;

/// Observed (or maximum acceptable) response time percentiles of an operation, in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ResponseTimes {
    pub p90: f64,
    pub p99: f64,
}

impl ResponseTimes {
    pub fn new(p90: f64, p99: f64) -> Self {
        Self { p90, p99 }
    }
}

/// Outcome of a single named track of a harness run.
///
/// Statistics are populated by the parser. Thresholds start out unset and are attached once
/// through [`ResultTrack::with_thresholds`]. Statistics the harness never reported stay at `0.0`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ResultTrack {
    pub name: String,
    pub aggregate_throughput: f64,
    pub pct_failed_ops: f64,
    pub pct_overhead_ops: f64,
    op_response_times: Vec<(String, ResponseTimes)>,
    thresholds: TrackThresholds,
}

impl ResultTrack {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }

    /// Record the percentiles of an operation.
    ///
    /// Operations keep the position in which they were first recorded; recording the same
    /// operation again only replaces its values.
    pub fn record_response_times(&mut self, operation: &str, times: ResponseTimes) {
        upsert(&mut self.op_response_times, operation, times);
    }

    /// Observed percentiles per operation, in discovery order.
    pub fn op_response_times(&self) -> &[(String, ResponseTimes)] {
        &self.op_response_times
    }

    pub fn response_times(&self, operation: &str) -> Option<ResponseTimes> {
        lookup(&self.op_response_times, operation)
    }

    /// Consume the parsed track and return it with `thresholds` attached.
    ///
    /// Any previously attached thresholds are replaced.
    pub fn with_thresholds(self, thresholds: TrackThresholds) -> Self {
        Self { thresholds, ..self }
    }

    pub fn thresholds(&self) -> &TrackThresholds {
        &self.thresholds
    }

    pub fn pct_failed_ops_threshold(&self) -> Option<f64> {
        self.thresholds.pct_failed_ops
    }

    pub fn pct_overhead_ops_threshold(&self) -> Option<f64> {
        self.thresholds.pct_overhead_ops
    }

    pub fn op_response_time_threshold(&self, operation: &str) -> Option<ResponseTimes> {
        self.thresholds.response_time_for(operation)
    }

    /// Evaluate every statistic against the attached thresholds.
    pub fn verdict(&self) -> TrackVerdict {
        let operations = self
            .op_response_times
            .iter()
            .map(|(operation, observed)| {
                let threshold = self.op_response_time_threshold(operation);
                OperationVerdict {
                    operation: operation.clone(),
                    p90: Verdict::check(observed.p90, threshold.map(|t| t.p90)),
                    p99: Verdict::check(observed.p99, threshold.map(|t| t.p99)),
                }
            })
            .collect();

        TrackVerdict {
            name: self.name.clone(),
            pct_failed_ops: Verdict::check(self.pct_failed_ops, self.thresholds.pct_failed_ops),
            pct_overhead_ops: Verdict::check(
                self.pct_overhead_ops,
                self.thresholds.pct_overhead_ops,
            ),
            operations,
        }
    }
}

/// Pass/fail limits for a [`ResultTrack`].
///
/// `None` and missing operations mean that no threshold is configured, which is reported as
/// [`Verdict::Unvalidated`] rather than as a pass.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TrackThresholds {
    pub pct_failed_ops: Option<f64>,
    pub pct_overhead_ops: Option<f64>,
    op_response_times: Vec<(String, ResponseTimes)>,
}

impl TrackThresholds {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pct_failed_ops(mut self, threshold: f64) -> Self {
        self.pct_failed_ops = Some(threshold);
        self
    }

    pub fn pct_overhead_ops(mut self, threshold: f64) -> Self {
        self.pct_overhead_ops = Some(threshold);
        self
    }

    /// Set the maximum acceptable percentiles for `operation`.
    pub fn response_time(mut self, operation: &str, threshold: ResponseTimes) -> Self {
        upsert(&mut self.op_response_times, operation, threshold);
        self
    }

    pub fn response_time_for(&self, operation: &str) -> Option<ResponseTimes> {
        lookup(&self.op_response_times, operation)
    }

    pub fn response_times(&self) -> &[(String, ResponseTimes)] {
        &self.op_response_times
    }
}

/// Result of comparing an observed value against a threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Pass,
    Fail,
    Unvalidated,
}

impl Verdict {
    /// `Pass` iff `observed <= threshold`.
    pub fn check(observed: f64, threshold: Option<f64>) -> Self {
        match threshold {
            None => Verdict::Unvalidated,
            Some(threshold) if observed <= threshold => Verdict::Pass,
            Some(_) => Verdict::Fail,
        }
    }

    pub fn is_fail(self) -> bool {
        self == Verdict::Fail
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Verdict::Pass => "pass",
            Verdict::Fail => "fail",
            Verdict::Unvalidated => "unvalidated",
        };
        // Padding is honoured so the verdict can be used in table columns.
        f.pad(s)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OperationVerdict {
    pub operation: String,
    pub p90: Verdict,
    pub p99: Verdict,
}

/// Per-statistic verdicts of a track.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackVerdict {
    pub name: String,
    pub pct_failed_ops: Verdict,
    pub pct_overhead_ops: Verdict,
    pub operations: Vec<OperationVerdict>,
}

impl TrackVerdict {
    fn verdicts(&self) -> impl Iterator<Item = Verdict> + '_ {
        [self.pct_failed_ops, self.pct_overhead_ops]
            .into_iter()
            .chain(self.operations.iter().flat_map(|op| [op.p90, op.p99]))
    }

    /// True unless some statistic exceeded its threshold. Unvalidated statistics don't count.
    pub fn passed(&self) -> bool {
        !self.verdicts().any(Verdict::is_fail)
    }

    pub fn failures(&self) -> usize {
        self.verdicts().filter(|v| v.is_fail()).count()
    }
}

fn upsert(entries: &mut Vec<(String, ResponseTimes)>, key: &str, value: ResponseTimes) {
    match entries.iter_mut().find(|(k, _)| k == key) {
        Some((_, existing)) => *existing = value,
        None => entries.push((key.to_string(), value)),
    }
}

fn lookup(entries: &[(String, ResponseTimes)], key: &str) -> Option<ResponseTimes> {
    entries.iter().find(|(k, _)| k == key).map(|(_, v)| *v)
}
