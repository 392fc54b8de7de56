//! Parsing of the harness report into [`ResultTrack`]s.
//!
//! The harness prints its results interleaved with ordinary log output. Every report line
//! carries a track tag followed by one statistic:
//!
//! ```text
//! [TRACK: baseline] Aggregate throughput: 41.7 ops/sec
//! [TRACK: baseline] % Ops failed: 0.25
//! [TRACK: baseline] % Ops overhead: 1.3e-1
//! [TRACK: baseline] Operation BurstUrl(5): p90: 0.912 p99: 1.87
//! ```
//!
//! Anything else is noise. The patterns can be replaced through [`ReportGrammar::builder`].
use crate::error::ParseError;
use lazy_static::lazy_static;
use raincheck_core::{ResponseTimes, ResultTrack};
use regex::{Captures, Regex};
use std::collections::HashMap;
#[allow(unused_imports)]
use tracing::{debug, trace, warn};

pub const DEFAULT_TRACK_TAG: &str = r"\[TRACK:\s*(?P<track>[^\]]+?)\s*\]";
// Statistic values swallow `,<digits>` so that digit grouping (`1,234.5`) and decimal commas
// (`0,25`) fail to parse instead of being cut short at the comma.
pub const DEFAULT_THROUGHPUT: &str = r"(?i)^\s*(?:aggregate\s+throughput|effective\s+load)\b[^:]*:\s*(?P<value>[^\s,;%]+(?:,\d+)*)";
pub const DEFAULT_FAILED_OPS: &str =
    r"(?i)^\s*%\s*ops\s+failed\s*:\s*(?P<value>[^\s,;%]+(?:,\d+)*)";
pub const DEFAULT_OVERHEAD_OPS: &str =
    r"(?i)^\s*%\s*ops\s+overhead\s*:\s*(?P<value>[^\s,;%]+(?:,\d+)*)";
pub const DEFAULT_OPERATION: &str = r"(?i)^\s*operation\s+(?P<op>.+?)\s*:\s*p90\s*[:=]\s*(?P<p90>[^\s,;]+)[\s,;]+p99\s*[:=]\s*(?P<p99>[^\s,;]+)";

lazy_static! {
    static ref DEFAULT_GRAMMAR: ReportGrammar = ReportGrammar::default();
}

/// Parse harness output with the default grammar.
///
/// Tracks are returned in the order in which they first appear in `output`.
pub fn parse(output: &str) -> Vec<ResultTrack> {
    DEFAULT_GRAMMAR.parse(output)
}

/// Line patterns recognised in the harness report.
#[derive(Clone, Debug)]
pub struct ReportGrammar {
    track_tag: Regex,
    throughput: Regex,
    failed_ops: Regex,
    overhead_ops: Regex,
    operation: Regex,
}

impl Default for ReportGrammar {
    fn default() -> Self {
        // The default patterns are constants and covered by tests.
        Self {
            track_tag: Regex::new(DEFAULT_TRACK_TAG).unwrap(),
            throughput: Regex::new(DEFAULT_THROUGHPUT).unwrap(),
            failed_ops: Regex::new(DEFAULT_FAILED_OPS).unwrap(),
            overhead_ops: Regex::new(DEFAULT_OVERHEAD_OPS).unwrap(),
            operation: Regex::new(DEFAULT_OPERATION).unwrap(),
        }
    }
}

enum Statistic {
    Throughput(Option<f64>),
    FailedOps(Option<f64>),
    OverheadOps(Option<f64>),
    Operation(String, Option<ResponseTimes>),
}

impl ReportGrammar {
    pub fn builder() -> ReportGrammarBuilder {
        ReportGrammarBuilder::default()
    }

    pub fn parse(&self, output: &str) -> Vec<ResultTrack> {
        let mut tracks: Vec<ResultTrack> = vec![];
        let mut index: HashMap<String, usize> = HashMap::new();

        for (lineno, line) in output.lines().enumerate() {
            let Some(tag) = self.track_tag.captures(line) else {
                continue;
            };
            let (Some(whole), Some(name)) = (tag.get(0), tag.name("track")) else {
                continue;
            };
            let name = name.as_str().trim();
            if name.is_empty() {
                trace!("line {}: empty track name", lineno + 1);
                continue;
            }

            let Some(statistic) = self.statistic(&line[whole.end()..]) else {
                trace!("line {}: unrecognised report line for track {name}", lineno + 1);
                continue;
            };

            let idx = *index.entry(name.to_string()).or_insert_with(|| {
                debug!("Found track {name} on line {}", lineno + 1);
                tracks.push(ResultTrack::new(name));
                tracks.len() - 1
            });
            let track = &mut tracks[idx];

            match statistic {
                Statistic::Throughput(Some(v)) => track.aggregate_throughput = v,
                Statistic::FailedOps(Some(v)) => track.pct_failed_ops = v,
                Statistic::OverheadOps(Some(v)) => track.pct_overhead_ops = v,
                Statistic::Operation(op, Some(times)) => track.record_response_times(&op, times),
                Statistic::Operation(op, None) => {
                    warn!(
                        "line {}: dropping operation {op} of track {name}, unparseable percentile",
                        lineno + 1
                    );
                }
                Statistic::Throughput(None)
                | Statistic::FailedOps(None)
                | Statistic::OverheadOps(None) => {
                    warn!("line {}: unparseable value for track {name}", lineno + 1);
                }
            }
        }

        debug!("Parsed {} tracks", tracks.len());
        tracks
    }

    fn statistic(&self, body: &str) -> Option<Statistic> {
        if let Some(caps) = self.operation.captures(body) {
            let times = match (number(&caps, "p90"), number(&caps, "p99")) {
                (Some(p90), Some(p99)) => Some(ResponseTimes::new(p90, p99)),
                _ => None,
            };
            let op = caps.name("op")?.as_str().trim().to_string();
            return Some(Statistic::Operation(op, times));
        }

        if let Some(caps) = self.throughput.captures(body) {
            return Some(Statistic::Throughput(number(&caps, "value")));
        }

        if let Some(caps) = self.failed_ops.captures(body) {
            return Some(Statistic::FailedOps(number(&caps, "value")));
        }

        self.overhead_ops
            .captures(body)
            .map(|caps| Statistic::OverheadOps(number(&caps, "value")))
    }
}

/// Floating point value of capture group `group`, any precision or exponent notation.
fn number(caps: &Captures<'_>, group: &str) -> Option<f64> {
    caps.name(group)?
        .as_str()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
}

/// Builder for a [`ReportGrammar`] with custom patterns.
///
/// Unset patterns fall back to the defaults. Replacement patterns must keep the capture
/// groups of the pattern they replace.
#[derive(Debug, Default)]
pub struct ReportGrammarBuilder {
    track_tag: Option<String>,
    throughput: Option<String>,
    failed_ops: Option<String>,
    overhead_ops: Option<String>,
    operation: Option<String>,
}

impl ReportGrammarBuilder {
    /// Pattern locating the track tag, with group `track`.
    pub fn track_tag(mut self, pattern: &str) -> Self {
        self.track_tag = Some(pattern.to_string());
        self
    }

    /// Pattern for the aggregate throughput, with group `value`.
    pub fn throughput(mut self, pattern: &str) -> Self {
        self.throughput = Some(pattern.to_string());
        self
    }

    /// Pattern for the failed operations percentage, with group `value`.
    pub fn failed_ops(mut self, pattern: &str) -> Self {
        self.failed_ops = Some(pattern.to_string());
        self
    }

    /// Pattern for the overhead operations percentage, with group `value`.
    pub fn overhead_ops(mut self, pattern: &str) -> Self {
        self.overhead_ops = Some(pattern.to_string());
        self
    }

    /// Pattern for an operation's percentiles, with groups `op`, `p90` and `p99`.
    pub fn operation(mut self, pattern: &str) -> Self {
        self.operation = Some(pattern.to_string());
        self
    }

    pub fn build(self) -> Result<ReportGrammar, ParseError> {
        Ok(ReportGrammar {
            track_tag: compile("track tag", self.track_tag, DEFAULT_TRACK_TAG, &["track"])?,
            throughput: compile("throughput", self.throughput, DEFAULT_THROUGHPUT, &["value"])?,
            failed_ops: compile("failed ops", self.failed_ops, DEFAULT_FAILED_OPS, &["value"])?,
            overhead_ops: compile(
                "overhead ops",
                self.overhead_ops,
                DEFAULT_OVERHEAD_OPS,
                &["value"],
            )?,
            operation: compile(
                "operation",
                self.operation,
                DEFAULT_OPERATION,
                &["op", "p90", "p99"],
            )?,
        })
    }
}

fn compile(
    name: &'static str,
    pattern: Option<String>,
    default: &str,
    groups: &[&'static str],
) -> Result<Regex, ParseError> {
    let regex = Regex::new(pattern.as_deref().unwrap_or(default))
        .map_err(|source| ParseError::Pattern { name, source })?;

    for &group in groups {
        if !regex.capture_names().flatten().any(|n| n == group) {
            return Err(ParseError::MissingGroup { name, group });
        }
    }

    Ok(regex)
}
