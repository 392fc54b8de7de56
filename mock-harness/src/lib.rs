//! Stand-in for the Rain harness.
//!
//! Reads a run configuration and prints a report with plausible numbers for every track, wrapped
//! in the kind of log chatter the real harness produces. No load is generated.
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, LogNormal};
use raincheck_core::{burst_operation_name, ResponseTimes, RunConfig, ThresholdPolicy};
use std::fmt::{self, Write};

pub mod prelude {
    pub use crate::{MockReport, MockTrack};
}

#[derive(Debug, Clone, PartialEq)]
pub struct MockTrack {
    pub name: String,
    pub aggregate_throughput: f64,
    pub pct_failed_ops: f64,
    pub pct_overhead_ops: f64,
    pub operations: Vec<(String, ResponseTimes)>,
}

/// Report printed by the mock harness.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MockReport {
    pub tracks: Vec<MockTrack>,
    /// Log lines interleaved with the report.
    pub noise: bool,
}

impl MockReport {
    /// Generate `tracks` tracks for the burst operations of `config`.
    ///
    /// `load` scales the response times relative to their budget: around `0.5` everything
    /// passes, above `1.0` most percentiles fail.
    pub fn generate(config: &RunConfig, tracks: usize, load: f64, seed: u64) -> Self {
        let mut rng = SmallRng::seed_from_u64(seed);
        let policy = config.threshold_policy();
        let params = &config.profiles_creator_class_params;
        let bursts = [
            params.burst_size_per_popular_host,
            params.burst_size_per_less_popular_host,
        ];

        let tracks = (1..=tracks)
            .map(|n| MockTrack {
                name: format!("burst-{n:02}"),
                aggregate_throughput: rng.gen_range(5.0..200.0),
                pct_failed_ops: rng.gen_range(0.0..2.0),
                pct_overhead_ops: rng.gen_range(0.0..5.0),
                operations: bursts
                    .iter()
                    .map(|&burst| {
                        (
                            burst_operation_name(burst),
                            response_times(&mut rng, &policy, burst, load),
                        )
                    })
                    .fold(vec![], |mut ops, (name, times)| {
                        if !ops.iter().any(|(n, _)| n == &name) {
                            ops.push((name, times));
                        }
                        ops
                    }),
            })
            .collect();

        Self {
            tracks,
            noise: true,
        }
    }

    pub fn render(&self) -> String {
        self.to_string()
    }
}

fn response_times(
    rng: &mut SmallRng,
    policy: &ThresholdPolicy,
    burst: u32,
    load: f64,
) -> ResponseTimes {
    let median = (policy.scaled_response_time(burst) * load).max(1e-3);
    // sigma of 0.25 puts the 99th percentile at roughly 1.8x the median.
    let distr = match LogNormal::new(median.ln(), 0.25) {
        Ok(distr) => distr,
        Err(_) => return ResponseTimes::new(median, median),
    };

    let mut samples: Vec<f64> = (0..1000).map(|_| distr.sample(rng)).collect();
    samples.sort_by(f64::total_cmp);
    ResponseTimes::new(samples[899], samples[989])
}

impl fmt::Display for MockReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = String::new();
        if self.noise {
            writeln!(out, "INFO  [main] Rain started")?;
            writeln!(out, "INFO  [main] Starting scenario (threads)")?;
        }

        for track in &self.tracks {
            let tag = format!("[TRACK: {}]", track.name);
            if self.noise {
                writeln!(out, "DEBUG [scoreboard] {tag} final scorecard")?;
            }
            writeln!(
                out,
                "{tag} Aggregate throughput: {:.4} ops/sec",
                track.aggregate_throughput
            )?;
            writeln!(out, "{tag} % Ops failed: {:.4}", track.pct_failed_ops)?;
            writeln!(out, "{tag} % Ops overhead: {:.4}", track.pct_overhead_ops)?;
            for (name, times) in &track.operations {
                writeln!(
                    out,
                    "{tag} Operation {name}: p90: {:e} p99: {:e}",
                    times.p90, times.p99
                )?;
            }
        }

        if self.noise {
            writeln!(out, "INFO  [main] Rain stopped")?;
        }
        f.write_str(&out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deterministic_for_a_seed() {
        let config = RunConfig::default();
        assert_eq!(
            MockReport::generate(&config, 3, 0.5, 7),
            MockReport::generate(&config, 3, 0.5, 7)
        );
    }

    #[test]
    fn one_operation_per_distinct_burst() {
        let mut config = RunConfig::default();
        let report = MockReport::generate(&config, 1, 0.5, 1);
        let names: Vec<_> = report.tracks[0].operations.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, ["BurstUrl(5)", "BurstUrl(2)"]);

        config.profiles_creator_class_params.burst_size_per_less_popular_host = 5;
        let report = MockReport::generate(&config, 1, 0.5, 1);
        assert_eq!(report.tracks[0].operations.len(), 1);
    }

    #[test]
    fn percentiles_are_ordered() {
        let report = MockReport::generate(&RunConfig::default(), 4, 0.5, 11);
        for track in &report.tracks {
            for (_, times) in &track.operations {
                assert!(times.p90 > 0.);
                assert!(times.p90 <= times.p99);
            }
        }
    }

    #[test]
    fn renders_report_lines() {
        let report = MockReport {
            tracks: vec![MockTrack {
                name: "t".to_string(),
                aggregate_throughput: 1.5,
                pct_failed_ops: 0.25,
                pct_overhead_ops: 2.,
                operations: vec![("BurstUrl(5)".to_string(), ResponseTimes::new(0.3, 0.45))],
            }],
            noise: false,
        };

        assert_eq!(
            report.render(),
            "\
[TRACK: t] Aggregate throughput: 1.5000 ops/sec
[TRACK: t] % Ops failed: 0.2500
[TRACK: t] % Ops overhead: 2.0000
[TRACK: t] Operation BurstUrl(5): p90: 3e-1 p99: 4.5e-1
"
        );
    }
}
