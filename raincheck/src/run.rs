//! A complete burst-url run: write the configuration, run the harness, validate and persist the
//! results.
use crate::error::RunError;
use crate::harness::Harness;
use crate::parser;
use crate::report::{print_results, write_response_times};
use raincheck_core::{attach_thresholds, ResultTrack, RunConfig, ThresholdPolicy, TrackVerdict};
use std::path::{Path, PathBuf};
#[allow(unused_imports)]
use tracing::{debug, error, info, instrument, warn};

pub const CONFIG_FILE: &str = "run_burst_url_config_nodes.json";
pub const LOG_FILE: &str = "run_burst_url_log_nodes.txt";
pub const RESULTS_FILE: &str = "run_burst_url_result_nodes.txt";

/// Files written by a run.
#[derive(Clone, Debug, PartialEq)]
pub struct RunPaths {
    pub config: PathBuf,
    pub log: PathBuf,
    pub results: PathBuf,
}

impl RunPaths {
    fn new(config_dir: &Path, results_dir: &Path) -> Self {
        Self {
            config: config_dir.join(CONFIG_FILE),
            log: results_dir.join(LOG_FILE),
            results: results_dir.join(RESULTS_FILE),
        }
    }
}

#[derive(Clone, Debug)]
pub struct RunOutcome {
    /// Parsed tracks with thresholds attached.
    pub tracks: Vec<ResultTrack>,
    pub paths: RunPaths,
}

impl RunOutcome {
    pub fn verdicts(&self) -> Vec<TrackVerdict> {
        self.tracks.iter().map(ResultTrack::verdict).collect()
    }

    /// True unless a statistic of some track exceeded its threshold.
    pub fn passed(&self) -> bool {
        self.tracks.iter().all(|t| t.verdict().passed())
    }
}

/// Burst-url load test run.
///
/// # Example
///
/// ```no_run
/// use raincheck::{BurstUrlRun, Harness, RunConfig};
///
/// # async fn example() -> Result<(), raincheck::RunError> {
/// let outcome = BurstUrlRun::new(RunConfig::default())
///     .harness(Harness::rain("java", ".:rain.jar:workloads/httptest.jar"))
///     .results_dir("./results")
///     .run()
///     .await?;
/// assert!(outcome.passed());
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct BurstUrlRun {
    config: RunConfig,
    harness: Harness,
    config_dir: PathBuf,
    results_dir: PathBuf,
    policy: ThresholdPolicy,
}

impl BurstUrlRun {
    /// Thresholds default to [`RunConfig::threshold_policy`].
    pub fn new(config: RunConfig) -> Self {
        let policy = config.threshold_policy();
        Self {
            config,
            harness: Harness::default(),
            config_dir: PathBuf::from("./config"),
            results_dir: PathBuf::from("./results"),
            policy,
        }
    }

    pub fn harness(mut self, harness: Harness) -> Self {
        self.harness = harness;
        self
    }

    pub fn config_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config_dir = dir.into();
        self
    }

    pub fn results_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.results_dir = dir.into();
        self
    }

    pub fn policy(mut self, policy: ThresholdPolicy) -> Self {
        self.policy = policy;
        self
    }

    #[instrument(name = "run", skip_all, fields(results_dir = %self.results_dir.display()))]
    pub async fn run(self) -> Result<RunOutcome, RunError> {
        let paths = RunPaths::new(&self.config_dir, &self.results_dir);

        for dir in [&self.config_dir, &self.results_dir] {
            tokio::fs::create_dir_all(dir)
                .await
                .map_err(RunError::io(dir.as_path()))?;
        }

        let json = self.config.to_json()?;
        info!("Run configuration: {json}");
        info!("Writing config file {}", paths.config.display());
        tokio::fs::write(&paths.config, &json)
            .await
            .map_err(RunError::io(&paths.config))?;

        let output = self.harness.run(&paths.config).await?;

        info!("Writing output {}", paths.log.display());
        tokio::fs::write(&paths.log, &output)
            .await
            .map_err(RunError::io(&paths.log))?;

        let tracks = attach_thresholds(parser::parse(&output), &self.policy);
        if tracks.is_empty() {
            warn!("The harness output contains no track results");
        }

        #[cfg(feature = "metrics")]
        record_metrics(&tracks);

        info!("Writing results {}", paths.results.display());
        let results = render_results_file(&tracks).map_err(RunError::io(&paths.results))?;
        tokio::fs::write(&paths.results, results)
            .await
            .map_err(RunError::io(&paths.results))?;

        for verdict in tracks.iter().map(ResultTrack::verdict) {
            if verdict.passed() {
                info!("Track {} passed", verdict.name);
            } else {
                warn!(
                    "Track {} exceeded {} threshold(s)",
                    verdict.name,
                    verdict.failures()
                );
            }
        }

        Ok(RunOutcome { tracks, paths })
    }
}

/// The pass/fail table, a blank line, then the raw percentile lines.
fn render_results_file(tracks: &[ResultTrack]) -> std::io::Result<Vec<u8>> {
    let mut buf = vec![];
    print_results(tracks, &mut buf)?;
    buf.push(b'\n');
    write_response_times(tracks, &mut buf)?;
    Ok(buf)
}

#[cfg(feature = "metrics")]
fn record_metrics(tracks: &[ResultTrack]) {
    for track in tracks {
        let name = track.name.clone();
        metrics::gauge!("raincheck_track_throughput", "track" => name.clone())
            .set(track.aggregate_throughput);
        metrics::gauge!("raincheck_track_pct_failed_ops", "track" => name.clone())
            .set(track.pct_failed_ops);
        metrics::gauge!("raincheck_track_pct_overhead_ops", "track" => name.clone())
            .set(track.pct_overhead_ops);

        for (operation, times) in track.op_response_times() {
            metrics::gauge!(
                "raincheck_op_response_time_p90",
                "track" => name.clone(),
                "operation" => operation.clone()
            )
            .set(times.p90);
            metrics::gauge!(
                "raincheck_op_response_time_p99",
                "track" => name.clone(),
                "operation" => operation.clone()
            )
            .set(times.p99);
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use ntest::timeout;
    use std::fs;

    const REPORT: &str = "\
[TRACK: popular] Aggregate throughput: 20.5 ops/sec
[TRACK: popular] % Ops failed: 1
[TRACK: popular] % Ops overhead: 2
[TRACK: popular] Operation BurstUrl(5): p90: 0.3 p99: 0.45
[TRACK: popular] Operation BurstUrl(2): p90: 0.2 p99: 1.75
";

    fn echo_harness(report: &str) -> Harness {
        Harness::command("sh", ["-c".to_string(), format!("printf '%s' '{report}'")])
    }

    #[tokio::test]
    #[timeout(10000)]
    async fn writes_all_files() {
        let dir = tempfile::tempdir().unwrap();
        let outcome = BurstUrlRun::new(RunConfig::default())
            .harness(echo_harness(REPORT))
            .config_dir(dir.path().join("config"))
            .results_dir(dir.path().join("results"))
            .run()
            .await
            .unwrap();

        let config = fs::read_to_string(&outcome.paths.config).unwrap();
        assert_eq!(config, RunConfig::default().to_json().unwrap());
        assert_eq!(fs::read_to_string(&outcome.paths.log).unwrap(), REPORT);

        let results = fs::read_to_string(&outcome.paths.results).unwrap();
        let (table, raw) = results.split_once("\n\n").unwrap();
        assert!(table.starts_with("Track: popular\n"));
        assert_eq!(
            raw,
            "popular,BurstUrl(5),0.3,0.45\npopular,BurstUrl(2),0.2,1.75\n"
        );

        assert_eq!(outcome.tracks.len(), 1);
        let verdict = &outcome.verdicts()[0];
        assert_eq!(verdict.operations[0].p99, raincheck_core::Verdict::Pass);
        // BurstUrl(2) allows 1.5s.
        assert_eq!(verdict.operations[1].p99, raincheck_core::Verdict::Fail);
        assert!(!outcome.passed());
    }

    #[tracing_test::traced_test]
    #[tokio::test]
    async fn empty_output_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let outcome = BurstUrlRun::new(RunConfig::default())
            .harness(Harness::command("true", Vec::<String>::new()))
            .config_dir(dir.path())
            .results_dir(dir.path())
            .run()
            .await
            .unwrap();

        assert!(outcome.tracks.is_empty());
        assert!(outcome.passed());
        assert_eq!(fs::read_to_string(&outcome.paths.results).unwrap(), "\n");
        assert!(logs_contain("no track results"));
    }

    #[tokio::test]
    #[timeout(10000)]
    async fn unwritable_results_dir() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("results");
        fs::write(&blocker, "not a directory").unwrap();

        let err = BurstUrlRun::new(RunConfig::default())
            .harness(echo_harness(REPORT))
            .config_dir(dir.path())
            .results_dir(&blocker)
            .run()
            .await
            .unwrap_err();

        assert!(matches!(err, RunError::Io { path, .. } if path == blocker));
    }

    #[tokio::test]
    #[timeout(10000)]
    async fn custom_policy() {
        let dir = tempfile::tempdir().unwrap();
        let policy = ThresholdPolicy {
            pct_failed_ops: 0.5,
            ..ThresholdPolicy::default()
        };
        let outcome = BurstUrlRun::new(RunConfig::default())
            .harness(echo_harness(REPORT))
            .config_dir(dir.path())
            .results_dir(dir.path())
            .policy(policy)
            .run()
            .await
            .unwrap();

        assert_eq!(outcome.tracks[0].pct_failed_ops_threshold(), Some(0.5));
        assert_eq!(
            outcome.verdicts()[0].pct_failed_ops,
            raincheck_core::Verdict::Fail
        );
    }
}
