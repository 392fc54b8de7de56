//! Command line runtime for burst-url runs.
//!
//! Parses the command line into a [`RunConfig`], a [`Harness`] and the output directories, then
//! performs the run.
use crate::error::RuntimeError;
use clap::Parser;
use raincheck::harness::{DEFAULT_CLASSPATH, DEFAULT_JAVA};
use raincheck::{
    BurstUrlRun, GeneratorParameters, Harness, ProfileCreatorParams, RunConfig, RunOutcome, Timing,
};
use std::path::PathBuf;
use std::time::Duration;
#[allow(unused)]
use tracing::{debug, error, info, instrument, warn};

const DEFAULT_RAMP: Duration = Duration::from_secs(10);

/// Run the Rain burst-url workload and validate its per-track results.
#[derive(Parser, Debug, Clone)]
#[command(name = "bursturl", version)]
pub struct BurstUrlCli {
    /// Directory receiving the raw output and the results
    #[arg(long, default_value = "./results")]
    pub results_dir: PathBuf,

    /// Directory receiving the generated run configuration
    #[arg(long, default_value = "./config")]
    pub config_dir: PathBuf,

    /// Steady state duration of the run, in seconds
    #[arg(long, default_value_t = 60)]
    pub duration: u64,

    /// File listing the target hosts
    #[arg(long)]
    pub hostlist: Option<String>,

    /// Fraction of hosts that are popular
    #[arg(long, default_value_t = 0.2, value_parser = parse_fraction)]
    pub popular_hosts: f64,

    /// Mean think time between bursts, in seconds
    #[arg(long, default_value = "5", value_parser = parse_seconds)]
    pub think_time: Duration,

    #[arg(long, default_value_t = 25)]
    pub popular_host_users: u32,

    #[arg(long, default_value_t = 5)]
    pub less_popular_host_users: u32,

    /// Burst size for popular hosts
    #[arg(long, default_value_t = raincheck::DEFAULT_POPULAR_HOST_BURST)]
    pub popular_host_burst: u32,

    /// Burst size for less popular hosts
    #[arg(long, default_value_t = raincheck::DEFAULT_LESS_POPULAR_HOST_BURST)]
    pub less_popular_host_burst: u32,

    /// Milliseconds to wait for an http connection
    #[arg(long, default_value_t = 1000)]
    pub connection_timeout: u64,

    /// Milliseconds to wait for data from the server
    #[arg(long, default_value_t = 1000)]
    pub socket_timeout: u64,

    #[arg(long, default_value_t = raincheck::DEFAULT_PIPE_PORT)]
    pub pipe_port: u16,

    /// Mean response time sampling interval
    #[arg(long, default_value_t = 100)]
    pub sample_interval: u64,

    /// Java executable used to launch Rain
    #[arg(long, default_value = DEFAULT_JAVA)]
    pub java: PathBuf,

    /// Classpath containing Rain and the httptest workload
    #[arg(long, default_value = DEFAULT_CLASSPATH)]
    pub classpath: String,

    /// Kill the harness after this long, e.g. `15m`
    #[arg(long, value_parser = humantime::parse_duration)]
    pub timeout: Option<Duration>,

    /// Exit with a failure when a track exceeds a threshold
    #[arg(long)]
    pub fail_on_violation: bool,

    /// Harness to launch instead of Rain, e.g. `-- mock-harness --seed 7`
    #[arg(last = true, value_name = "HARNESS")]
    pub harness_cmd: Vec<String>,
}

impl BurstUrlCli {
    pub fn run_config(&self) -> RunConfig {
        RunConfig {
            profiles_creator_class_params: ProfileCreatorParams {
                host_list_file: self.hostlist.clone().unwrap_or_default(),
                popular_host_fraction: self.popular_hosts,
                users_per_popular_host: self.popular_host_users,
                users_per_less_popular_host: self.less_popular_host_users,
                mean_think_time: self.think_time,
                burst_size_per_popular_host: self.popular_host_burst,
                burst_size_per_less_popular_host: self.less_popular_host_burst,
                mean_response_time_sampling_interval: self.sample_interval,
                generator_parameters: GeneratorParameters {
                    connection_timeout_msecs: Duration::from_millis(self.connection_timeout),
                    socket_timeout_msecs: Duration::from_millis(self.socket_timeout),
                },
            },
            timing: Timing {
                ramp_up: DEFAULT_RAMP,
                duration: Duration::from_secs(self.duration),
                ramp_down: DEFAULT_RAMP,
            },
            pipe_port: self.pipe_port,
            ..RunConfig::default()
        }
    }

    pub fn harness(&self) -> Harness {
        let harness = match self.harness_cmd.split_first() {
            Some((program, args)) => Harness::command(program, args),
            None => Harness::rain(&self.java, &self.classpath),
        };

        match self.timeout {
            Some(timeout) => harness.timeout(timeout),
            None => harness,
        }
    }

    pub fn burst_url_run(&self) -> BurstUrlRun {
        BurstUrlRun::new(self.run_config())
            .harness(self.harness())
            .config_dir(&self.config_dir)
            .results_dir(&self.results_dir)
    }
}

/// Perform the run described by `cli`.
#[instrument(name = "bursturl", skip_all)]
pub async fn run(cli: BurstUrlCli) -> Result<RunOutcome, RuntimeError> {
    info!(
        "Running burst-url test for {} with bursts {}/{}",
        humantime::format_duration(Duration::from_secs(cli.duration)),
        cli.popular_host_burst,
        cli.less_popular_host_burst
    );

    let outcome = cli.burst_url_run().run().await?;

    if cli.fail_on_violation {
        let failures: usize = outcome.verdicts().iter().map(|v| v.failures()).sum();
        if failures > 0 {
            return Err(RuntimeError::ThresholdsExceeded(failures));
        }
    }

    Ok(outcome)
}

fn parse_fraction(s: &str) -> Result<f64, String> {
    let value: f64 = s.parse().map_err(|e| format!("{e}"))?;
    if (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(format!("{value} is not within 0..=1"))
    }
}

fn parse_seconds(s: &str) -> Result<Duration, String> {
    let secs: f64 = s.parse().map_err(|e| format!("{e}"))?;
    Duration::try_from_secs_f64(secs).map_err(|e| format!("{e}"))
}
