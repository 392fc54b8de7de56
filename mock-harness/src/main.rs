use anyhow::Context;
use clap::Parser;
use mock_harness::MockReport;
use raincheck_core::RunConfig;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Prints a made-up burst-url report for a run configuration.
#[derive(Parser, Debug)]
#[command(name = "mock-harness")]
struct Args {
    #[arg(long, default_value_t = 3)]
    tracks: usize,

    /// Response times relative to their budget
    #[arg(long, default_value_t = 0.5)]
    load: f64,

    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Omit the log chatter around the report
    #[arg(long)]
    quiet: bool,

    /// Run configuration written by raincheck
    config: PathBuf,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("mock_harness=info")),
        )
        .init();

    let args = Args::parse();

    let json = std::fs::read_to_string(&args.config)
        .with_context(|| format!("reading {}", args.config.display()))?;
    let config: RunConfig = serde_json::from_str(&json)
        .with_context(|| format!("parsing {}", args.config.display()))?;

    info!(
        "Generating {} tracks for bursts {}/{}",
        args.tracks,
        config.profiles_creator_class_params.burst_size_per_popular_host,
        config.profiles_creator_class_params.burst_size_per_less_popular_host
    );

    let mut report = MockReport::generate(&config, args.tracks, args.load, args.seed);
    report.noise = !args.quiet;
    print!("{report}");

    Ok(())
}
