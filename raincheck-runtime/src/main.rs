use clap::Parser;
use raincheck_runtime::{init_tracing, report_failure, BurstUrlCli, DEFAULT_LOG_FILTER};
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing(DEFAULT_LOG_FILTER);

    let cli = BurstUrlCli::parse();
    match raincheck_runtime::run(cli).await {
        Ok(outcome) => {
            println!("Results written to {}", outcome.paths.results.display());
            ExitCode::SUCCESS
        }
        Err(err) => {
            report_failure(&err);
            ExitCode::FAILURE
        }
    }
}
