//! Run the Rain burst-url workload and validate its results.
//!
//! A run writes the [`RunConfig`] for the harness, launches the harness, parses its report into
//! one [`ResultTrack`] per track and checks each track against a [`ThresholdPolicy`]:
//!
//! ```
//! use raincheck::prelude::*;
//!
//! let output = "\
//! [TRACK: baseline] % Ops failed: 3.0
//! [TRACK: baseline] % Ops overhead: 12.0
//! [TRACK: baseline] Operation BurstUrl(5): p90: 0.3 p99: 0.45
//! ";
//!
//! let tracks = attach_thresholds(parse(output), &ThresholdPolicy::default());
//! let verdict = tracks[0].verdict();
//! assert_eq!(verdict.pct_failed_ops, Verdict::Pass);
//! assert_eq!(verdict.pct_overhead_ops, Verdict::Fail);
//! ```
pub mod error;
pub mod harness;
pub mod parser;
pub mod report;
pub mod run;

pub use error::{HarnessError, ParseError, RunError};
pub use harness::Harness;
pub use parser::{parse, ReportGrammar};
pub use raincheck_core::*;
pub use report::{print_results, render_results, write_response_times};
pub use run::{BurstUrlRun, RunOutcome, RunPaths};

pub mod prelude {
    pub use crate::parser::{parse, ReportGrammar};
    pub use crate::report::{print_results, write_response_times};
    pub use crate::run::BurstUrlRun;
    pub use raincheck_core::{
        attach_thresholds, ResponseTimes, ResultTrack, RunConfig, ThresholdPolicy,
        TrackThresholds, Verdict,
    };
}
