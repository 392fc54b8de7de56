//! Human readable pass/fail report of parsed tracks.
use raincheck_core::{ResultTrack, Verdict};
use std::fmt;
use std::io;

const LABEL_WIDTH: usize = 22;
const VALUE_WIDTH: usize = 10;

/// Write the pass/fail table for `tracks` to `sink`, one section per track in order.
pub fn print_results<W: io::Write>(tracks: &[ResultTrack], sink: &mut W) -> io::Result<()> {
    write!(sink, "{}", ResultsTable(tracks))?;
    sink.flush()
}

/// Write one `name,operation,p90,p99` line per operation per track.
pub fn write_response_times<W: io::Write>(tracks: &[ResultTrack], sink: &mut W) -> io::Result<()> {
    for track in tracks {
        for (operation, times) in track.op_response_times() {
            writeln!(sink, "{},{},{},{}", track.name, operation, times.p90, times.p99)?;
        }
    }
    sink.flush()
}

pub fn render_results(tracks: &[ResultTrack]) -> String {
    ResultsTable(tracks).to_string()
}

/// Display adapter rendering the pass/fail table.
///
/// Values are printed at full precision so that a value just over its threshold never shows
/// up equal to it.
#[derive(Debug, Clone, Copy)]
pub struct ResultsTable<'a>(pub &'a [ResultTrack]);

impl fmt::Display for ResultsTable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, track) in self.0.iter().enumerate() {
            if idx > 0 {
                writeln!(f)?;
            }
            write_track(f, track)?;
        }
        Ok(())
    }
}

fn write_track(f: &mut fmt::Formatter<'_>, track: &ResultTrack) -> fmt::Result {
    writeln!(f, "Track: {}", track.name)?;
    writeln!(
        f,
        "  {:<LABEL_WIDTH$} {:>VALUE_WIDTH$} ops/sec",
        "Aggregate throughput", track.aggregate_throughput
    )?;
    write_rate(
        f,
        "% ops failed",
        track.pct_failed_ops,
        track.pct_failed_ops_threshold(),
    )?;
    write_rate(
        f,
        "% ops overhead",
        track.pct_overhead_ops,
        track.pct_overhead_ops_threshold(),
    )?;

    let operations = track.op_response_times();
    if operations.is_empty() {
        return writeln!(f, "  (no operations reported)");
    }

    let width = operations
        .iter()
        .map(|(name, _)| name.len())
        .max()
        .unwrap_or_default()
        .max("Operation".len());

    writeln!(
        f,
        "  {:<width$}  {:>VALUE_WIDTH$} {:>VALUE_WIDTH$} {:>VALUE_WIDTH$} {:>VALUE_WIDTH$}  {:<11} {:<11}",
        "Operation", "p90", "p99", "max p90", "max p99", "p90", "p99"
    )?;
    for (name, observed) in operations {
        let threshold = track.op_response_time_threshold(name);
        let max_p90 = threshold.map(|t| t.p90);
        let max_p99 = threshold.map(|t| t.p99);
        writeln!(
            f,
            "  {:<width$}  {:>VALUE_WIDTH$} {:>VALUE_WIDTH$} {:>VALUE_WIDTH$} {:>VALUE_WIDTH$}  {:<11} {}",
            name,
            observed.p90,
            observed.p99,
            Threshold(max_p90),
            Threshold(max_p99),
            Verdict::check(observed.p90, max_p90),
            Verdict::check(observed.p99, max_p99),
        )?;
    }
    Ok(())
}

fn write_rate(
    f: &mut fmt::Formatter<'_>,
    label: &str,
    value: f64,
    threshold: Option<f64>,
) -> fmt::Result {
    writeln!(
        f,
        "  {:<LABEL_WIDTH$} {:>VALUE_WIDTH$} (threshold {:>VALUE_WIDTH$}) {}",
        label,
        value,
        Threshold(threshold),
        Verdict::check(value, threshold),
    )
}

struct Threshold(Option<f64>);

impl fmt::Display for Threshold {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(threshold) => f.pad(&threshold.to_string()),
            None => f.pad("-"),
        }
    }
}
