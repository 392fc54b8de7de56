mod utils;
#[allow(unused)]
use utils::*;

use mock_harness::MockReport;
use raincheck::prelude::*;
use raincheck::render_results;

fn validate(report: &MockReport, config: &RunConfig) -> Vec<ResultTrack> {
    attach_thresholds(parse(&report.render()), &config.threshold_policy())
}

#[test]
fn parses_every_generated_track() {
    init();

    let config = RunConfig::default();
    let report = MockReport::generate(&config, 4, 0.4, 3);
    let tracks = validate(&report, &config);

    assert_eq!(tracks.len(), 4);
    for (track, expected) in tracks.iter().zip(&report.tracks) {
        assert_eq!(track.name, expected.name);
        assert!((track.aggregate_throughput - expected.aggregate_throughput).abs() < 1e-3);
        assert!((track.pct_failed_ops - expected.pct_failed_ops).abs() < 1e-3);
        assert_eq!(track.op_response_times(), expected.operations.as_slice());
    }
}

#[test]
fn light_load_passes() {
    init();

    let config = RunConfig::default();
    let tracks = validate(&MockReport::generate(&config, 5, 0.4, 17), &config);

    for track in &tracks {
        let verdict = track.verdict();
        assert!(verdict.passed(), "{verdict:?}");
        assert_eq!(verdict.operations.len(), 2);
    }
}

#[test]
fn overload_fails_response_times() {
    init();

    let config = RunConfig::default();
    let tracks = validate(&MockReport::generate(&config, 2, 1.5, 17), &config);

    for track in &tracks {
        let verdict = track.verdict();
        assert!(!verdict.passed());
        assert_eq!(verdict.pct_failed_ops, Verdict::Pass);
        assert!(verdict.operations.iter().all(|op| op.p90 == Verdict::Fail));
    }
}

#[test]
fn custom_burst_sizes() {
    init();

    let mut config = RunConfig::default();
    config.profiles_creator_class_params.burst_size_per_popular_host = 9;
    config.profiles_creator_class_params.burst_size_per_less_popular_host = 1;
    let tracks = validate(&MockReport::generate(&config, 1, 0.4, 5), &config);

    let track = &tracks[0];
    assert_eq!(
        track.op_response_time_threshold("BurstUrl(9)"),
        Some(ResponseTimes::new(5.0, 5.0))
    );
    assert_eq!(
        track.op_response_time_threshold("BurstUrl(1)"),
        Some(ResponseTimes::new(1.0, 1.0))
    );
    assert!(track.verdict().passed());
}

#[test]
fn results_table_lists_tracks() {
    init();

    let config = RunConfig::default();
    let tracks = validate(&MockReport::generate(&config, 2, 0.4, 1), &config);
    let table = render_results(&tracks);

    assert!(table.contains("Track: burst-01"));
    assert!(table.contains("Track: burst-02"));
    assert!(table.contains("BurstUrl(5)"));
    assert!(table
        .lines()
        .all(|line| !line.contains("fail ") && !line.ends_with("fail")));

    let mut raw = vec![];
    write_response_times(&tracks, &mut raw).unwrap();
    let raw = String::from_utf8(raw).unwrap();
    assert_eq!(raw.lines().count(), 4);
    assert!(raw.starts_with("burst-01,BurstUrl(5),"));
}
