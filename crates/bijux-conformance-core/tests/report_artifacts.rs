// SPDX-License-Identifier: Apache-2.0

mod support;

use std::fs;

use bijux_conformance_adapters::{AdapterError, AtomicFileSink, DeniedSink, MemorySink};
use bijux_conformance_core::summary::{render_json, summary_value};
use bijux_conformance_core::{run_report, ArtifactKind};
use bijux_conformance_model::{ExitCode, FeedEntry};
use chrono::{DateTime, Utc};

fn timestamp() -> DateTime<Utc> {
    bijux_conformance_core::config::parse_timestamp("2024-05-01T09:00:00Z").expect("timestamp")
}

fn feed() -> bijux_conformance_model::SuiteResultsFeed {
    support::feed(
        vec![FeedEntry::new("org.example.GroupATest", "testFoo")],
        Vec::new(),
        vec![FeedEntry::new("org.example.GroupBTest", "testBar").with_message("manual")],
    )
}

#[test]
fn identical_inputs_produce_identical_artifacts() {
    let config = support::config();
    let catalog = support::scenario_catalog();
    let first = MemorySink::new();
    let second = MemorySink::new();
    run_report(&config, &catalog, &feed(), &timestamp(), &first).expect("first run");
    run_report(&config, &catalog, &feed(), &timestamp(), &second).expect("second run");
    assert_eq!(first.file_names(), second.file_names());
    for name in first.file_names() {
        assert_eq!(first.get(&name), second.get(&name), "{name} differs");
    }
}

#[test]
fn files_land_under_the_output_directory() {
    let dir = tempfile::tempdir().expect("tempdir");
    let sink = AtomicFileSink::new(dir.path());
    let run = run_report(
        &support::config(),
        &support::scenario_catalog(),
        &feed(),
        &timestamp(),
        &sink,
    )
    .expect("run");
    assert_eq!(run.exit_code(), ExitCode::Success);
    assert_eq!(run.writes.written.len(), 3);
    for written in &run.writes.written {
        assert!(written.path.starts_with(dir.path()));
        let on_disk = fs::read_to_string(&written.path).expect("artifact");
        assert_eq!(on_disk.len(), written.bytes);
        assert_eq!(written.sha256, bijux_conformance_core::sha256_hex(on_disk.as_bytes()));
    }
}

#[test]
fn one_failed_write_does_not_block_the_others() {
    let dir = tempfile::tempdir().expect("tempdir");
    fs::create_dir(dir.path().join("ldp-earl.ttl")).expect("blocking directory");
    let sink = AtomicFileSink::new(dir.path());
    let run = run_report(
        &support::config(),
        &support::scenario_catalog(),
        &feed(),
        &timestamp(),
        &sink,
    )
    .expect("run");

    assert_eq!(run.exit_code(), ExitCode::DependencyFailure);
    assert_eq!(run.writes.failed.len(), 1);
    assert_eq!(run.writes.failed[0].kind, ArtifactKind::Turtle);
    assert!(dir.path().join("ldp-earl.jsonld").is_file());
    assert!(dir.path().join("conformance-report.html").is_file());

    let leftovers: Vec<_> = fs::read_dir(dir.path())
        .expect("read dir")
        .filter_map(Result::ok)
        .filter(|entry| entry.file_name().to_string_lossy().ends_with(".partial"))
        .collect();
    assert!(leftovers.is_empty());
}

#[test]
fn denied_sink_reports_every_artifact_as_failed() {
    let run = run_report(
        &support::config(),
        &support::scenario_catalog(),
        &feed(),
        &timestamp(),
        &DeniedSink,
    )
    .expect("run");
    assert!(run.writes.written.is_empty());
    assert_eq!(run.writes.failed.len(), 3);
    assert!(run
        .writes
        .failed
        .iter()
        .all(|f| matches!(f.error, AdapterError::EffectDenied { effect: "fs_write", .. })));
    assert_eq!(run.prepared.aggregate.totals.counts.total, 3);
}

#[test]
fn json_summary_lists_written_artifacts() {
    let sink = MemorySink::new();
    let run = run_report(
        &support::config(),
        &support::scenario_catalog(),
        &feed(),
        &timestamp(),
        &sink,
    )
    .expect("run");
    let value = summary_value(&run).expect("summary");
    assert_eq!(value["artifacts"]["written"].as_array().map(Vec::len), Some(3));
    assert_eq!(value["totals"]["counts"]["total"], 3);
}

#[cfg(unix)]
#[test]
fn json_summary_reports_unencodable_paths_as_errors() {
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;
    use std::path::PathBuf;

    let sink = MemorySink::new();
    let mut run = run_report(
        &support::config(),
        &support::scenario_catalog(),
        &feed(),
        &timestamp(),
        &sink,
    )
    .expect("run");
    run.writes.written[0].path = PathBuf::from(OsStr::from_bytes(b"report-\xff.ttl"));
    assert!(summary_value(&run).is_err());
    assert!(render_json(&run).is_err());
}
