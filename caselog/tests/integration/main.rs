// Copyright (c) The caselog Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests
//!
//! Each test drives a [`TestRun`] through a scripted host framework and then
//! inspects the results directory it leaves behind.

use caselog::{
    item::{Marker, TestId},
    plugin::CaseStatus,
    summary::SummaryStats,
};
use color_eyre::eyre::Result;
use indoc::indoc;
use pretty_assertions::assert_eq;
use std::collections::BTreeSet;
use tracing::Level;

mod fixtures;

use fixtures::*;

fn example_one() -> ScriptedTest {
    ScriptedTest::new("test_example_one", "test_example.py").call(
        PhaseScript::passed()
            .log(Level::INFO, "hello world info")
            .log(Level::DEBUG, "hello world debug")
            .log(Level::WARN, "hello world warning")
            .log(Level::ERROR, "hello world error"),
    )
}

fn example_two() -> ScriptedTest {
    ScriptedTest::new("test_example_two", "test_example.py")
        .with_marker(Marker::Skip {
            reason: Some("skipped".to_owned()),
        })
        .setup(PhaseScript::skipped("skipped"))
}

fn sample_one() -> ScriptedTest {
    ScriptedTest::new("test_sample_one", "test_sample.py").setup(PhaseScript::failed(
        "def my_fixture():\n>       assert False\nE       assert False",
    ))
}

fn sample_two() -> ScriptedTest {
    ScriptedTest::new("test_sample_two", "test_sample.py").call(
        PhaseScript::passed()
            .log(Level::INFO, "hello world")
            .log(Level::WARN, "hello world"),
    )
}

fn sample_three() -> ScriptedTest {
    ScriptedTest::new("test_sample_three", "test_sample.py")
        .with_marker(Marker::ExpectedFailure {
            reason: Some("xfailing".to_owned()),
        })
        .call(
            PhaseScript::skipped("xfailing")
                .log(Level::INFO, "about to fail")
                .log(Level::ERROR, "failed as expected"),
        )
}

#[test]
fn full_run() -> Result<()> {
    let tests = [
        example_one(),
        example_two(),
        sample_one(),
        sample_two(),
        sample_three(),
    ];
    let mut run = TestRun::new()?;
    run.run(&tests)?;

    let session_dir = run.session_dir()?;
    assert_eq!(
        session_dir.parent(),
        Some(run.workspace_root().join("results").as_path())
    );

    let files = files_under(&session_dir)?;
    let expected: BTreeSet<String> = [
        "logs/summary.log",
        "logs/test-example/test-example-one.log",
        "logs/test-sample/test-sample-one.log",
        "logs/test-sample/test-sample-three.log",
        "logs/test-sample/test-sample-two.log",
    ]
    .into_iter()
    .map(str::to_owned)
    .collect();
    assert_eq!(files, expected);

    assert_eq!(
        run.summary()?,
        indoc! {"
            SETUP:::test_example_one:::PASSED
            TEST:::test_example_one:::PASSED
            TEARDOWN:::test_example_one:::PASSED
            SETUP:::test_sample_one:::FAILED
            TEST:::test_sample_one:::FAILED
            TEARDOWN:::test_sample_one:::PASSED
            SETUP:::test_sample_two:::PASSED
            TEST:::test_sample_two:::PASSED
            TEARDOWN:::test_sample_two:::PASSED
            SETUP:::test_sample_three:::PASSED
            TEST:::test_sample_three:::SKIPPED
            TEARDOWN:::test_sample_three:::PASSED
        "}
    );
    assert_eq!(
        run.plugin.summary_stats(),
        SummaryStats {
            passed: 9,
            failed: 2,
            skipped: 1,
        }
    );

    for test in &tests {
        let expected = if test.item.is_statically_skipped() {
            CaseStatus::NotStarted
        } else {
            CaseStatus::Finalized
        };
        assert_eq!(run.plugin.status(test.item.id()), expected, "{}", test.item.id());
    }

    Ok(())
}

#[test]
fn log_contents() -> Result<()> {
    let tests = [example_one(), sample_one(), sample_three()];
    let mut run = TestRun::new()?;
    run.run(&tests)?;

    let example_one = std::fs::read_to_string(run.log_path(&tests[0])?)?;
    let lines: Vec<_> = example_one.lines().collect();
    assert_eq!(lines.len(), 4, "contents: {example_one}");
    for (line, (level, message)) in lines.iter().zip([
        ("INFO", "hello world info"),
        ("DEBUG", "hello world debug"),
        ("WARN", "hello world warning"),
        ("ERROR", "hello world error"),
    ]) {
        assert!(
            line.contains(level) && line.ends_with(message),
            "unexpected line: {line}"
        );
    }
    assert!(
        !example_one.contains("caselog"),
        "caselog's own events stay out of test logs"
    );

    // Setup failed before anything was logged: only the diagnostic is left.
    assert_eq!(
        std::fs::read_to_string(run.log_path(&tests[1])?)?,
        "def my_fixture():\n>       assert False\nE       assert False\n"
    );

    // Expected failures keep their output, but skip reasons aren't appended.
    let sample_three = std::fs::read_to_string(run.log_path(&tests[2])?)?;
    assert!(sample_three.contains("failed as expected"), "{sample_three}");
    assert!(!sample_three.contains("xfailing"), "{sample_three}");

    Ok(())
}

#[test]
fn passing_test_without_output_leaves_nothing() -> Result<()> {
    let quiet = ScriptedTest::new("test_quiet", "test_quiet.py");
    let mut run = TestRun::new()?;
    run.run(std::slice::from_ref(&quiet))?;

    let log_path = run.log_path(&quiet)?;
    assert!(!log_path.exists(), "empty log file is removed");
    assert!(
        !log_path.parent().expect("log file has a parent").exists(),
        "empty directory is removed"
    );
    assert_eq!(
        files_under(&run.session_dir()?)?,
        BTreeSet::from(["logs/summary.log".to_owned()])
    );
    Ok(())
}

#[test]
fn same_name_in_two_files() -> Result<()> {
    let tests = [
        ScriptedTest::new("test_one", "test_a.py")
            .call(PhaseScript::passed().log(Level::INFO, "from a")),
        ScriptedTest::new("test_one", "test_b.py")
            .call(PhaseScript::passed().log(Level::INFO, "from b")),
    ];
    let mut run = TestRun::new()?;
    run.run(&tests)?;

    let a = run.log_path(&tests[0])?;
    let b = run.log_path(&tests[1])?;
    assert_ne!(a, b);
    assert!(std::fs::read_to_string(&a)?.ends_with("from a\n"));
    assert!(std::fs::read_to_string(&b)?.ends_with("from b\n"));
    Ok(())
}

#[test]
fn statically_skipped_test_leaves_no_trace() -> Result<()> {
    let mut run = TestRun::new()?;
    run.run(&[example_two()])?;

    // Nothing at all is written, not even the summary.
    assert!(!run.session_dir()?.exists());
    assert_eq!(run.plugin.summary_stats(), SummaryStats::default());
    assert_eq!(
        run.plugin.status(&TestId::new("test_example_two")),
        CaseStatus::NotStarted
    );
    Ok(())
}

#[test]
fn one_session_directory_per_run() -> Result<()> {
    let mut run = TestRun::new()?;
    run.run(&[sample_two()])?;
    let session = run.session()?.clone();

    // A second run-start from the same host is ignored.
    run.run(&[sample_two().teardown(PhaseScript::failed("RuntimeError: teardown"))])?;
    assert_eq!(run.session()?, &session);

    let results = run.workspace_root().join("results");
    let sessions: Vec<_> = results
        .read_dir_utf8()?
        .map(|entry| entry.map(|entry| entry.file_name().to_owned()))
        .collect::<Result<_, _>>()?;
    assert_eq!(sessions, [session.as_str().to_owned()]);

    let summary = run.summary()?;
    assert_eq!(summary.lines().count(), 6, "summary: {summary}");
    assert!(summary.ends_with("TEARDOWN:::test_sample_two:::FAILED\n"));

    // The rerun truncated the earlier output.
    let log = std::fs::read_to_string(run.log_path(&sample_two())?)?;
    assert_eq!(log.matches("hello world").count(), 2, "log: {log}");
    assert!(log.ends_with("RuntimeError: teardown\n"), "log: {log}");
    Ok(())
}

#[test]
fn config_controls_layout() -> Result<()> {
    let mut run = TestRun::with_config(Some(indoc! {r#"
        [store]
        results-dir = "out"
        logs-dir = "case-logs"
        summary-file = "ledger.txt"

        [session]
        timestamp-format = "run %Y%m%d"

        [log-file]
        level = "warn"
    "#}))?;
    run.run(&[sample_two()])?;

    let session_dir = run.session_dir()?;
    assert_eq!(
        session_dir.parent(),
        Some(run.workspace_root().join("out").as_path())
    );
    assert!(run.session()?.as_str().starts_with("run-"));
    assert_eq!(
        files_under(&session_dir)?,
        BTreeSet::from([
            "case-logs/ledger.txt".to_owned(),
            "case-logs/test-sample/test-sample-two.log".to_owned(),
        ])
    );

    let log = std::fs::read_to_string(run.log_path(&sample_two())?)?;
    assert_eq!(log.lines().count(), 1, "only warnings are kept: {log}");
    Ok(())
}
