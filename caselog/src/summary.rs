// Copyright (c) The caselog Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The run-wide summary file.
//!
//! Each phase outcome becomes one or two lines of the form
//! `<LABEL>:::<test-id>:::<OUTCOME>`. The file is append-only: it is opened,
//! appended to and closed again for every report, and never read back.

use crate::{
    errors::SummaryWriteError,
    events::{PhaseOutcome, PhaseReport, TestPhase},
    item::TestId,
};
use camino::{Utf8Path, Utf8PathBuf};
use std::{fmt, fs::OpenOptions, io::Write};

/// The label at the start of a summary line.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum SummaryLabel {
    /// The setup phase.
    Setup,

    /// The test itself: the call phase, any skipped phase, and the implied
    /// call result of a failed setup.
    Test,

    /// The teardown phase.
    Teardown,
}

impl SummaryLabel {
    /// Returns the label as written to the summary file.
    pub fn as_str(self) -> &'static str {
        match self {
            SummaryLabel::Setup => "SETUP",
            SummaryLabel::Test => "TEST",
            SummaryLabel::Teardown => "TEARDOWN",
        }
    }
}

impl fmt::Display for SummaryLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single line of the summary file.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct SummaryLine<'a> {
    /// The label.
    pub label: SummaryLabel,

    /// The test the line is about.
    pub test_id: &'a TestId,

    /// The outcome.
    pub outcome: PhaseOutcome,
}

impl<'a> SummaryLine<'a> {
    /// Returns the lines to write for a phase report, in order.
    ///
    /// A failed setup produces an extra `TEST` line, since the call phase
    /// never runs to report a result of its own.
    pub fn for_report(test_id: &'a TestId, report: &PhaseReport) -> Vec<Self> {
        let line = |label| SummaryLine {
            label,
            test_id,
            outcome: report.outcome,
        };

        match (report.phase, report.outcome) {
            (_, PhaseOutcome::Skipped) => vec![line(SummaryLabel::Test)],
            (TestPhase::Setup, PhaseOutcome::Failed) => {
                vec![line(SummaryLabel::Setup), line(SummaryLabel::Test)]
            }
            (TestPhase::Setup, PhaseOutcome::Passed) => vec![line(SummaryLabel::Setup)],
            (TestPhase::Call, _) => vec![line(SummaryLabel::Test)],
            (TestPhase::Teardown, _) => vec![line(SummaryLabel::Teardown)],
        }
    }
}

impl fmt::Display for SummaryLine<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:::{}:::{}",
            self.label,
            self.test_id,
            self.outcome.as_summary_str()
        )
    }
}

/// Counts of summary lines written, by outcome.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct SummaryStats {
    /// Lines with a `PASSED` outcome.
    pub passed: usize,

    /// Lines with a `FAILED` outcome.
    pub failed: usize,

    /// Lines with a `SKIPPED` outcome.
    pub skipped: usize,
}

impl SummaryStats {
    /// Returns the total number of lines written.
    pub fn total(&self) -> usize {
        self.passed + self.failed + self.skipped
    }

    fn record(&mut self, outcome: PhaseOutcome) {
        match outcome {
            PhaseOutcome::Passed => self.passed += 1,
            PhaseOutcome::Failed => self.failed += 1,
            PhaseOutcome::Skipped => self.skipped += 1,
        }
    }
}

impl fmt::Display for SummaryStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} passed, {} failed, {} skipped",
            self.passed, self.failed, self.skipped
        )
    }
}

/// Appends phase outcomes to the summary file.
#[derive(Debug)]
pub struct SummaryWriter {
    path: Utf8PathBuf,
    stats: SummaryStats,
}

impl SummaryWriter {
    /// Creates a writer for the summary file at `path`.
    ///
    /// Nothing is created on disk until the first report is recorded.
    pub fn new(path: impl Into<Utf8PathBuf>) -> Self {
        Self {
            path: path.into(),
            stats: SummaryStats::default(),
        }
    }

    /// Returns the path to the summary file.
    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    /// Returns the counts of lines written so far by this writer.
    pub fn stats(&self) -> SummaryStats {
        self.stats
    }

    /// Appends the lines for a phase report.
    pub fn record(
        &mut self,
        test_id: &TestId,
        report: &PhaseReport,
    ) -> Result<(), SummaryWriteError> {
        let lines = SummaryLine::for_report(test_id, report);
        let mut buf = String::new();
        for line in &lines {
            buf.push_str(&line.to_string());
            buf.push('\n');
        }

        if let Some(dir) = self.path.parent() {
            std::fs::create_dir_all(dir).map_err(|error| SummaryWriteError::CreateDir {
                dir: dir.to_owned(),
                error,
            })?;
        }

        OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .and_then(|mut file| file.write_all(buf.as_bytes()))
            .map_err(|error| SummaryWriteError::Write {
                path: self.path.clone(),
                error,
            })?;

        for line in &lines {
            self.stats.record(line.outcome);
        }
        Ok(())
    }
}
