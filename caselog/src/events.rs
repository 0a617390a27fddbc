// Copyright (c) The caselog Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Lifecycle events delivered by the host test framework.

use crate::{
    errors::{PhaseOutcomeParseError, TestPhaseParseError},
    item::TestItem,
};
use std::{fmt, str::FromStr};

/// One of the three phases every test goes through.
#[derive(Copy, Clone, Debug, Eq, Hash, PartialEq)]
pub enum TestPhase {
    /// Fixtures and other preconditions are being set up.
    Setup,

    /// The test body is running.
    Call,

    /// Fixtures are being torn down. This is always the last phase reported
    /// for a test.
    Teardown,
}

impl TestPhase {
    /// Returns string representations of all known variants.
    pub fn variants() -> &'static [&'static str] {
        &["setup", "call", "teardown"]
    }

    /// Returns the lowercase name of this phase.
    pub fn as_str(self) -> &'static str {
        match self {
            TestPhase::Setup => "setup",
            TestPhase::Call => "call",
            TestPhase::Teardown => "teardown",
        }
    }
}

impl fmt::Display for TestPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TestPhase {
    type Err = TestPhaseParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let phase = match s {
            "setup" => TestPhase::Setup,
            "call" => TestPhase::Call,
            "teardown" => TestPhase::Teardown,
            other => return Err(TestPhaseParseError::new(other)),
        };
        Ok(phase)
    }
}

/// The result of a single phase.
#[derive(Copy, Clone, Debug, Eq, Hash, PartialEq)]
pub enum PhaseOutcome {
    /// The phase completed successfully.
    Passed,

    /// The phase failed.
    Failed,

    /// The phase was skipped, or an expected failure happened.
    Skipped,
}

impl PhaseOutcome {
    /// Returns string representations of all known variants.
    pub fn variants() -> &'static [&'static str] {
        &["passed", "failed", "skipped"]
    }

    /// Returns the lowercase name of this outcome.
    pub fn as_str(self) -> &'static str {
        match self {
            PhaseOutcome::Passed => "passed",
            PhaseOutcome::Failed => "failed",
            PhaseOutcome::Skipped => "skipped",
        }
    }

    /// Returns the uppercase name used in the summary file.
    pub fn as_summary_str(self) -> &'static str {
        match self {
            PhaseOutcome::Passed => "PASSED",
            PhaseOutcome::Failed => "FAILED",
            PhaseOutcome::Skipped => "SKIPPED",
        }
    }
}

impl fmt::Display for PhaseOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PhaseOutcome {
    type Err = PhaseOutcomeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let outcome = match s {
            "passed" => PhaseOutcome::Passed,
            "failed" => PhaseOutcome::Failed,
            "skipped" => PhaseOutcome::Skipped,
            other => return Err(PhaseOutcomeParseError::new(other)),
        };
        Ok(outcome)
    }
}

/// The report the host produces when a phase finishes.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PhaseReport {
    /// The phase that finished.
    pub phase: TestPhase,

    /// How it finished.
    pub outcome: PhaseOutcome,

    /// The diagnostic text for this phase (a traceback, an assertion
    /// message, or a skip reason), if the host produced one.
    pub diagnostic: Option<String>,
}

impl PhaseReport {
    /// Creates a report without a diagnostic.
    pub fn new(phase: TestPhase, outcome: PhaseOutcome) -> Self {
        Self {
            phase,
            outcome,
            diagnostic: None,
        }
    }

    /// Attaches diagnostic text to this report.
    pub fn with_diagnostic(mut self, diagnostic: impl Into<String>) -> Self {
        self.diagnostic = Some(diagnostic.into());
        self
    }

    /// Returns the diagnostic that should be appended to the test's log file.
    ///
    /// Skip reasons are not diagnostics in this sense, so this returns `None`
    /// for skipped phases.
    pub fn failure_text(&self) -> Option<&str> {
        match self.outcome {
            PhaseOutcome::Skipped => None,
            PhaseOutcome::Passed | PhaseOutcome::Failed => self.diagnostic.as_deref(),
        }
    }
}

/// A lifecycle event.
///
/// Events are produced by the host framework and consumed by
/// [`LifecycleListener`](crate::hooks::LifecycleListener)s.
#[derive(Clone, Copy, Debug)]
pub enum LifecycleEvent<'a> {
    /// The run's main loop is about to start. No tests have executed yet.
    RunStarted,

    /// A test's setup phase is about to start.
    SetupStarted {
        /// The test being set up.
        item: &'a TestItem,
    },

    /// A phase of a test finished.
    PhaseFinished {
        /// The test the phase belongs to.
        item: &'a TestItem,

        /// The report for the phase.
        report: &'a PhaseReport,
    },
}
