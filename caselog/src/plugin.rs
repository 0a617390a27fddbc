// Copyright (c) The caselog Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The lifecycle listener that ties everything together.
//!
//! For each test, [`CaseLogPlugin`] moves through three states:
//!
//! ```text
//! NotStarted --setup started--> LoggingActive --teardown finished--> Finalized
//! ```
//!
//! Tests carrying an unconditional skip marker never leave `NotStarted`: no
//! log file is created for them and none of their phase reports are recorded.

use crate::{
    config::CaseLogConfig,
    errors::CaseLogError,
    events::{LifecycleEvent, PhaseReport, TestPhase},
    finalizer::ResultFinalizer,
    hooks::LifecycleListener,
    item::{TestId, TestItem},
    paths::ResultsLayout,
    router::{LogRedirect, LogRouter},
    session::{SessionClock, SessionTimestamp},
    summary::{SummaryStats, SummaryWriter},
};
use camino::{Utf8Path, Utf8PathBuf};
use indexmap::IndexMap;
use tracing::debug;

/// Where a test is in its lifecycle, as far as caselog is concerned.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum CaseStatus {
    /// Setup hasn't started, or the test is statically skipped.
    NotStarted,

    /// Log output is being routed to the test's log file.
    LoggingActive,

    /// Teardown has been recorded.
    Finalized,
}

#[derive(Clone, Debug)]
enum CaseState {
    LoggingActive { log_path: Utf8PathBuf },
    Finalized,
}

/// Manages per-test log files and the summary file for one run.
#[derive(Debug)]
pub struct CaseLogPlugin<R = LogRouter> {
    layout: ResultsLayout,
    clock: SessionClock,
    redirect: R,
    finalizer: ResultFinalizer,
    summary: Option<SummaryWriter>,
    states: IndexMap<TestId, CaseState>,
}

impl<R: LogRedirect> CaseLogPlugin<R> {
    /// Creates a plugin from a loaded config.
    pub fn new(config: &CaseLogConfig, redirect: R) -> Self {
        Self::from_parts(
            ResultsLayout::from_config(config.store(), config.workspace_root()),
            config.session().clock(),
            redirect,
        )
    }

    /// Creates a plugin from its individual parts.
    ///
    /// If `clock` has already been started, tests may begin without a
    /// [`RunStarted`](LifecycleEvent::RunStarted) event.
    pub fn from_parts(layout: ResultsLayout, clock: SessionClock, redirect: R) -> Self {
        Self {
            layout,
            clock,
            redirect,
            finalizer: ResultFinalizer::new(),
            summary: None,
            states: IndexMap::new(),
        }
    }

    /// Returns the results layout.
    pub fn layout(&self) -> &ResultsLayout {
        &self.layout
    }

    /// Returns the session timestamp, if the run has started.
    pub fn session(&self) -> Option<&SessionTimestamp> {
        self.clock.get()
    }

    /// Returns the path to the summary file, if the run has started.
    pub fn summary_path(&self) -> Option<Utf8PathBuf> {
        self.session()
            .map(|session| self.layout.summary_path(session))
    }

    /// Returns counts of the summary lines written so far.
    pub fn summary_stats(&self) -> SummaryStats {
        self.summary
            .as_ref()
            .map(SummaryWriter::stats)
            .unwrap_or_default()
    }

    /// Returns the log file path of a test whose logging is active.
    pub fn log_path(&self, test_id: &TestId) -> Option<&Utf8Path> {
        match self.states.get(test_id) {
            Some(CaseState::LoggingActive { log_path }) => Some(log_path),
            Some(CaseState::Finalized) | None => None,
        }
    }

    /// Returns the lifecycle status of a test.
    pub fn status(&self, test_id: &TestId) -> CaseStatus {
        match self.states.get(test_id) {
            None => CaseStatus::NotStarted,
            Some(CaseState::LoggingActive { .. }) => CaseStatus::LoggingActive,
            Some(CaseState::Finalized) => CaseStatus::Finalized,
        }
    }

    /// Returns the redirect that log output is routed through.
    pub fn redirect(&self) -> &R {
        &self.redirect
    }

    fn on_run_started(&mut self) {
        let (session, captured) = self.clock.start();
        if captured {
            debug!(
                "session started: results go to `{}`",
                self.layout.session_dir(session)
            );
        } else {
            debug!("run already started (session {session}), ignoring");
        }
    }

    fn on_setup_started(&mut self, item: &TestItem) -> Result<(), CaseLogError> {
        if item.is_statically_skipped() {
            debug!("`{}` is always skipped, not creating a log file", item.id());
            return Ok(());
        }

        let session = self
            .clock
            .get()
            .ok_or_else(|| CaseLogError::SessionNotStarted {
                test_id: item.id().clone(),
            })?;
        let log_path = self.layout.log_path_for(item, session);

        self.redirect.set_log_path(&log_path)?;
        debug!("`{}` logs to `{log_path}`", item.id());
        self.states
            .insert(item.id().clone(), CaseState::LoggingActive { log_path });
        Ok(())
    }

    fn on_phase_finished(
        &mut self,
        item: &TestItem,
        report: &PhaseReport,
    ) -> Result<(), CaseLogError> {
        if item.is_statically_skipped() {
            return Ok(());
        }

        let test_id = item.id();
        let (log_path, session) = match (self.states.get(test_id), self.clock.get()) {
            (Some(CaseState::LoggingActive { log_path }), Some(session)) => {
                (log_path.clone(), session)
            }
            _ => {
                return Err(CaseLogError::MissingTestState {
                    test_id: test_id.clone(),
                    phase: report.phase,
                });
            }
        };

        let is_teardown = report.phase == TestPhase::Teardown;
        if is_teardown {
            // Teardown is the last phase: nothing else belongs in this file.
            self.redirect.clear_log_path();
        }

        // The outcome is recorded and the state advanced even if the log file
        // couldn't be finalized. The first error is returned afterwards.
        let finalized = self.finalizer.finalize(&log_path, report);
        if let Ok(finalized) = &finalized
            && finalized.removed_file
        {
            debug!("removed empty log file `{log_path}`");
        }

        let summary = self
            .summary
            .get_or_insert_with(|| SummaryWriter::new(self.layout.summary_path(session)));
        let recorded = summary.record(test_id, report);

        if is_teardown {
            self.states.insert(test_id.clone(), CaseState::Finalized);
            debug!("`{test_id}` finalized ({})", summary.stats());
        }

        finalized?;
        recorded?;
        Ok(())
    }
}

impl<R: LogRedirect> LifecycleListener for CaseLogPlugin<R> {
    fn handle_event(&mut self, event: &LifecycleEvent<'_>) -> Result<(), CaseLogError> {
        match *event {
            LifecycleEvent::RunStarted => {
                self.on_run_started();
                Ok(())
            }
            LifecycleEvent::SetupStarted { item } => self.on_setup_started(item),
            LifecycleEvent::PhaseFinished { item, report } => self.on_phase_finished(item, report),
        }
    }
}
