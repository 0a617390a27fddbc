// Copyright (c) The caselog Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-phase handling of a test's log file.

use crate::{
    errors::FinalizeError,
    events::{PhaseOutcome, PhaseReport, TestPhase},
    helpers::{dir_is_empty, file_is_empty, remove_dir_if_exists, remove_file_if_exists},
};
use camino::Utf8Path;
use std::{fs::OpenOptions, io::Write};

/// What the finalizer did for a single phase report.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct FinalizeSummary {
    /// A diagnostic was appended to the log file.
    pub appended_diagnostic: bool,

    /// The log file was empty and has been removed.
    pub removed_file: bool,

    /// The log file's directory was empty and has been removed.
    pub removed_dir: bool,
}

/// Updates a test's log file after each of its phases.
///
/// The finalizer only ever touches the log file it is given and that file's
/// parent directory.
#[derive(Clone, Copy, Debug, Default)]
pub struct ResultFinalizer;

impl ResultFinalizer {
    /// Creates a new finalizer.
    pub fn new() -> Self {
        Self
    }

    /// Applies the outcome of one phase to the log file at `log_path`.
    ///
    /// * A skipped phase removes the file if it is empty.
    /// * Any other phase with diagnostic text appends that text and a newline.
    /// * After teardown, an empty file is removed, followed by its directory
    ///   if that is now empty.
    pub fn finalize(
        &self,
        log_path: &Utf8Path,
        report: &PhaseReport,
    ) -> Result<FinalizeSummary, FinalizeError> {
        let mut summary = FinalizeSummary::default();

        match report.outcome {
            PhaseOutcome::Skipped => {
                if is_empty(log_path)? == Some(true) {
                    summary.removed_file = remove_file(log_path)?;
                }
            }
            PhaseOutcome::Passed | PhaseOutcome::Failed => {
                if let Some(text) = report.failure_text()
                    && is_empty(log_path)?.is_some()
                {
                    append_diagnostic(log_path, text)?;
                    summary.appended_diagnostic = true;
                }
            }
        }

        if report.phase == TestPhase::Teardown {
            if is_empty(log_path)? == Some(true) {
                summary.removed_file |= remove_file(log_path)?;
            }
            if let Some(dir) = log_path.parent()
                && dir_is_empty(dir).map_err(|error| FinalizeError::Read {
                    path: dir.to_owned(),
                    error,
                })?
            {
                summary.removed_dir =
                    remove_dir_if_exists(dir).map_err(|error| FinalizeError::RemoveDir {
                        dir: dir.to_owned(),
                        error,
                    })?;
            }
        }

        Ok(summary)
    }
}

fn is_empty(path: &Utf8Path) -> Result<Option<bool>, FinalizeError> {
    file_is_empty(path).map_err(|error| FinalizeError::Read {
        path: path.to_owned(),
        error,
    })
}

fn remove_file(path: &Utf8Path) -> Result<bool, FinalizeError> {
    remove_file_if_exists(path).map_err(|error| FinalizeError::RemoveFile {
        path: path.to_owned(),
        error,
    })
}

fn append_diagnostic(path: &Utf8Path, text: &str) -> Result<(), FinalizeError> {
    let mut file = OpenOptions::new()
        .append(true)
        .open(path)
        .map_err(|error| FinalizeError::Append {
            path: path.to_owned(),
            error,
        })?;
    writeln!(file, "{text}").map_err(|error| FinalizeError::Append {
        path: path.to_owned(),
        error,
    })
}
