// Copyright (c) The caselog Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Errors produced by caselog.

use crate::{
    events::{PhaseOutcome, TestPhase},
    item::TestId,
};
use camino::Utf8PathBuf;
use config::ConfigError;
use std::{error, fmt, io};
use thiserror::Error;

/// An error that occurred while parsing the config.
#[derive(Debug, Error)]
#[error("failed to parse caselog config at `{config_file}`")]
#[non_exhaustive]
pub struct ConfigParseError {
    config_file: Utf8PathBuf,
    #[source]
    kind: ConfigParseErrorKind,
}

impl ConfigParseError {
    pub(crate) fn new(config_file: impl Into<Utf8PathBuf>, kind: ConfigParseErrorKind) -> Self {
        Self {
            config_file: config_file.into(),
            kind,
        }
    }

    /// Returns the config file that was being parsed.
    pub fn config_file(&self) -> &Utf8PathBuf {
        &self.config_file
    }

    /// Returns the kind of error this is.
    pub fn kind(&self) -> &ConfigParseErrorKind {
        &self.kind
    }
}

/// The kind of error that occurred while parsing a config.
///
/// Returned by [`ConfigParseError::kind`].
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigParseErrorKind {
    /// An error occurred while building the config.
    #[error(transparent)]
    BuildError(Box<ConfigError>),

    /// An error occurred while deserializing the config.
    #[error(transparent)]
    DeserializeError(Box<serde_path_to_error::Error<ConfigError>>),
}

/// An invalid session timestamp format.
#[derive(Clone, Debug, Error)]
pub enum TimestampFormatError {
    /// The format string contains an unknown or incomplete specifier.
    #[error("format `{format}` contains an invalid specifier")]
    InvalidSpecifier {
        /// The format string.
        format: String,
    },

    /// The format string produces no usable characters once slugified.
    #[error("format `{format}` renders to an empty directory name")]
    Empty {
        /// The format string.
        format: String,
    },
}

/// Error returned while parsing a [`TestPhase`] value from a string.
#[derive(Clone, Debug, Error)]
#[error(
    "unrecognized value for test phase: {input}\n(known values: {})",
    TestPhase::variants().join(", "),
)]
pub struct TestPhaseParseError {
    input: String,
}

impl TestPhaseParseError {
    pub(crate) fn new(input: impl Into<String>) -> Self {
        Self {
            input: input.into(),
        }
    }
}

/// Error returned while parsing a [`PhaseOutcome`] value from a string.
#[derive(Clone, Debug, Error)]
#[error(
    "unrecognized value for phase outcome: {input}\n(known values: {})",
    PhaseOutcome::variants().join(", "),
)]
pub struct PhaseOutcomeParseError {
    input: String,
}

impl PhaseOutcomeParseError {
    pub(crate) fn new(input: impl Into<String>) -> Self {
        Self {
            input: input.into(),
        }
    }
}

/// An error that occurred while pointing the log router at a new file.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LogRouteError {
    /// The directory containing the log file couldn't be created.
    #[error("error creating log directory `{dir}`")]
    CreateDir {
        /// The directory that couldn't be created.
        dir: Utf8PathBuf,

        /// The underlying error.
        #[source]
        error: io::Error,
    },

    /// The log file couldn't be opened.
    #[error("error opening log file `{path}`")]
    Open {
        /// The log file path.
        path: Utf8PathBuf,

        /// The underlying error.
        #[source]
        error: io::Error,
    },
}

/// An error that occurred while finalizing a test's log file.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum FinalizeError {
    /// Metadata for the log file or its directory couldn't be read.
    #[error("error reading `{path}`")]
    Read {
        /// The path that was being read.
        path: Utf8PathBuf,

        /// The underlying error.
        #[source]
        error: io::Error,
    },

    /// The diagnostic couldn't be appended to the log file.
    #[error("error appending diagnostic to log file `{path}`")]
    Append {
        /// The log file path.
        path: Utf8PathBuf,

        /// The underlying error.
        #[source]
        error: io::Error,
    },

    /// An empty log file couldn't be removed.
    #[error("error removing empty log file `{path}`")]
    RemoveFile {
        /// The log file path.
        path: Utf8PathBuf,

        /// The underlying error.
        #[source]
        error: io::Error,
    },

    /// An empty log directory couldn't be removed.
    #[error("error removing empty log directory `{dir}`")]
    RemoveDir {
        /// The directory.
        dir: Utf8PathBuf,

        /// The underlying error.
        #[source]
        error: io::Error,
    },
}

/// An error that occurred while appending to the summary file.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SummaryWriteError {
    /// The directory containing the summary file couldn't be created.
    #[error("error creating summary directory `{dir}`")]
    CreateDir {
        /// The directory.
        dir: Utf8PathBuf,

        /// The underlying error.
        #[source]
        error: io::Error,
    },

    /// The summary file couldn't be opened or written to.
    #[error("error writing to summary file `{path}`")]
    Write {
        /// The summary file path.
        path: Utf8PathBuf,

        /// The underlying error.
        #[source]
        error: io::Error,
    },
}

/// An error that occurred while installing the global logger.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LoggingInitError {
    /// The console filter from the environment couldn't be parsed.
    #[error("unable to parse {var}: `{input}`")]
    ConsoleFilter {
        /// The environment variable.
        var: &'static str,

        /// The value that was read.
        input: String,

        /// The underlying error.
        #[source]
        error: tracing_subscriber::filter::ParseError,
    },

    /// The console filter from the environment isn't valid UTF-8.
    #[error("{var} is not valid UTF-8")]
    ConsoleFilterNotUtf8 {
        /// The environment variable.
        var: &'static str,
    },

    /// A global subscriber was already installed by someone else.
    #[error("error setting global logger")]
    SetGlobal(#[source] tracing_subscriber::util::TryInitError),
}

/// An error returned by the lifecycle hooks.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CaseLogError {
    /// A test started before the run did, so no session timestamp exists.
    #[error("test `{test_id}` started before the run started")]
    SessionNotStarted {
        /// The test that started.
        test_id: TestId,
    },

    /// A phase finished for a test whose setup was never observed.
    ///
    /// This indicates a bug in the host framework or in the way it dispatches
    /// events: setup always registers the log path before any phase
    /// finishes.
    #[error("no log file registered for test `{test_id}` (while finishing {phase} phase)")]
    MissingTestState {
        /// The test.
        test_id: TestId,

        /// The phase that finished.
        phase: TestPhase,
    },

    /// The log router couldn't switch to the test's log file.
    #[error(transparent)]
    Route(#[from] LogRouteError),

    /// The test's log file couldn't be finalized.
    #[error(transparent)]
    Finalize(#[from] FinalizeError),

    /// The summary file couldn't be written.
    #[error(transparent)]
    Summary(#[from] SummaryWriteError),
}

/// Displays an error along with its chain of sources on a single line.
///
/// Used when an error is logged rather than returned.
pub struct DisplayErrorChain<E> {
    error: E,
}

impl<E: error::Error> DisplayErrorChain<E> {
    /// Creates a new `DisplayErrorChain`.
    pub fn new(error: E) -> Self {
        Self { error }
    }
}

impl<E> fmt::Display for DisplayErrorChain<E>
where
    E: error::Error,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)?;

        let mut current = self.error.source();
        while let Some(source) = current {
            write!(f, ": {source}")?;
            current = source.source();
        }

        Ok(())
    }
}
