// Copyright (c) The caselog Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Layout of the results directory.
//!
//! A run produces:
//!
//! ```text
//! <root>/<session-timestamp>/logs/<source-file-slug-or-uuid>/<test-slug>.log
//! <root>/<session-timestamp>/logs/summary.log
//! ```

use crate::{
    config::StoreConfig,
    item::{TestId, TestItem},
    session::SessionTimestamp,
    slug::{slugify, try_slugify},
};
use camino::{Utf8Path, Utf8PathBuf};
use newtype_uuid::{TypedUuid, TypedUuidKind, TypedUuidTag};
use std::fmt;

/// The default name of the directory between the session timestamp and the
/// per-source-file directories.
pub const DEFAULT_LOGS_DIR: &str = "logs";

/// The default name of the summary file.
pub const DEFAULT_SUMMARY_FILE: &str = "summary.log";

/// The extension used for per-test log files.
pub const LOG_EXTENSION: &str = "log";

/// The kind for random log directory names.
pub enum LogDirKind {}

impl TypedUuidKind for LogDirKind {
    #[inline]
    fn tag() -> TypedUuidTag {
        const TAG: TypedUuidTag = TypedUuidTag::new("log_dir");
        TAG
    }
}

/// A random directory name for a test without a known source file.
pub type LogDirUuid = TypedUuid<LogDirKind>;

/// The directory segment that keeps tests with the same name apart.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Disambiguator {
    /// The slug of the test's source file name, without its extension.
    SourceFile(String),

    /// A random token, used when the source file is unknown.
    Random(LogDirUuid),
}

impl Disambiguator {
    /// Derives the disambiguator for a test from its source file name.
    ///
    /// Any leading directories are ignored, as is the final extension. A
    /// missing file name, or one with no usable characters, produces a fresh
    /// random token.
    pub fn for_source_file(source_file: Option<&str>) -> Self {
        let slug = source_file
            .map(Utf8Path::new)
            .and_then(Utf8Path::file_stem)
            .and_then(try_slugify);
        match slug {
            Some(slug) => Disambiguator::SourceFile(slug),
            None => Disambiguator::Random(LogDirUuid::new_v4()),
        }
    }
}

impl fmt::Display for Disambiguator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Disambiguator::SourceFile(slug) => f.write_str(slug),
            Disambiguator::Random(uuid) => write!(f, "{uuid}"),
        }
    }
}

/// Builds the log file path for a test.
///
/// The result is `root/<session>/logs/<disambiguator>/<slug(test_id)>.log`.
/// This is deterministic whenever `source_file` names a file.
pub fn build_log_path(
    test_id: &TestId,
    source_file: Option<&str>,
    session: &SessionTimestamp,
    root: &Utf8Path,
) -> Utf8PathBuf {
    ResultsLayout::new(root).log_path(test_id, source_file, session)
}

/// Computes paths within the results directory.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ResultsLayout {
    root: Utf8PathBuf,
    logs_dir: String,
    summary_file: String,
}

impl ResultsLayout {
    /// Creates a layout rooted at `root`, with default segment names.
    pub fn new(root: impl Into<Utf8PathBuf>) -> Self {
        Self {
            root: root.into(),
            logs_dir: DEFAULT_LOGS_DIR.to_owned(),
            summary_file: DEFAULT_SUMMARY_FILE.to_owned(),
        }
    }

    /// Creates a layout from the store section of the config.
    ///
    /// A relative results directory is resolved against `workspace_root`.
    pub fn from_config(store: &StoreConfig, workspace_root: &Utf8Path) -> Self {
        Self {
            root: workspace_root.join(store.results_dir()),
            logs_dir: store.logs_dir().to_owned(),
            summary_file: store.summary_file().to_owned(),
        }
    }

    /// Returns the results root.
    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    /// Returns the directory holding everything produced by one session.
    pub fn session_dir(&self, session: &SessionTimestamp) -> Utf8PathBuf {
        self.root.join(session.as_str())
    }

    /// Returns the logs directory for a session.
    pub fn logs_dir(&self, session: &SessionTimestamp) -> Utf8PathBuf {
        let mut dir = self.session_dir(session);
        dir.push(&self.logs_dir);
        dir
    }

    /// Returns the path to the summary file for a session.
    pub fn summary_path(&self, session: &SessionTimestamp) -> Utf8PathBuf {
        let mut path = self.logs_dir(session);
        path.push(&self.summary_file);
        path
    }

    /// Returns the log file path for a test.
    pub fn log_path(
        &self,
        test_id: &TestId,
        source_file: Option<&str>,
        session: &SessionTimestamp,
    ) -> Utf8PathBuf {
        let mut path = self.logs_dir(session);
        path.push(Disambiguator::for_source_file(source_file).to_string());
        path.push(format!("{}.{LOG_EXTENSION}", slugify(test_id.as_str())));
        path
    }

    /// Returns the log file path for a test item.
    pub fn log_path_for(&self, item: &TestItem, session: &SessionTimestamp) -> Utf8PathBuf {
        self.log_path(item.id(), item.source_file_name(), session)
    }
}
