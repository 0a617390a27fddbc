// Copyright (c) The caselog Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test items as reported by the host test framework.

use camino::{Utf8Path, Utf8PathBuf};
use std::fmt;

/// An opaque identifier for a single test invocation within a run.
///
/// The host framework guarantees that identifiers are unique and stable for
/// the duration of a run. Nothing about the contents is assumed.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct TestId(String);

impl TestId {
    /// Creates a new identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TestId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for TestId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// A marker (annotation) attached to a test by its author.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Marker {
    /// The test is always skipped.
    Skip {
        /// The reason given for skipping, if any.
        reason: Option<String>,
    },

    /// The test is skipped if a condition holds. The condition is evaluated by
    /// the host at setup time.
    SkipIf {
        /// The condition, as written by the test author.
        condition: String,

        /// The reason given for skipping, if any.
        reason: Option<String>,
    },

    /// The test is expected to fail.
    ExpectedFailure {
        /// The reason given, if any.
        reason: Option<String>,
    },

    /// Any other marker. These are carried along but never interpreted.
    Custom {
        /// The marker name.
        name: String,
    },
}

/// A single test invocation.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TestItem {
    id: TestId,
    source_path: Option<Utf8PathBuf>,
    markers: Vec<Marker>,
}

impl TestItem {
    /// Creates a new test item with no source path and no markers.
    pub fn new(id: impl Into<TestId>) -> Self {
        Self {
            id: id.into(),
            source_path: None,
            markers: Vec::new(),
        }
    }

    /// Sets the path of the source file the test was collected from.
    pub fn with_source_path(mut self, source_path: impl Into<Utf8PathBuf>) -> Self {
        self.source_path = Some(source_path.into());
        self
    }

    /// Adds a marker to this test.
    pub fn with_marker(mut self, marker: Marker) -> Self {
        self.markers.push(marker);
        self
    }

    /// Returns the identifier for this test.
    pub fn id(&self) -> &TestId {
        &self.id
    }

    /// Returns the path of the source file this test was collected from, if
    /// known.
    pub fn source_path(&self) -> Option<&Utf8Path> {
        self.source_path.as_deref()
    }

    /// Returns the file name component of the source path, if known.
    pub fn source_file_name(&self) -> Option<&str> {
        self.source_path.as_deref().and_then(Utf8Path::file_name)
    }

    /// Returns the markers attached to this test.
    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    /// Returns true if this test carries an unconditional skip marker.
    ///
    /// Conditional skips and expected failures don't count: whether those run
    /// is only known once setup starts.
    pub fn is_statically_skipped(&self) -> bool {
        self.markers
            .iter()
            .any(|marker| matches!(marker, Marker::Skip { .. }))
    }
}
