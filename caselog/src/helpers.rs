// Copyright (c) The caselog Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Best-effort filesystem helpers.
//!
//! Removal functions treat a path that's already gone as success, so running
//! them twice is harmless.

use camino::Utf8Path;
use std::{fs, io};

/// Returns `Some(true)` if `path` is an empty regular file, `Some(false)` if
/// it is a non-empty file, and `None` if it doesn't exist.
pub(crate) fn file_is_empty(path: &Utf8Path) -> io::Result<Option<bool>> {
    match fs::metadata(path) {
        Ok(metadata) if metadata.is_file() => Ok(Some(metadata.len() == 0)),
        Ok(_) => Ok(None),
        Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(error) => Err(error),
    }
}

/// Returns true if `dir` is an existing directory with no entries.
pub(crate) fn dir_is_empty(dir: &Utf8Path) -> io::Result<bool> {
    match fs::read_dir(dir) {
        Ok(mut entries) => Ok(entries.next().is_none()),
        Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(error) => Err(error),
    }
}

/// Removes a file, returning whether it existed.
pub(crate) fn remove_file_if_exists(path: &Utf8Path) -> io::Result<bool> {
    match fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(error) => Err(error),
    }
}

/// Removes an empty directory, returning whether it existed.
pub(crate) fn remove_dir_if_exists(dir: &Utf8Path) -> io::Result<bool> {
    match fs::remove_dir(dir) {
        Ok(()) => Ok(true),
        Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(error) => Err(error),
    }
}
