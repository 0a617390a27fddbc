// Copyright (c) The caselog Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Routing of log output to the currently executing test's log file.
//!
//! [`LogRouter`] implements [`MakeWriter`], so it can back a
//! `tracing_subscriber` fmt layer: every event formatted by that layer goes to
//! whichever file the router currently points at, or nowhere if no test is
//! active.

use crate::errors::LogRouteError;
use camino::{Utf8Path, Utf8PathBuf};
use std::{
    fs::{File, OpenOptions},
    io::{self, Write},
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};
use tracing::debug;
use tracing_subscriber::fmt::MakeWriter;

/// A destination that test log output can be redirected to.
///
/// Implemented by [`LogRouter`]. Hosts that already own a logging pipeline can
/// implement this to receive the per-test path instead.
pub trait LogRedirect {
    /// Directs all subsequent log output to `path`, creating the file (and its
    /// parent directories) if needed and truncating it otherwise.
    fn set_log_path(&self, path: &Utf8Path) -> Result<(), LogRouteError>;

    /// Stops writing log output to the current file, if any.
    fn clear_log_path(&self);
}

impl<T: LogRedirect + ?Sized> LogRedirect for &T {
    fn set_log_path(&self, path: &Utf8Path) -> Result<(), LogRouteError> {
        (**self).set_log_path(path)
    }

    fn clear_log_path(&self) {
        (**self).clear_log_path()
    }
}

/// Routes log output to the active test's log file.
///
/// Clones share the same destination.
#[derive(Clone, Debug, Default)]
pub struct LogRouter {
    active: Arc<Mutex<Option<ActiveLog>>>,
}

#[derive(Debug)]
struct ActiveLog {
    path: Utf8PathBuf,
    file: File,
}

impl LogRouter {
    /// Creates a router with no active destination.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the path output is currently routed to.
    pub fn active_path(&self) -> Option<Utf8PathBuf> {
        self.lock().as_ref().map(|active| active.path.clone())
    }

    fn lock(&self) -> MutexGuard<'_, Option<ActiveLog>> {
        // A panic while holding the lock can't leave the slot in a state worse
        // than "pointing at a file", so ignore poisoning.
        self.active.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl LogRedirect for LogRouter {
    fn set_log_path(&self, path: &Utf8Path) -> Result<(), LogRouteError> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir).map_err(|error| LogRouteError::CreateDir {
                dir: dir.to_owned(),
                error,
            })?;
        }

        // Open in append mode so that diagnostics appended through other
        // handles are never overwritten by later writes through this one.
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .and_then(|file| file.set_len(0).map(|()| file))
            .map_err(|error| LogRouteError::Open {
                path: path.to_owned(),
                error,
            })?;

        let previous = self.lock().replace(ActiveLog {
            path: path.to_owned(),
            file,
        });
        if let Some(previous) = previous {
            debug!("log output moved from `{}` to `{path}`", previous.path);
        }
        Ok(())
    }

    fn clear_log_path(&self) {
        self.lock().take();
    }
}

impl<'a> MakeWriter<'a> for LogRouter {
    type Writer = RouterWriter<'a>;

    fn make_writer(&'a self) -> Self::Writer {
        RouterWriter { router: self }
    }
}

/// The writer handed out by [`LogRouter`] for a single event.
///
/// Output written while no destination is active is discarded.
#[derive(Debug)]
pub struct RouterWriter<'a> {
    router: &'a LogRouter,
}

impl Write for RouterWriter<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self.router.lock().as_mut() {
            Some(active) => active.file.write(buf),
            None => Ok(buf.len()),
        }
    }

    fn write_all(&mut self, buf: &[u8]) -> io::Result<()> {
        // Hold the lock for the whole buffer so a formatted event is never
        // split across two files.
        match self.router.lock().as_mut() {
            Some(active) => active.file.write_all(buf),
            None => Ok(()),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self.router.lock().as_mut() {
            Some(active) => active.file.flush(),
            None => Ok(()),
        }
    }
}
