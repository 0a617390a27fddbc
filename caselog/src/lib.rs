// Copyright (c) The caselog Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

#![warn(missing_docs)]

//! Per-test-case log files for test harnesses.
//!
//! A host test framework reports lifecycle events (run start, setup start,
//! and the outcome of each of the setup, call and teardown phases) to a
//! [`HookRegistry`](hooks::HookRegistry). The [`CaseLogPlugin`](plugin::CaseLogPlugin)
//! listens to those events and:
//!
//! * captures one [session timestamp](session::SessionTimestamp) per run,
//! * routes each test's log output to
//!   `results/<session>/logs/<source-file>/<test>.log`,
//! * appends failure diagnostics to that file and removes it again if it ends
//!   up empty, and
//! * appends one line per phase outcome to `results/<session>/logs/summary.log`.

pub mod config;
pub mod errors;
pub mod events;
pub mod finalizer;
mod helpers;
pub mod hooks;
pub mod item;
pub mod output;
pub mod paths;
pub mod plugin;
pub mod router;
pub mod session;
pub mod slug;
pub mod summary;
