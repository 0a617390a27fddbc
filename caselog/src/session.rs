// Copyright (c) The caselog Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The session clock: one timestamp per run.

use crate::{errors::TimestampFormatError, slug::try_slugify};
use chrono::{
    DateTime, Local, TimeZone,
    format::{Item, StrftimeItems},
};
use std::{fmt, sync::OnceLock};

/// The default format for session timestamps, before slugification.
pub const DEFAULT_TIMESTAMP_FORMAT: &str = "%d-%m-%Y %H:%M:%S";

/// The start time of a run, in slug form.
///
/// Every test in a run shares the same timestamp, so all of a run's artifacts
/// end up under one directory.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct SessionTimestamp(String);

impl SessionTimestamp {
    /// Renders `time` with a validated format.
    fn render<Tz>(time: &DateTime<Tz>, format: &TimestampFormat) -> Self
    where
        Tz: TimeZone,
        Tz::Offset: fmt::Display,
    {
        let rendered = time.format(&format.0).to_string();
        Self(crate::slug::slugify(&rendered))
    }

    /// Returns the timestamp as a directory name.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionTimestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A chrono format string that is known to render to a non-empty slug.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TimestampFormat(String);

impl TimestampFormat {
    /// Validates a chrono format string.
    pub fn new(format: &str) -> Result<Self, TimestampFormatError> {
        if StrftimeItems::new(format).any(|item| matches!(item, Item::Error)) {
            return Err(TimestampFormatError::InvalidSpecifier {
                format: format.to_owned(),
            });
        }

        // A fixed instant is enough to check that the format renders to
        // something: every specifier produces at least one alphanumeric
        // character.
        let probe = DateTime::from_timestamp(0, 0)
            .unwrap_or_default()
            .format(format)
            .to_string();
        if try_slugify(&probe).is_none() {
            return Err(TimestampFormatError::Empty {
                format: format.to_owned(),
            });
        }

        Ok(Self(format.to_owned()))
    }

    /// Returns the format string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TimestampFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Captures the session timestamp exactly once per run.
#[derive(Debug)]
pub struct SessionClock {
    format: TimestampFormat,
    started: OnceLock<SessionTimestamp>,
}

impl SessionClock {
    /// Creates a new clock which will render the start time with the given
    /// chrono format string.
    pub fn new(format: &str) -> Result<Self, TimestampFormatError> {
        TimestampFormat::new(format).map(Self::with_format)
    }

    /// Creates a new clock from an already-validated format.
    pub fn with_format(format: TimestampFormat) -> Self {
        Self {
            format,
            started: OnceLock::new(),
        }
    }

    /// Creates a clock that has already been started at `time`.
    pub fn started_at<Tz>(format: &str, time: &DateTime<Tz>) -> Result<Self, TimestampFormatError>
    where
        Tz: TimeZone,
        Tz::Offset: fmt::Display,
    {
        let clock = Self::new(format)?;
        _ = clock
            .started
            .set(SessionTimestamp::render(time, &clock.format));
        Ok(clock)
    }

    /// Captures the current local time as the session timestamp.
    ///
    /// Returns the timestamp, and whether this call was the one that captured
    /// it. Calls after the first return the original timestamp unchanged.
    pub fn start(&self) -> (&SessionTimestamp, bool) {
        let mut captured = false;
        let timestamp = self.started.get_or_init(|| {
            captured = true;
            SessionTimestamp::render(&Local::now(), &self.format)
        });
        (timestamp, captured)
    }

    /// Returns the session timestamp if the clock has been started.
    pub fn get(&self) -> Option<&SessionTimestamp> {
        self.started.get()
    }
}
