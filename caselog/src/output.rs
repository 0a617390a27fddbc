// Copyright (c) The caselog Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Installation of the global `tracing` subscriber.
//!
//! Two layers are installed: a compact console layer on stderr for caselog's
//! own diagnostics, and a file layer that writes every other event to the
//! active test's log file through a [`LogRouter`].

use crate::{config::LogFileConfig, errors::LoggingInitError, router::LogRouter};
use std::{fmt, sync::Once};
use tracing::{
    Event, Level, Subscriber,
    field::{Field, Visit},
    level_filters::LevelFilter,
};
use tracing_subscriber::{
    Layer,
    filter::Targets,
    fmt::{FmtContext, FormatEvent, FormatFields, format},
    layer::SubscriberExt,
    registry::LookupSpan,
    util::SubscriberInitExt,
};

/// The environment variable holding the console filter, in targets syntax.
pub const CASELOG_LOG_ENV: &str = "CASELOG_LOG";

static INIT_LOGGER: Once = Once::new();

/// Installs the global subscriber.
///
/// Only the first call has an effect; later calls return `Ok(())` without
/// changing anything.
pub fn init_logging(router: &LogRouter, log_file: &LogFileConfig) -> Result<(), LoggingInitError> {
    let console_targets = console_targets()?;
    let file_layer = file_layer(router.clone(), log_file.level().clone());

    let mut result = Ok(());
    INIT_LOGGER.call_once(|| {
        let console_layer = tracing_subscriber::fmt::layer()
            .event_format(SimpleFormatter)
            .with_writer(std::io::stderr)
            .with_filter(console_targets);

        result = tracing_subscriber::registry()
            .with(console_layer)
            .with(file_layer)
            .try_init()
            .map_err(LoggingInitError::SetGlobal);
    });
    result
}

/// Returns the layer that writes events to per-test log files.
///
/// Events from caselog itself are never written to test log files: they
/// would make otherwise-empty files non-empty.
pub fn file_layer<S>(router: LogRouter, targets: Targets) -> impl Layer<S>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    let targets = targets.with_target(env!("CARGO_CRATE_NAME"), LevelFilter::OFF);
    tracing_subscriber::fmt::layer()
        .with_writer(router)
        .with_filter(targets)
}

fn console_targets() -> Result<Targets, LoggingInitError> {
    let level_str = match std::env::var_os(CASELOG_LOG_ENV) {
        Some(level_str) => level_str
            .into_string()
            .map_err(|_| LoggingInitError::ConsoleFilterNotUtf8 {
                var: CASELOG_LOG_ENV,
            })?,
        None => String::new(),
    };

    // If the level string is empty, use the standard level filter instead.
    if level_str.is_empty() {
        return Ok(Targets::new().with_default(LevelFilter::INFO));
    }
    level_str
        .parse()
        .map_err(|error| LoggingInitError::ConsoleFilter {
            var: CASELOG_LOG_ENV,
            input: level_str,
            error,
        })
}

struct SimpleFormatter;

impl<S, N> FormatEvent<S, N> for SimpleFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        _ctx: &FmtContext<'_, S, N>,
        mut writer: format::Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let heading = match *event.metadata().level() {
            Level::ERROR => "error",
            Level::WARN => "warning",
            Level::INFO => "info",
            Level::DEBUG => "debug",
            Level::TRACE => "trace",
        };
        write!(writer, "{heading}: ")?;

        let mut visitor = MessageVisitor {
            writer: &mut writer,
            error: None,
        };
        event.record(&mut visitor);
        if let Some(error) = visitor.error {
            return Err(error);
        }

        writeln!(writer)
    }
}

static MESSAGE_FIELD: &str = "message";

struct MessageVisitor<'writer, 'a> {
    writer: &'a mut format::Writer<'writer>,
    error: Option<fmt::Error>,
}

impl Visit for MessageVisitor<'_, '_> {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == MESSAGE_FIELD
            && let Err(error) = write!(self.writer, "{value:?}")
        {
            self.error = Some(error);
        }
    }
}
