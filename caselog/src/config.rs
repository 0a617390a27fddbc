// Copyright (c) The caselog Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration for caselog.
//!
//! The embedded default config is layered underneath a repository config,
//! read from `.config/caselog.toml` in the workspace root or from an
//! explicitly specified file.

use crate::{
    errors::{ConfigParseError, ConfigParseErrorKind},
    session::{SessionClock, TimestampFormat},
};
use camino::{Utf8Path, Utf8PathBuf};
use config::{Config, ConfigBuilder, ConfigError, File, FileFormat, builder::DefaultState};
use serde::{Deserialize, Deserializer};
use std::collections::BTreeSet;
use tracing_subscriber::filter::Targets;

/// Overall configuration for caselog.
#[derive(Clone, Debug)]
pub struct CaseLogConfig {
    workspace_root: Utf8PathBuf,
    inner: CaseLogConfigDeserialize,
}

impl CaseLogConfig {
    /// The location of the repository config, relative to the workspace root.
    pub const CONFIG_PATH: &'static str = ".config/caselog.toml";

    /// Contains the default config as a TOML file.
    ///
    /// Repository-specific configuration is layered on top of this:
    ///
    /// ```toml
    #[doc = include_str!("../default-config.toml")]
    /// ```
    pub const DEFAULT_CONFIG: &'static str = include_str!("../default-config.toml");

    /// Reads the config from the given file, or if not specified from
    /// `.config/caselog.toml` in the workspace root.
    ///
    /// If neither exists, the default config is used. Keys that aren't
    /// recognized are passed to `unknown_callback` rather than causing an
    /// error.
    pub fn from_sources(
        workspace_root: impl Into<Utf8PathBuf>,
        config_file: Option<&Utf8Path>,
        mut unknown_callback: impl FnMut(&Utf8Path, &BTreeSet<String>),
    ) -> Result<Self, ConfigParseError> {
        let workspace_root = workspace_root.into();

        let (config_file, source) = match config_file {
            Some(file) => (file.to_owned(), File::new(file.as_str(), FileFormat::Toml)),
            None => {
                let config_file = workspace_root.join(Self::CONFIG_PATH);
                let source = File::new(config_file.as_str(), FileFormat::Toml).required(false);
                (config_file, source)
            }
        };

        let builder = Self::make_default_config().add_source(source);
        let (inner, unknown) = Self::build_and_deserialize_config(&builder)
            .map_err(|kind| ConfigParseError::new(config_file.clone(), kind))?;

        if !unknown.is_empty() {
            unknown_callback(&config_file, &unknown);
        }

        Ok(Self {
            workspace_root,
            inner,
        })
    }

    /// Returns the default config, ignoring any repository config.
    pub fn default_config(workspace_root: impl Into<Utf8PathBuf>) -> Self {
        let (inner, unknown) = Self::build_and_deserialize_config(&Self::make_default_config())
            .expect("default config is always valid");

        // The default config is embedded in this crate, so an unknown key is a
        // bug here.
        assert!(
            unknown.is_empty(),
            "found unknown keys in default config: {unknown:?}"
        );

        Self {
            workspace_root: workspace_root.into(),
            inner,
        }
    }

    /// Returns the workspace root the config was read for.
    pub fn workspace_root(&self) -> &Utf8Path {
        &self.workspace_root
    }

    /// Returns the store section.
    pub fn store(&self) -> &StoreConfig {
        &self.inner.store
    }

    /// Returns the session section.
    pub fn session(&self) -> &SessionConfig {
        &self.inner.session
    }

    /// Returns the log-file section.
    pub fn log_file(&self) -> &LogFileConfig {
        &self.inner.log_file
    }

    // ---
    // Helper methods
    // ---

    fn make_default_config() -> ConfigBuilder<DefaultState> {
        Config::builder().add_source(File::from_str(Self::DEFAULT_CONFIG, FileFormat::Toml))
    }

    /// This returns a tuple of (config, ignored paths).
    fn build_and_deserialize_config(
        builder: &ConfigBuilder<DefaultState>,
    ) -> Result<(CaseLogConfigDeserialize, BTreeSet<String>), ConfigParseErrorKind> {
        let config = builder
            .build_cloned()
            .map_err(|error| ConfigParseErrorKind::BuildError(Box::new(error)))?;

        let mut ignored = BTreeSet::new();
        let mut cb = |path: serde_ignored::Path| {
            ignored.insert(path.to_string());
        };
        let ignored_de = serde_ignored::Deserializer::new(config, &mut cb);
        let config: CaseLogConfigDeserialize = serde_path_to_error::deserialize(ignored_de)
            .map_err(|error| {
                // serde_path_to_error already tracks the key, so drop it from
                // the config error to avoid printing it twice.
                let path = error.path().clone();
                let error = match error.into_inner() {
                    ConfigError::At { error, .. } => *error,
                    other => other,
                };
                ConfigParseErrorKind::DeserializeError(Box::new(serde_path_to_error::Error::new(
                    path, error,
                )))
            })?;

        Ok((config, ignored))
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct CaseLogConfigDeserialize {
    store: StoreConfig,
    session: SessionConfig,
    log_file: LogFileConfig,
}

/// Where run artifacts are stored.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct StoreConfig {
    results_dir: Utf8PathBuf,
    logs_dir: String,
    summary_file: String,
}

impl StoreConfig {
    /// Creates a new store config.
    pub fn new(
        results_dir: impl Into<Utf8PathBuf>,
        logs_dir: impl Into<String>,
        summary_file: impl Into<String>,
    ) -> Self {
        Self {
            results_dir: results_dir.into(),
            logs_dir: logs_dir.into(),
            summary_file: summary_file.into(),
        }
    }

    /// The results root. May be relative to the workspace root.
    pub fn results_dir(&self) -> &Utf8Path {
        &self.results_dir
    }

    /// The segment between the session timestamp and per-test directories.
    pub fn logs_dir(&self) -> &str {
        &self.logs_dir
    }

    /// The summary file name.
    pub fn summary_file(&self) -> &str {
        &self.summary_file
    }
}

/// Settings for the session clock.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct SessionConfig {
    #[serde(deserialize_with = "deserialize_timestamp_format")]
    timestamp_format: TimestampFormat,
}

impl SessionConfig {
    /// Creates a session config with the given format.
    pub fn new(timestamp_format: TimestampFormat) -> Self {
        Self { timestamp_format }
    }

    /// The chrono format string for the session timestamp.
    pub fn timestamp_format(&self) -> &str {
        self.timestamp_format.as_str()
    }

    /// Creates a session clock from this config.
    pub fn clock(&self) -> SessionClock {
        SessionClock::with_format(self.timestamp_format.clone())
    }
}

fn deserialize_timestamp_format<'de, D>(deserializer: D) -> Result<TimestampFormat, D::Error>
where
    D: Deserializer<'de>,
{
    let input = String::deserialize(deserializer)?;
    TimestampFormat::new(&input).map_err(serde::de::Error::custom)
}

/// Settings for per-test log files.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct LogFileConfig {
    #[serde(deserialize_with = "deserialize_targets")]
    level: Targets,
}

impl LogFileConfig {
    /// Creates a log file config with the given filter.
    pub fn new(level: Targets) -> Self {
        Self { level }
    }

    /// The filter applied to events routed to per-test log files.
    pub fn level(&self) -> &Targets {
        &self.level
    }
}

fn deserialize_targets<'de, D>(deserializer: D) -> Result<Targets, D::Error>
where
    D: Deserializer<'de>,
{
    let input = String::deserialize(deserializer)?;
    input.parse().map_err(|error| {
        serde::de::Error::custom(format!("invalid level filter `{input}`: {error}"))
    })
}
