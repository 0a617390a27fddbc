// Copyright (c) The caselog Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! A scripted stand-in for a host test framework.

use camino::{Utf8Path, Utf8PathBuf};
use camino_tempfile::Utf8TempDir;
use caselog::{
    config::CaseLogConfig,
    errors::CaseLogError,
    events::{LifecycleEvent, PhaseOutcome, PhaseReport, TestPhase},
    hooks::HookRegistry,
    item::{Marker, TestItem},
    output::file_layer,
    plugin::CaseLogPlugin,
    router::LogRouter,
    session::SessionTimestamp,
};
use color_eyre::eyre::{Result, WrapErr, eyre};
use std::collections::BTreeSet;
use tracing::Level;
use tracing_subscriber::{filter::Targets, layer::SubscriberExt};

/// What a test logs during one phase, and how the phase ends.
#[derive(Clone, Debug)]
pub struct PhaseScript {
    logs: Vec<(Level, &'static str)>,
    outcome: PhaseOutcome,
    diagnostic: Option<&'static str>,
}

impl PhaseScript {
    pub fn passed() -> Self {
        Self {
            logs: Vec::new(),
            outcome: PhaseOutcome::Passed,
            diagnostic: None,
        }
    }

    pub fn failed(diagnostic: &'static str) -> Self {
        Self {
            logs: Vec::new(),
            outcome: PhaseOutcome::Failed,
            diagnostic: Some(diagnostic),
        }
    }

    pub fn skipped(reason: &'static str) -> Self {
        Self {
            logs: Vec::new(),
            outcome: PhaseOutcome::Skipped,
            diagnostic: Some(reason),
        }
    }

    pub fn log(mut self, level: Level, message: &'static str) -> Self {
        self.logs.push((level, message));
        self
    }

    fn report(&self, phase: TestPhase) -> PhaseReport {
        let report = PhaseReport::new(phase, self.outcome);
        match self.diagnostic {
            Some(diagnostic) => report.with_diagnostic(diagnostic),
            None => report,
        }
    }

    fn emit_logs(&self) {
        for &(level, message) in &self.logs {
            match level {
                Level::ERROR => tracing::error!(target: "scripted_test", "{message}"),
                Level::WARN => tracing::warn!(target: "scripted_test", "{message}"),
                Level::INFO => tracing::info!(target: "scripted_test", "{message}"),
                Level::DEBUG => tracing::debug!(target: "scripted_test", "{message}"),
                Level::TRACE => tracing::trace!(target: "scripted_test", "{message}"),
            }
        }
    }
}

/// A test, as the host would run it.
#[derive(Clone, Debug)]
pub struct ScriptedTest {
    pub item: TestItem,
    setup: PhaseScript,
    call: PhaseScript,
    teardown: PhaseScript,
}

impl ScriptedTest {
    /// A test that passes every phase without logging anything.
    pub fn new(name: &str, source_file: &str) -> Self {
        Self {
            item: TestItem::new(name).with_source_path(format!("tests/{source_file}")),
            setup: PhaseScript::passed(),
            call: PhaseScript::passed(),
            teardown: PhaseScript::passed(),
        }
    }

    pub fn with_marker(mut self, marker: Marker) -> Self {
        self.item = self.item.with_marker(marker);
        self
    }

    pub fn setup(mut self, script: PhaseScript) -> Self {
        self.setup = script;
        self
    }

    pub fn call(mut self, script: PhaseScript) -> Self {
        self.call = script;
        self
    }

    pub fn teardown(mut self, script: PhaseScript) -> Self {
        self.teardown = script;
        self
    }

    /// Drives the test through the registry the way a host framework would:
    /// setup, then call only if setup passed, then teardown.
    fn run(&self, registry: &mut HookRegistry<'_>) -> Result<(), CaseLogError> {
        let item = &self.item;
        registry.dispatch(LifecycleEvent::SetupStarted { item })?;

        let mut phases = vec![(TestPhase::Setup, &self.setup)];
        if self.setup.outcome == PhaseOutcome::Passed {
            phases.push((TestPhase::Call, &self.call));
        }
        phases.push((TestPhase::Teardown, &self.teardown));

        for (phase, script) in phases {
            script.emit_logs();
            let report = script.report(phase);
            registry.dispatch(LifecycleEvent::PhaseFinished {
                item,
                report: &report,
            })?;
        }
        Ok(())
    }
}

/// A results root in a temporary directory, and a plugin writing to it.
pub struct TestRun {
    temp_dir: Utf8TempDir,
    router: LogRouter,
    file_targets: Targets,
    pub plugin: CaseLogPlugin,
}

impl TestRun {
    /// Creates a run using the default config.
    pub fn new() -> Result<Self> {
        Self::with_config(None)
    }

    /// Creates a run whose workspace root contains `.config/caselog.toml` with
    /// the given contents.
    pub fn with_config(config_toml: Option<&str>) -> Result<Self> {
        let temp_dir = camino_tempfile::Builder::new()
            .prefix("caselog-integration-")
            .tempdir()
            .wrap_err("failed to create temp dir")?;
        if let Some(config_toml) = config_toml {
            let config_dir = temp_dir.path().join(".config");
            std::fs::create_dir_all(&config_dir)?;
            std::fs::write(config_dir.join("caselog.toml"), config_toml)?;
        }

        let mut unknown = BTreeSet::new();
        let config = CaseLogConfig::from_sources(temp_dir.path(), None, |_, keys| {
            unknown.extend(keys.iter().cloned());
        })?;
        if !unknown.is_empty() {
            return Err(eyre!("unknown config keys: {unknown:?}"));
        }

        let router = LogRouter::new();
        let plugin = CaseLogPlugin::new(&config, router.clone());
        Ok(Self {
            temp_dir,
            router,
            file_targets: config.log_file().level().clone(),
            plugin,
        })
    }

    pub fn workspace_root(&self) -> &Utf8Path {
        self.temp_dir.path()
    }

    pub fn session(&self) -> Result<&SessionTimestamp> {
        self.plugin
            .session()
            .ok_or_else(|| eyre!("run has not started"))
    }

    pub fn session_dir(&self) -> Result<Utf8PathBuf> {
        Ok(self.plugin.layout().session_dir(self.session()?))
    }

    pub fn summary(&self) -> Result<String> {
        let path = self
            .plugin
            .summary_path()
            .ok_or_else(|| eyre!("run has not started"))?;
        std::fs::read_to_string(&path).wrap_err_with(|| format!("failed to read `{path}`"))
    }

    /// Returns the log path the plugin would use for `test`.
    pub fn log_path(&self, test: &ScriptedTest) -> Result<Utf8PathBuf> {
        Ok(self.plugin.layout().log_path_for(&test.item, self.session()?))
    }

    /// Starts the run and executes `tests` in order.
    pub fn run(&mut self, tests: &[ScriptedTest]) -> Result<()> {
        let subscriber = tracing_subscriber::registry()
            .with(file_layer(self.router.clone(), self.file_targets.clone()));
        let plugin = &mut self.plugin;
        tracing::subscriber::with_default(subscriber, || {
            let mut registry = HookRegistry::new();
            registry.register(plugin);
            registry.dispatch(LifecycleEvent::RunStarted)?;
            for test in tests {
                test.run(&mut registry)?;
            }
            Ok::<_, CaseLogError>(())
        })?;
        Ok(())
    }
}

/// Returns the relative paths of all files under `dir`, sorted.
pub fn files_under(dir: &Utf8Path) -> Result<BTreeSet<String>> {
    let mut files = BTreeSet::new();
    let mut stack = vec![dir.to_owned()];
    while let Some(current) = stack.pop() {
        for entry in current.read_dir_utf8()? {
            let entry = entry?;
            if entry.file_type()?.is_dir() {
                stack.push(entry.path().to_owned());
            } else {
                let relative = entry.path().strip_prefix(dir)?;
                files.insert(relative.as_str().replace('\\', "/"));
            }
        }
    }
    Ok(files)
}
