// src/scenario/compat.rs

//! The backwards-compatibility scenario.
//!
//! Downloads an older release into the scratch directory, asks it for its
//! version, then runs the configured steps against the previous and current
//! binaries.

use std::time::{SystemTime, UNIX_EPOCH};

use tracing::debug;

use crate::config::{ScenarioConfig, StepConfig};
use crate::errors::{HarnessError, Result};
use crate::types::BinaryRef;

use super::context::SCRATCH_DIR_VAR;
use super::step::{Expectation, StdoutCheck, StepDefinition};
use super::template::placeholders;
use super::Scenario;

pub const PREVIOUS_BIN_VAR: &str = "previous_bin";
pub const CURRENT_BIN_VAR: &str = "current_bin";
pub const CLUSTER_NAME_VAR: &str = "cluster_name";
pub const PREVIOUS_VERSION_VAR: &str = "previous_version";

/// Env vars understood by the release download script.
pub const GO_BACK_VERSIONS_ENV: &str = "GO_BACK_VERSIONS";
pub const DOWNLOAD_DIR_ENV: &str = "DOWNLOAD_DIR";

pub const DOWNLOAD_STEP_NAME: &str = "downloading a previous release";
pub const VERSION_STEP_NAME: &str = "querying the previous release version";

/// Turn a validated config into a runnable scenario.
pub fn build_scenario(cfg: &ScenarioConfig) -> Result<Scenario> {
    ensure_current_binary(cfg)?;

    let mut scenario = Scenario::new(&cfg.name)
        .with_scratch_prefix(&cfg.scratch_prefix)
        .with_var(
            PREVIOUS_BIN_VAR,
            format!(
                "{{{SCRATCH_DIR_VAR}}}/{}",
                escape_braces(&cfg.release.binary_name)
            ),
        );

    if let Some(current) = &cfg.current_binary {
        scenario = scenario.with_var(CURRENT_BIN_VAR, escape_braces(current));
    }
    for (name, value) in &cfg.vars {
        scenario = scenario.with_var(name, value);
    }
    if !cfg.vars.contains_key(CLUSTER_NAME_VAR) {
        let generated = generate_cluster_name();
        debug!(cluster_name = %generated, "no cluster_name configured; generated one");
        scenario = scenario.with_var(CLUSTER_NAME_VAR, generated);
    }

    scenario = scenario
        .with_step(download_step(cfg))
        .with_step(version_step());

    for step in &cfg.steps {
        scenario = scenario.with_step(configured_step(step));
    }

    Ok(scenario)
}

fn ensure_current_binary(cfg: &ScenarioConfig) -> Result<()> {
    let needs_current = cfg
        .steps
        .iter()
        .any(|s| s.binary == BinaryRef::Current || references_current(s));

    if needs_current && cfg.current_binary.is_none() {
        return Err(HarnessError::ConfigError(
            "steps use the current binary but none is configured; set [binaries].current or pass --current"
                .to_string(),
        ));
    }
    Ok(())
}

/// Whether any template of `step` names `{current_bin}`.
fn references_current(step: &StepConfig) -> bool {
    let mut templates: Vec<&str> = vec![step.name.as_str()];
    if let BinaryRef::Path(path) = &step.binary {
        templates.push(path);
    }
    templates.extend(step.args.iter().map(String::as_str));
    templates.extend(step.env.values().map(String::as_str));
    if let Some(
        StdoutCheck::Equals(t) | StdoutCheck::Contains(t) | StdoutCheck::Matches(t),
    ) = &step.expect_stdout
    {
        templates.push(t);
    }

    templates.into_iter().any(|t| {
        placeholders(t)
            .map(|names| names.iter().any(|n| n == CURRENT_BIN_VAR))
            .unwrap_or(false)
    })
}

fn download_step(cfg: &ScenarioConfig) -> StepDefinition {
    StepDefinition::new(DOWNLOAD_STEP_NAME, escape_braces(&cfg.release.script))
        .with_env(GO_BACK_VERSIONS_ENV, cfg.release.go_back_versions.to_string())
        .with_env(DOWNLOAD_DIR_ENV, format!("{{{SCRATCH_DIR_VAR}}}"))
        .with_timeout(cfg.release.timeout)
}

fn version_step() -> StepDefinition {
    StepDefinition::new(VERSION_STEP_NAME, format!("{{{PREVIOUS_BIN_VAR}}}"))
        .with_args(["version"])
        .capturing(PREVIOUS_VERSION_VAR)
}

fn configured_step(step: &StepConfig) -> StepDefinition {
    let binary = match &step.binary {
        BinaryRef::Previous => format!("{{{PREVIOUS_BIN_VAR}}}"),
        BinaryRef::Current => format!("{{{CURRENT_BIN_VAR}}}"),
        BinaryRef::Path(path) => path.clone(),
    };

    let mut def = StepDefinition::new(&step.name, binary).with_args(step.args.iter().cloned());
    for (key, value) in &step.env {
        def = def.with_env(key, value);
    }
    if let Some(timeout) = step.timeout {
        def = def.with_timeout(timeout);
    }
    if let Some(check) = &step.expect_stdout {
        def = def.expecting(Expectation::Stdout(check.clone()));
    }
    if let Some(var) = &step.capture {
        def = def.capturing(var);
    }
    def
}

fn escape_braces(s: &str) -> String {
    s.replace('{', "{{").replace('}', "}}")
}

fn generate_cluster_name() -> String {
    let secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default();
    format!("compat-{secs}")
}
