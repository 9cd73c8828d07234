// src/config/validate.rs

use std::collections::BTreeSet;
use std::time::Duration;

use regex::Regex;

use crate::config::model::{
    RawScenarioFile, RawStdoutCheck, RawStep, ReleaseConfig, ScenarioConfig, StepConfig,
};
use crate::errors::{HarnessError, Result};
use crate::scenario::compat::{
    CLUSTER_NAME_VAR, CURRENT_BIN_VAR, PREVIOUS_BIN_VAR, PREVIOUS_VERSION_VAR,
};
use crate::scenario::context::SCRATCH_DIR_VAR;
use crate::scenario::template::placeholders;
use crate::scenario::StdoutCheck;
use crate::types::{BinaryRef, parse_duration};

/// Variables the scenario defines itself; `[vars]` and `capture` may not
/// reuse them. `cluster_name` is absent: users may set it.
const RESERVED_VARS: &[&str] = &[
    SCRATCH_DIR_VAR,
    PREVIOUS_BIN_VAR,
    CURRENT_BIN_VAR,
    PREVIOUS_VERSION_VAR,
];

impl TryFrom<RawScenarioFile> for ScenarioConfig {
    type Error = HarnessError;

    fn try_from(raw: RawScenarioFile) -> std::result::Result<Self, Self::Error> {
        ensure_has_steps(&raw)?;
        let release = validate_release(&raw)?;
        let default_timeout = parse_optional_duration(
            raw.config.default_timeout.as_deref(),
            "[config].default_timeout",
        )?;
        validate_vars(&raw)?;
        let steps = validate_steps(&raw, default_timeout)?;

        Ok(ScenarioConfig {
            name: raw.config.name,
            scratch_prefix: raw.config.scratch_prefix,
            release,
            current_binary: raw.binaries.current,
            vars: raw.vars,
            steps,
        })
    }
}

fn config_error(msg: impl Into<String>) -> HarnessError {
    HarnessError::ConfigError(msg.into())
}

fn ensure_has_steps(raw: &RawScenarioFile) -> Result<()> {
    if raw.steps.is_empty() {
        return Err(config_error(
            "scenario must contain at least one [[step]] section",
        ));
    }
    Ok(())
}

fn validate_release(raw: &RawScenarioFile) -> Result<ReleaseConfig> {
    let release = &raw.release;
    if release.script.trim().is_empty() {
        return Err(config_error("[release].script must not be empty"));
    }
    if release.binary_name.trim().is_empty() || release.binary_name.contains('/') {
        return Err(config_error(format!(
            "[release].binary_name must be a plain file name (got {:?})",
            release.binary_name
        )));
    }
    let timeout = parse_duration(&release.timeout)
        .map_err(|e| config_error(format!("[release].timeout: {e}")))?;

    Ok(ReleaseConfig {
        script: release.script.clone(),
        go_back_versions: release.go_back_versions,
        binary_name: release.binary_name.clone(),
        timeout,
    })
}

fn parse_optional_duration(value: Option<&str>, field: &str) -> Result<Option<Duration>> {
    value
        .map(|s| parse_duration(s).map_err(|e| config_error(format!("{field}: {e}"))))
        .transpose()
}

fn is_identifier(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn validate_vars(raw: &RawScenarioFile) -> Result<()> {
    for (name, value) in raw.vars.iter() {
        if !is_identifier(name) {
            return Err(config_error(format!(
                "[vars] name {name:?} must only contain letters, digits and '_'"
            )));
        }
        if RESERVED_VARS.contains(&name.as_str()) {
            return Err(config_error(format!(
                "[vars] cannot redefine built-in variable '{name}'"
            )));
        }
        let used_vars =
            placeholders(value).map_err(|e| config_error(format!("[vars].{name}: {e}")))?;
        for used in used_vars {
            if used != SCRATCH_DIR_VAR {
                return Err(config_error(format!(
                    "[vars].{name} may only reference '{{{SCRATCH_DIR_VAR}}}' (found '{{{used}}}')"
                )));
            }
        }
    }
    Ok(())
}

fn validate_steps(
    raw: &RawScenarioFile,
    default_timeout: Option<Duration>,
) -> Result<Vec<StepConfig>> {
    let mut known: BTreeSet<String> = RESERVED_VARS.iter().map(|s| s.to_string()).collect();
    known.insert(CLUSTER_NAME_VAR.to_string());
    known.extend(raw.vars.keys().cloned());

    let mut steps = Vec::with_capacity(raw.steps.len());
    for (idx, step) in raw.steps.iter().enumerate() {
        if step.name.trim().is_empty() {
            return Err(config_error(format!("step #{} has an empty name", idx + 1)));
        }
        let label = format!("step '{}'", step.name);

        if matches!(&step.binary, BinaryRef::Path(p) if p.trim().is_empty()) {
            return Err(config_error(format!("{label} has an empty binary")));
        }

        let timeout = parse_optional_duration(step.timeout.as_deref(), &format!("{label} timeout"))?
            .or(default_timeout);
        let expect_stdout = step
            .expect_stdout
            .as_ref()
            .map(|check| validate_stdout_check(check, &label))
            .transpose()?;

        check_templates(step, expect_stdout.as_ref(), &known, &label)?;

        if let Some(var) = &step.capture {
            if !is_identifier(var) {
                return Err(config_error(format!(
                    "{label} capture name {var:?} must only contain letters, digits and '_'"
                )));
            }
            if RESERVED_VARS.contains(&var.as_str()) {
                return Err(config_error(format!(
                    "{label} cannot capture into built-in variable '{var}'"
                )));
            }
            known.insert(var.clone());
        }

        steps.push(StepConfig {
            name: step.name.clone(),
            binary: step.binary.clone(),
            args: step.args.clone(),
            env: step.env.clone(),
            timeout,
            expect_stdout,
            capture: step.capture.clone(),
        });
    }
    Ok(steps)
}

fn validate_stdout_check(check: &RawStdoutCheck, label: &str) -> Result<StdoutCheck> {
    match (&check.equals, &check.contains, &check.matches) {
        (Some(text), None, None) => Ok(StdoutCheck::Equals(text.clone())),
        (None, Some(text), None) => Ok(StdoutCheck::Contains(text.clone())),
        (None, None, Some(pattern)) => {
            // Patterns with placeholders are compiled once rendered.
            let used = placeholders(pattern).map_err(|e| {
                config_error(format!("{label} expect_stdout.matches: {e}"))
            })?;
            if used.is_empty() {
                let literal = pattern.replace("{{", "{").replace("}}", "}");
                Regex::new(&literal).map_err(|e| {
                    config_error(format!("{label} expect_stdout.matches is invalid: {e}"))
                })?;
            }
            Ok(StdoutCheck::Matches(pattern.clone()))
        }
        _ => Err(config_error(format!(
            "{label} expect_stdout must set exactly one of equals, contains, matches"
        ))),
    }
}

fn check_templates(
    step: &RawStep,
    expect: Option<&StdoutCheck>,
    known: &BTreeSet<String>,
    label: &str,
) -> Result<()> {
    let mut templates: Vec<&str> = vec![step.name.as_str()];
    if let BinaryRef::Path(p) = &step.binary {
        templates.push(p);
    }
    templates.extend(step.args.iter().map(String::as_str));
    templates.extend(step.env.values().map(String::as_str));
    if let Some(StdoutCheck::Equals(t) | StdoutCheck::Contains(t) | StdoutCheck::Matches(t)) =
        expect
    {
        templates.push(t);
    }

    for template in templates {
        let used = placeholders(template)
            .map_err(|e| config_error(format!("{label}: {e}")))?;
        if let Some(unknown) = used.iter().find(|name| !known.contains(*name)) {
            return Err(config_error(format!(
                "{label} references unknown variable '{unknown}'"
            )));
        }
    }
    Ok(())
}
