// src/scenario/mod.rs

//! Sequential, fail-fast scenarios built on the process harness.
//!
//! A [`Scenario`] is an ordered list of [`StepDefinition`]s plus the
//! variables their templates may use. The [`Orchestrator`] owns a scratch
//! directory for the whole run, renders each step right before launching
//! it, evaluates the step's matcher, and stops at the first failure.
//!
//! [`compat`] builds the backwards-compatibility scenario from a config
//! file.

pub mod compat;
pub mod context;
pub mod orchestrator;
pub mod report;
pub mod scratch;
pub mod step;
pub mod template;

use std::collections::BTreeMap;

pub use context::ScenarioContext;
pub use orchestrator::Orchestrator;
pub use report::{CleanupOutcome, ScenarioReport, StepRecord, StepStatus};
pub use scratch::ScratchDir;
pub use step::{Expectation, StdoutCheck, StepDefinition};

/// Default prefix of the scratch directory name.
pub const DEFAULT_SCRATCH_PREFIX: &str = "compatrun";

#[derive(Debug)]
pub struct Scenario {
    pub name: String,
    pub scratch_prefix: String,
    /// Values for `{name}` placeholders; may reference `{scratch_dir}`.
    pub vars: BTreeMap<String, String>,
    pub steps: Vec<StepDefinition>,
}

impl Scenario {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            scratch_prefix: DEFAULT_SCRATCH_PREFIX.to_string(),
            vars: BTreeMap::new(),
            steps: Vec::new(),
        }
    }

    pub fn with_scratch_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.scratch_prefix = prefix.into();
        self
    }

    pub fn with_var(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(name.into(), value.into());
        self
    }

    pub fn with_step(mut self, step: StepDefinition) -> Self {
        self.steps.push(step);
        self
    }
}
