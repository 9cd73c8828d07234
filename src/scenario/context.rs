// src/scenario/context.rs

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::errors::Result;

use super::template;

/// Built-in variable holding the scratch directory path.
pub const SCRATCH_DIR_VAR: &str = "scratch_dir";

/// Variables visible to step templates during one scenario run.
///
/// Created once the scratch directory exists. Scenario variables may
/// themselves reference `{scratch_dir}`; they are rendered once here.
/// Captures from passing steps are added as the run progresses.
#[derive(Debug, Clone)]
pub struct ScenarioContext {
    scratch_dir: PathBuf,
    vars: BTreeMap<String, String>,
}

impl ScenarioContext {
    pub fn new(scratch_dir: &Path, vars: &BTreeMap<String, String>) -> Result<Self> {
        let scratch = scratch_dir.to_string_lossy().into_owned();
        let lookup = |name: &str| (name == SCRATCH_DIR_VAR).then_some(scratch.as_str());

        let mut rendered = BTreeMap::new();
        rendered.insert(SCRATCH_DIR_VAR.to_string(), scratch.clone());
        for (name, value) in vars {
            rendered.insert(name.clone(), template::render(value, lookup)?);
        }

        Ok(Self {
            scratch_dir: scratch_dir.to_path_buf(),
            vars: rendered,
        })
    }

    pub fn scratch_dir(&self) -> &Path {
        &self.scratch_dir
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.vars.get(name).map(String::as_str)
    }

    /// Record a value for later steps; replaces any previous value.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        debug!(var = %name, value = %value, "scenario variable set");
        self.vars.insert(name, value);
    }

    pub fn render(&self, template: &str) -> Result<String> {
        template::render(template, |name| self.get(name))
    }
}
