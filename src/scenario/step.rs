// src/scenario/step.rs

//! One launch-and-assert unit of a scenario.

use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use crate::errors::{HarnessError, Result};
use crate::exec::CommandBuilder;
use crate::matchers::{
    Matcher, contain_substring, equal, match_regex, run_successfully, run_successfully_with_output,
};

use super::context::ScenarioContext;

/// Stdout condition whose expected text is itself a template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StdoutCheck {
    Equals(String),
    Contains(String),
    Matches(String),
}

/// What a step must achieve to pass.
pub enum Expectation {
    /// Exit code 0.
    Success,
    /// Exit code 0 and stdout satisfying the rendered check.
    Stdout(StdoutCheck),
    /// Any matcher supplied by the caller.
    Custom(Box<dyn Matcher>),
}

impl fmt::Debug for Expectation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expectation::Success => f.write_str("Success"),
            Expectation::Stdout(check) => f.debug_tuple("Stdout").field(check).finish(),
            Expectation::Custom(m) => f.debug_tuple("Custom").field(&m.describe()).finish(),
        }
    }
}

impl Expectation {
    /// Materialise the matcher for this run.
    pub fn matcher(&self, ctx: &ScenarioContext) -> Result<Box<dyn Matcher + '_>> {
        let matcher: Box<dyn Matcher + '_> = match self {
            Expectation::Success => Box::new(run_successfully()),
            Expectation::Stdout(StdoutCheck::Equals(t)) => {
                Box::new(run_successfully_with_output(equal(ctx.render(t)?)))
            }
            Expectation::Stdout(StdoutCheck::Contains(t)) => {
                Box::new(run_successfully_with_output(contain_substring(ctx.render(t)?)))
            }
            Expectation::Stdout(StdoutCheck::Matches(t)) => {
                let pattern = ctx.render(t)?;
                let predicate = match_regex(&pattern).map_err(|e| {
                    HarnessError::Template(format!("invalid stdout pattern {pattern:?}: {e}"))
                })?;
                Box::new(run_successfully_with_output(predicate))
            }
            Expectation::Custom(matcher) => Box::new(&**matcher),
        };
        Ok(matcher)
    }
}

/// Definition of a step; rendered into a command immediately before launch.
///
/// Name, binary, arguments and env values are templates over the
/// [`ScenarioContext`].
#[derive(Debug)]
pub struct StepDefinition {
    pub name: String,
    pub binary: String,
    pub args: Vec<String>,
    pub env: BTreeMap<String, String>,
    pub timeout: Option<Duration>,
    pub expect: Expectation,
    /// Store the trimmed stdout of a passing run under this variable.
    pub capture: Option<String>,
}

impl StepDefinition {
    pub fn new(name: impl Into<String>, binary: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            binary: binary.into(),
            args: Vec::new(),
            env: BTreeMap::new(),
            timeout: None,
            expect: Expectation::Success,
            capture: None,
        }
    }

    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn expecting(mut self, expect: Expectation) -> Self {
        self.expect = expect;
        self
    }

    pub fn expecting_matcher(self, matcher: impl Matcher + 'static) -> Self {
        self.expecting(Expectation::Custom(Box::new(matcher)))
    }

    pub fn capturing(mut self, var: impl Into<String>) -> Self {
        self.capture = Some(var.into());
        self
    }

    pub fn display_name(&self, ctx: &ScenarioContext) -> String {
        ctx.render(&self.name).unwrap_or_else(|_| self.name.clone())
    }

    /// Render this step into a ready-to-launch command.
    pub fn command(&self, ctx: &ScenarioContext) -> Result<CommandBuilder> {
        let args = self
            .args
            .iter()
            .map(|a| ctx.render(a))
            .collect::<Result<Vec<_>>>()?;
        let env = self
            .env
            .iter()
            .map(|(k, v)| Ok((k.clone(), ctx.render(v)?)))
            .collect::<Result<Vec<_>>>()?;

        let mut builder = CommandBuilder::new(ctx.render(&self.binary)?)
            .with_args(args)
            .with_envs(env);
        if let Some(timeout) = self.timeout {
            builder = builder.with_timeout(timeout);
        }
        Ok(builder)
    }
}
