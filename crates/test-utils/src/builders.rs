#![allow(dead_code)]

use std::collections::BTreeMap;

use compatrun::config::{
    BinariesSection, ConfigSection, RawScenarioFile, RawStdoutCheck, RawStep, ReleaseSection,
    ScenarioConfig,
};
use compatrun::types::BinaryRef;

/// Builder for `ScenarioConfig` to simplify test setup.
pub struct ScenarioFileBuilder {
    file: RawScenarioFile,
}

impl ScenarioFileBuilder {
    /// Release script and binary name are required by the file format.
    pub fn new(script: &str, binary_name: &str) -> Self {
        Self {
            file: RawScenarioFile {
                config: ConfigSection::default(),
                release: ReleaseSection {
                    script: script.to_string(),
                    go_back_versions: 2,
                    binary_name: binary_name.to_string(),
                    timeout: "30s".to_string(),
                },
                binaries: BinariesSection::default(),
                vars: BTreeMap::new(),
                steps: Vec::new(),
            },
        }
    }

    pub fn with_step(mut self, step: RawStep) -> Self {
        self.file.steps.push(step);
        self
    }

    pub fn with_var(mut self, name: &str, value: &str) -> Self {
        self.file.vars.insert(name.to_string(), value.to_string());
        self
    }

    pub fn with_current(mut self, path: &str) -> Self {
        self.file.binaries.current = Some(path.to_string());
        self
    }

    pub fn with_default_timeout(mut self, timeout: &str) -> Self {
        self.file.config.default_timeout = Some(timeout.to_string());
        self
    }

    pub fn with_scratch_prefix(mut self, prefix: &str) -> Self {
        self.file.config.scratch_prefix = prefix.to_string();
        self
    }

    pub fn with_release_timeout(mut self, timeout: &str) -> Self {
        self.file.release.timeout = timeout.to_string();
        self
    }

    pub fn raw(self) -> RawScenarioFile {
        self.file
    }

    pub fn build(self) -> ScenarioConfig {
        ScenarioConfig::try_from(self.file).expect("Failed to build valid scenario from builder")
    }
}

/// Builder for `RawStep`.
pub struct StepBuilder {
    step: RawStep,
}

impl StepBuilder {
    pub fn new(name: &str, binary: &str) -> Self {
        Self {
            step: RawStep {
                name: name.to_string(),
                binary: BinaryRef::from(binary.to_string()),
                args: vec![],
                env: BTreeMap::new(),
                timeout: None,
                expect_stdout: None,
                capture: None,
            },
        }
    }

    pub fn arg(mut self, arg: &str) -> Self {
        self.step.args.push(arg.to_string());
        self
    }

    pub fn args(mut self, args: &[&str]) -> Self {
        self.step.args.extend(args.iter().map(|a| a.to_string()));
        self
    }

    pub fn env(mut self, key: &str, value: &str) -> Self {
        self.step.env.insert(key.to_string(), value.to_string());
        self
    }

    pub fn timeout(mut self, timeout: &str) -> Self {
        self.step.timeout = Some(timeout.to_string());
        self
    }

    pub fn expect_contains(mut self, text: &str) -> Self {
        self.step.expect_stdout = Some(RawStdoutCheck {
            contains: Some(text.to_string()),
            ..RawStdoutCheck::default()
        });
        self
    }

    pub fn expect_equals(mut self, text: &str) -> Self {
        self.step.expect_stdout = Some(RawStdoutCheck {
            equals: Some(text.to_string()),
            ..RawStdoutCheck::default()
        });
        self
    }

    pub fn expect_matches(mut self, pattern: &str) -> Self {
        self.step.expect_stdout = Some(RawStdoutCheck {
            matches: Some(pattern.to_string()),
            ..RawStdoutCheck::default()
        });
        self
    }

    pub fn capture(mut self, var: &str) -> Self {
        self.step.capture = Some(var.to_string());
        self
    }

    pub fn build(self) -> RawStep {
        self.step
    }
}
