// src/config/model.rs

use std::collections::BTreeMap;
use std::time::Duration;

use serde::Deserialize;

use crate::scenario::StdoutCheck;
use crate::types::BinaryRef;

/// Scenario file as read from TOML.
///
/// ```toml
/// [config]
/// name = "backwards compatibility"
/// default_timeout = "10m"
///
/// [release]
/// script = "./scripts/download-previous-release.sh"
/// go_back_versions = 2
/// binary_name = "eksctl"
///
/// [binaries]
/// current = "./eksctl"
///
/// [vars]
/// region = "us-west-2"
///
/// [[step]]
/// name = "fetching the new cluster"
/// binary = "current"
/// args = ["get", "cluster", "{cluster_name}", "--output", "json"]
/// expect_stdout = { contains = "{cluster_name}" }
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct RawScenarioFile {
    #[serde(default)]
    pub config: ConfigSection,

    pub release: ReleaseSection,

    #[serde(default)]
    pub binaries: BinariesSection,

    /// User variables for `{name}` placeholders.
    #[serde(default)]
    pub vars: BTreeMap<String, String>,

    /// `[[step]]` tables, in execution order.
    #[serde(default, rename = "step")]
    pub steps: Vec<RawStep>,
}

/// `[config]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigSection {
    #[serde(default = "default_name")]
    pub name: String,

    /// Prefix of the temporary directory created for the run.
    #[serde(default = "default_scratch_prefix")]
    pub scratch_prefix: String,

    /// Timeout for steps that don't set their own; unset means unbounded.
    #[serde(default)]
    pub default_timeout: Option<String>,
}

fn default_name() -> String {
    "backwards compatibility".to_string()
}

fn default_scratch_prefix() -> String {
    crate::scenario::DEFAULT_SCRATCH_PREFIX.to_string()
}

impl Default for ConfigSection {
    fn default() -> Self {
        Self {
            name: default_name(),
            scratch_prefix: default_scratch_prefix(),
            default_timeout: None,
        }
    }
}

/// `[release]` section: how to fetch the previous release.
#[derive(Debug, Clone, Deserialize)]
pub struct ReleaseSection {
    #[serde(default = "default_script")]
    pub script: String,

    /// How many releases back to fetch (`GO_BACK_VERSIONS`).
    #[serde(default = "default_go_back_versions")]
    pub go_back_versions: u32,

    /// File name of the binary the script drops into the scratch dir.
    pub binary_name: String,

    #[serde(default = "default_release_timeout")]
    pub timeout: String,
}

fn default_script() -> String {
    "./scripts/download-previous-release.sh".to_string()
}

fn default_go_back_versions() -> u32 {
    2
}

fn default_release_timeout() -> String {
    "30s".to_string()
}

/// `[binaries]` section.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct BinariesSection {
    /// The binary under test; `--current` overrides it.
    #[serde(default)]
    pub current: Option<String>,
}

/// One `[[step]]` table.
#[derive(Debug, Clone, Deserialize)]
pub struct RawStep {
    pub name: String,

    /// `"previous"`, `"current"` or a path.
    pub binary: BinaryRef,

    #[serde(default)]
    pub args: Vec<String>,

    #[serde(default)]
    pub env: BTreeMap<String, String>,

    #[serde(default)]
    pub timeout: Option<String>,

    #[serde(default)]
    pub expect_stdout: Option<RawStdoutCheck>,

    /// Variable that receives the trimmed stdout when the step passes.
    #[serde(default)]
    pub capture: Option<String>,
}

/// `expect_stdout = { contains = "..." }`; exactly one key is allowed.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct RawStdoutCheck {
    #[serde(default)]
    pub equals: Option<String>,
    #[serde(default)]
    pub contains: Option<String>,
    #[serde(default)]
    pub matches: Option<String>,
}

/// Validated scenario configuration.
///
/// Build it with `ScenarioConfig::try_from(raw)` or
/// [`load_and_validate`](crate::config::load_and_validate).
#[derive(Debug, Clone)]
pub struct ScenarioConfig {
    pub name: String,
    pub scratch_prefix: String,
    pub release: ReleaseConfig,
    pub current_binary: Option<String>,
    pub vars: BTreeMap<String, String>,
    pub steps: Vec<StepConfig>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseConfig {
    pub script: String,
    pub go_back_versions: u32,
    pub binary_name: String,
    pub timeout: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepConfig {
    pub name: String,
    pub binary: BinaryRef,
    pub args: Vec<String>,
    pub env: BTreeMap<String, String>,
    /// Step timeout, already defaulted from `[config].default_timeout`.
    pub timeout: Option<Duration>,
    pub expect_stdout: Option<StdoutCheck>,
    pub capture: Option<String>,
}

impl ScenarioConfig {
    /// Replace the current binary (used for `--current`).
    pub fn with_current_binary(mut self, path: impl Into<String>) -> Self {
        self.current_binary = Some(path.into());
        self
    }
}
