// src/config/loader.rs

use std::fs;
use std::path::Path;

use crate::config::model::{RawScenarioFile, ScenarioConfig};
use crate::errors::Result;

/// Load a scenario file from a given path and return the raw `RawScenarioFile`.
///
/// This only performs TOML deserialization; it does **not** perform semantic
/// validation (durations, templates, etc.). Use [`load_and_validate`] for that.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawScenarioFile> {
    let contents = fs::read_to_string(path.as_ref())?;
    parse_str(&contents)
}

/// Parse scenario TOML held in memory.
pub fn parse_str(contents: &str) -> Result<RawScenarioFile> {
    let config: RawScenarioFile = toml::from_str(contents)?;
    Ok(config)
}

/// Load a scenario file from path and validate it.
///
/// This is the recommended entry point for the rest of the application:
///
/// - Reads TOML.
/// - Applies defaults (handled by `serde` default functions).
/// - Checks for:
///   - at least one step,
///   - parseable durations and stdout patterns,
///   - template placeholders that name known variables.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<ScenarioConfig> {
    let raw_config = load_from_path(&path)?;
    ScenarioConfig::try_from(raw_config)
}
