// src/config/mod.rs

//! Scenario file loading and validation.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a scenario file from disk (`loader.rs`).
//! - Validate it into a `ScenarioConfig` (`validate.rs`).

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{load_and_validate, load_from_path, parse_str};
pub use model::{
    BinariesSection, ConfigSection, RawScenarioFile, RawStdoutCheck, RawStep, ReleaseConfig,
    ReleaseSection, ScenarioConfig, StepConfig,
};
