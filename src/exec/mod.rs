// src/exec/mod.rs

//! Process execution layer.
//!
//! This module launches external binaries with `tokio::process::Command`,
//! captures their output and enforces timeouts.
//!
//! - [`spec`] holds the immutable `CommandSpec` value.
//! - [`builder`] is the fluent `CommandBuilder` that launches a spec.
//! - [`session`] is the `ProcessSession` handle returned by a launch.
//! - [`capture`] streams stdout/stderr into shared buffers.
//! - [`watcher`] races process exit against the timeout.
//! - [`launcher`] provides the `Launcher` trait the orchestrator uses, with
//!   `RealLauncher` for production and room for recording fakes in tests.

pub mod builder;
pub mod capture;
pub mod launcher;
pub mod session;
pub mod spec;
pub mod watcher;

pub use builder::CommandBuilder;
pub use launcher::{Launcher, RealLauncher};
pub use session::{ProcessSession, SessionReport, SessionState};
pub use spec::CommandSpec;
