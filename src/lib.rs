// src/lib.rs

pub mod cli;
pub mod config;
pub mod errors;
pub mod exec;
pub mod logging;
pub mod matchers;
pub mod scenario;
pub mod types;

use anyhow::Result;
use tracing::{debug, info};

use crate::cli::CliArgs;
use crate::config::load_and_validate;
use crate::exec::RealLauncher;
use crate::scenario::compat::build_scenario;
use crate::scenario::{Orchestrator, Scenario};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - scenario file loading + validation
/// - the `--current` override
/// - the orchestrator with the real process launcher
/// - the final summary and exit status
pub async fn run(args: CliArgs) -> Result<()> {
    let mut cfg = load_and_validate(&args.config)?;
    if let Some(current) = args.current {
        cfg = cfg.with_current_binary(current);
    }

    let scenario = build_scenario(&cfg)?;

    if args.dry_run {
        print_dry_run(&scenario);
        return Ok(());
    }

    info!(config = %args.config, "running scenario");
    let orchestrator = Orchestrator::new(RealLauncher);
    let report = orchestrator.run(&scenario).await?;

    println!("{report}");
    report.into_result()?;
    Ok(())
}

/// Simple dry-run output: print variables and each step's templates.
fn print_dry_run(scenario: &Scenario) {
    println!("compatrun dry-run");
    println!("  scenario = {}", scenario.name);
    println!("  scratch_prefix = {}", scenario.scratch_prefix);
    println!();

    println!("vars ({}):", scenario.vars.len());
    for (name, value) in scenario.vars.iter() {
        println!("  {name} = {value}");
    }
    println!();

    println!("steps ({}):", scenario.steps.len());
    for (idx, step) in scenario.steps.iter().enumerate() {
        println!("  {}. {}", idx + 1, step.name);
        println!("      binary: {}", step.binary);
        if !step.args.is_empty() {
            println!("      args: {:?}", step.args);
        }
        if !step.env.is_empty() {
            println!("      env: {:?}", step.env);
        }
        if let Some(timeout) = step.timeout {
            println!("      timeout: {timeout:?}");
        }
        println!("      expect: {:?}", step.expect);
        if let Some(ref var) = step.capture {
            println!("      capture: {var}");
        }
    }

    debug!("dry-run complete (nothing launched)");
}
