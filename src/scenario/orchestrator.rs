// src/scenario/orchestrator.rs

use std::fmt;

use tracing::{debug, error, info};

use crate::errors::Result;
use crate::exec::Launcher;

use super::context::ScenarioContext;
use super::report::{CleanupOutcome, ScenarioReport, StepRecord, StepStatus};
use super::scratch::ScratchDir;
use super::step::StepDefinition;
use super::Scenario;

/// Runs a [`Scenario`] one step at a time and stops at the first failure.
///
/// Launching goes through a [`Launcher`], so tests can record which
/// commands were started without changing the sequencing.
pub struct Orchestrator<L: Launcher> {
    launcher: L,
}

impl<L: Launcher> fmt::Debug for Orchestrator<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Orchestrator").finish_non_exhaustive()
    }
}

impl<L: Launcher> Orchestrator<L> {
    pub fn new(launcher: L) -> Self {
        Self { launcher }
    }

    /// Run every step in order inside a fresh scratch directory.
    ///
    /// Only failing to create the scratch directory is an `Err`; step and
    /// cleanup failures are recorded in the returned report. The directory
    /// is removed on every path out of this function.
    pub async fn run(&self, scenario: &Scenario) -> Result<ScenarioReport> {
        info!(scenario = %scenario.name, steps = scenario.steps.len(), "scenario started");

        let scratch = ScratchDir::create(&scenario.scratch_prefix)?;
        let path = scratch.path().to_path_buf();

        let steps = match ScenarioContext::new(&path, &scenario.vars) {
            Ok(mut ctx) => self.run_steps(&scenario.steps, &mut ctx).await,
            Err(e) => abort_all(&scenario.steps, e.to_string()),
        };

        let cleanup = match scratch.close() {
            Ok(()) => CleanupOutcome::Removed(path),
            Err(e) => CleanupOutcome::Failed {
                path,
                reason: e.to_string(),
            },
        };

        let report = ScenarioReport {
            scenario: scenario.name.clone(),
            steps,
            cleanup,
        };
        info!(scenario = %scenario.name, passed = report.passed(), "scenario finished");
        Ok(report)
    }

    async fn run_steps(
        &self,
        steps: &[StepDefinition],
        ctx: &mut ScenarioContext,
    ) -> Vec<StepRecord> {
        let mut records = Vec::with_capacity(steps.len());
        let mut failed = false;

        for step in steps {
            if failed {
                let name = step.display_name(ctx);
                debug!(step = %name, "skipping step after earlier failure");
                records.push(StepRecord {
                    name,
                    status: StepStatus::Skipped,
                });
                continue;
            }

            let record = self.run_step(step, ctx).await;
            failed = !record.status.is_passed();
            records.push(record);
        }

        records
    }

    async fn run_step(&self, step: &StepDefinition, ctx: &mut ScenarioContext) -> StepRecord {
        let name = step.display_name(ctx);

        let prepared = step
            .command(ctx)
            .and_then(|command| Ok((command, step.expect.matcher(ctx)?)));
        let (command, matcher) = match prepared {
            Ok(prepared) => prepared,
            Err(e) => {
                error!(step = %name, error = %e, "step could not be prepared");
                return StepRecord {
                    name,
                    status: StepStatus::Aborted(e.to_string()),
                };
            }
        };

        info!(step = %name, command = %command.spec(), "step started");
        let session = self.launcher.launch(&command);
        let report = session.report().await;

        let status = match matcher.check(&report) {
            Ok(()) => {
                info!(step = %name, "step passed");
                if let Some(var) = &step.capture {
                    ctx.set(var.clone(), report.stdout_lossy().trim());
                }
                StepStatus::Passed
            }
            Err(failure) => {
                error!(step = %name, reason = %failure.kind, "step failed");
                StepStatus::Failed(failure)
            }
        };

        StepRecord { name, status }
    }
}

fn abort_all(steps: &[StepDefinition], reason: String) -> Vec<StepRecord> {
    error!(error = %reason, "scenario variables could not be rendered");
    steps
        .iter()
        .enumerate()
        .map(|(idx, step)| StepRecord {
            name: step.name.clone(),
            status: if idx == 0 {
                StepStatus::Aborted(reason.clone())
            } else {
                StepStatus::Skipped
            },
        })
        .collect()
}
