mod common;
use crate::common::{RecordingLauncher, TestResult, init_tracing, sh, with_timeout};

use std::time::Duration;

use compatrun::errors::HarnessError;
use compatrun::matchers::{FailureKind, run_successfully_with_output, satisfy};
use compatrun::scenario::{
    CleanupOutcome, Expectation, Orchestrator, Scenario, StdoutCheck, StepDefinition, StepStatus,
};

fn step(name: &str, script: &str) -> StepDefinition {
    StepDefinition::new(name, "sh").with_args(sh(script))
}

fn removed_path(cleanup: &CleanupOutcome) -> &std::path::Path {
    match cleanup {
        CleanupOutcome::Removed(path) => path,
        CleanupOutcome::Failed { path, reason } => {
            panic!("cleanup of {} failed: {reason}", path.display())
        }
    }
}

#[tokio::test]
async fn first_failure_stops_the_scenario_and_cleans_up() -> TestResult {
    init_tracing();
    let launcher = RecordingLauncher::new();
    let scenario = Scenario::new("fail fast")
        .with_step(step("A", "exit 0"))
        .with_step(step("B", "echo broken >&2; exit 4"))
        .with_step(step("C", "touch {scratch_dir}/c"))
        .with_step(step("D", "exit 0"));

    let report = with_timeout(Orchestrator::new(launcher.clone()).run(&scenario)).await?;

    assert_eq!(launcher.launched().len(), 2);
    assert!(!report.passed());

    let statuses: Vec<_> = report.steps.iter().map(|s| &s.status).collect();
    assert_eq!(statuses[0], &StepStatus::Passed);
    match statuses[1] {
        StepStatus::Failed(failure) => {
            assert_eq!(failure.kind, FailureKind::NonZeroExit { code: 4 });
            assert_eq!(failure.stderr, "broken\n");
        }
        other => panic!("expected B to fail, got {other:?}"),
    }
    assert_eq!(statuses[2], &StepStatus::Skipped);
    assert_eq!(statuses[3], &StepStatus::Skipped);
    assert_eq!(report.attempted().collect::<Vec<_>>(), vec!["A", "B"]);
    assert_eq!(report.first_failure().map(|s| s.name.as_str()), Some("B"));

    assert!(!removed_path(&report.cleanup).exists());

    match report.into_result() {
        Err(HarnessError::StepFailed { step, failure }) => {
            assert_eq!(step, "B");
            assert_eq!(failure.kind, FailureKind::NonZeroExit { code: 4 });
        }
        other => panic!("expected StepFailed, got {other:?}"),
    }
    Ok(())
}

#[tokio::test]
async fn steps_share_the_scratch_directory() -> TestResult {
    init_tracing();
    let scenario = Scenario::new("scratch sharing")
        .with_step(step("write", "echo hello > {scratch_dir}/note"))
        .with_step(
            step("read", "cat {scratch_dir}/note")
                .expecting(Expectation::Stdout(StdoutCheck::Equals("hello\n".to_string()))),
        );

    let report = with_timeout(Orchestrator::new(RecordingLauncher::new()).run(&scenario)).await?;

    assert!(report.passed(), "{report}");
    assert!(!removed_path(&report.cleanup).exists());
    report.into_result()?;
    Ok(())
}

#[tokio::test]
async fn captured_stdout_feeds_later_steps() -> TestResult {
    init_tracing();
    let launcher = RecordingLauncher::new();
    let scenario = Scenario::new("capture")
        .with_step(step("probe", "printf '  v1.2.3\\n'").capturing("ver"))
        .with_step(
            StepDefinition::new("using {ver}", "sh")
                .with_args(["-c", r#"test "$0" = v1.2.3"#, "{ver}"])
                .with_env("SEEN_VERSION", "{ver}"),
        );

    let report = with_timeout(Orchestrator::new(launcher.clone()).run(&scenario)).await?;

    assert!(report.passed(), "{report}");
    assert_eq!(report.steps[1].name, "using v1.2.3");

    let launched = launcher.launched();
    assert_eq!(launched[1].args, vec!["-c", r#"test "$0" = v1.2.3"#, "v1.2.3"]);
    assert_eq!(
        launched[1].env.get("SEEN_VERSION").map(String::as_str),
        Some("v1.2.3")
    );
    Ok(())
}

#[tokio::test]
async fn scenario_vars_may_reference_the_scratch_dir() -> TestResult {
    init_tracing();
    let scenario = Scenario::new("vars")
        .with_var("marker", "{scratch_dir}/marker")
        .with_step(step("create", "touch {marker}"))
        .with_step(step("check", "test -f {scratch_dir}/marker"));

    let report = with_timeout(Orchestrator::new(RecordingLauncher::new()).run(&scenario)).await?;
    assert!(report.passed(), "{report}");
    Ok(())
}

#[tokio::test]
async fn unknown_variable_aborts_before_launch() -> TestResult {
    init_tracing();
    let launcher = RecordingLauncher::new();
    let scenario = Scenario::new("typo")
        .with_step(step("A", "exit 0"))
        .with_step(step("B", "echo {missing}"))
        .with_step(step("C", "exit 0"));

    let report = with_timeout(Orchestrator::new(launcher.clone()).run(&scenario)).await?;

    assert_eq!(launcher.launched().len(), 1);
    match &report.steps[1].status {
        StepStatus::Aborted(reason) => assert!(reason.contains("missing"), "{reason}"),
        other => panic!("expected Aborted, got {other:?}"),
    }
    assert_eq!(report.steps[2].status, StepStatus::Skipped);
    assert!(!removed_path(&report.cleanup).exists());
    assert!(matches!(
        report.into_result(),
        Err(HarnessError::Template(_))
    ));
    Ok(())
}

#[tokio::test]
async fn bad_scenario_var_aborts_every_step() -> TestResult {
    init_tracing();
    let launcher = RecordingLauncher::new();
    let scenario = Scenario::new("bad var")
        .with_var("broken", "{nope}")
        .with_step(step("A", "exit 0"))
        .with_step(step("B", "exit 0"));

    let report = with_timeout(Orchestrator::new(launcher.clone()).run(&scenario)).await?;

    assert!(launcher.launched().is_empty());
    assert!(matches!(report.steps[0].status, StepStatus::Aborted(_)));
    assert_eq!(report.steps[1].status, StepStatus::Skipped);
    assert!(!removed_path(&report.cleanup).exists());
    Ok(())
}

#[tokio::test]
async fn step_timeout_fails_the_step() -> TestResult {
    init_tracing();
    let timeout = Duration::from_millis(200);
    let scenario = Scenario::new("slow")
        .with_step(step("hang", "sleep 5").with_timeout(timeout))
        .with_step(step("after", "exit 0"));

    let report = with_timeout(Orchestrator::new(RecordingLauncher::new()).run(&scenario)).await?;

    match &report.steps[0].status {
        StepStatus::Failed(failure) => {
            assert_eq!(failure.kind, FailureKind::TimedOut { after: timeout });
        }
        other => panic!("expected timeout failure, got {other:?}"),
    }
    assert_eq!(report.steps[1].status, StepStatus::Skipped);
    Ok(())
}

#[tokio::test]
async fn missing_binary_fails_the_step() -> TestResult {
    init_tracing();
    let scenario = Scenario::new("missing")
        .with_step(StepDefinition::new("ghost", "{scratch_dir}/not-downloaded"));

    let report = with_timeout(Orchestrator::new(RecordingLauncher::new()).run(&scenario)).await?;

    match &report.steps[0].status {
        StepStatus::Failed(failure) => {
            assert!(matches!(failure.kind, FailureKind::LaunchFailed { .. }));
        }
        other => panic!("expected launch failure, got {other:?}"),
    }
    Ok(())
}

#[tokio::test]
async fn custom_matchers_are_honoured() -> TestResult {
    init_tracing();
    let scenario = Scenario::new("custom")
        .with_step(
            step("three lines", "printf 'a\\nb\\nc\\n'").expecting_matcher(
                run_successfully_with_output(satisfy("have three lines", |s: &str| {
                    s.lines().count() == 3
                })),
            ),
        )
        .with_step(
            step("regex", "echo 0.42.1").expecting(Expectation::Stdout(StdoutCheck::Matches(
                r"^\d+\.\d+\.\d+\s*$".to_string(),
            ))),
        )
        .with_step(
            step("contains", "echo compat-xyz")
                .expecting(Expectation::Stdout(StdoutCheck::Contains("xyz".to_string()))),
        );

    let report = with_timeout(Orchestrator::new(RecordingLauncher::new()).run(&scenario)).await?;
    assert!(report.passed(), "{report}");
    Ok(())
}

#[tokio::test]
async fn output_mismatch_is_reported_with_the_predicate() -> TestResult {
    init_tracing();
    let scenario = Scenario::new("mismatch").with_step(
        step("list", "echo '[]'")
            .expecting(Expectation::Stdout(StdoutCheck::Contains("cluster-1".to_string()))),
    );

    let report = with_timeout(Orchestrator::new(RecordingLauncher::new()).run(&scenario)).await?;

    match &report.steps[0].status {
        StepStatus::Failed(failure) => {
            assert!(
                matches!(&failure.kind, FailureKind::OutputMismatch { predicate } if predicate.contains("cluster-1"))
            );
            assert_eq!(failure.stdout, "[]\n");
        }
        other => panic!("expected output mismatch, got {other:?}"),
    }
    Ok(())
}

#[tokio::test]
async fn report_display_lists_every_step() -> TestResult {
    init_tracing();
    let scenario = Scenario::new("display")
        .with_step(step("ok", "exit 0"))
        .with_step(step("bad", "exit 1"))
        .with_step(step("never", "exit 0"));

    let report = with_timeout(Orchestrator::new(RecordingLauncher::new()).run(&scenario)).await?;
    let text = report.to_string();

    assert!(text.contains("scenario: display"), "{text}");
    assert!(text.contains("[passed] ok"), "{text}");
    assert!(text.contains("[FAILED] bad"), "{text}");
    assert!(text.contains("[skipped] never"), "{text}");
    assert!(text.contains("cleanup: removed"), "{text}");
    Ok(())
}
