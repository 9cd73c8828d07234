mod common;
use crate::common::{TestResult, init_tracing, sh, with_timeout, write_script};

use std::time::{Duration, Instant};

use compatrun::exec::{CommandBuilder, SessionState};

#[tokio::test]
async fn version_output_is_captured_with_exit_code_zero() -> TestResult {
    init_tracing();
    let dir = tempfile::tempdir()?;
    let bin = write_script(
        dir.path(),
        "fakectl",
        r#"if [ "$1" = "version" ]; then echo "0.42.1"; fi"#,
    );

    let session = CommandBuilder::new(bin.to_string_lossy())
        .with_arg("version")
        .run();

    assert_eq!(with_timeout(session.exit_code()).await, Some(0));
    assert_eq!(session.stdout(), b"0.42.1\n");
    assert!(session.stdout_lossy().contains("0.42.1"));
    assert!(session.stderr().is_empty());
    Ok(())
}

#[tokio::test]
async fn nonexistent_binary_is_launch_failed_immediately() -> TestResult {
    init_tracing();
    let session = CommandBuilder::new("/nonexistent/compatrun-missing-binary").run();

    // No waiting needed: a failed spawn is terminal from the start.
    assert!(session.is_terminal());
    match session.state() {
        SessionState::LaunchFailed { reason } => {
            assert!(!reason.is_empty());
            assert!(reason.contains("compatrun-missing-binary"), "{reason}");
        }
        other => panic!("expected LaunchFailed, got {other:?}"),
    }
    assert_eq!(with_timeout(session.exit_code()).await, None);
    assert!(session.stdout().is_empty());
    assert!(session.stderr().is_empty());
    Ok(())
}

#[tokio::test]
async fn non_zero_exit_code_and_stderr_are_reported() -> TestResult {
    init_tracing();
    let session = CommandBuilder::new("sh")
        .with_args(sh("echo out; echo oops >&2; exit 3"))
        .run();

    let state = with_timeout(session.wait()).await;
    assert_eq!(state, SessionState::Completed { exit_code: 3 });
    assert!(!state.is_success());
    assert_eq!(session.stdout_lossy(), "out\n");
    assert_eq!(session.stderr_lossy(), "oops\n");
    Ok(())
}

#[tokio::test]
async fn session_is_running_until_the_process_exits() -> TestResult {
    init_tracing();
    let session = CommandBuilder::new("sh").with_args(sh("sleep 1")).run();

    assert_eq!(session.state(), SessionState::Running);
    assert!(!session.is_terminal());

    let state = with_timeout(session.wait()).await;
    assert_eq!(state, SessionState::Completed { exit_code: 0 });
    assert!(session.is_terminal());
    Ok(())
}

#[tokio::test]
async fn timeout_kills_process_and_keeps_partial_output() -> TestResult {
    init_tracing();
    let timeout = Duration::from_millis(300);
    let started = Instant::now();
    let session = CommandBuilder::new("sh")
        .with_args(sh("echo partial; sleep 5; echo never"))
        .with_timeout(timeout)
        .run();

    let state = with_timeout(session.wait()).await;
    let elapsed = started.elapsed();

    assert_eq!(state, SessionState::TimedOut { after: timeout });
    assert!(elapsed >= timeout, "finished too early: {elapsed:?}");
    assert!(elapsed < Duration::from_secs(3), "took {elapsed:?}");
    assert_eq!(session.exit_code().await, None);
    assert_eq!(session.stdout_lossy(), "partial\n");
    Ok(())
}

#[tokio::test]
async fn timeout_also_kills_background_descendants() -> TestResult {
    init_tracing();
    // The backgrounded sleeps inherit stdout. If they survived the kill
    // the capture would stay open until the drain grace ran out.
    let timeout = Duration::from_millis(200);
    let started = Instant::now();
    let session = CommandBuilder::new("sh")
        .with_args(sh("sleep 30 & sleep 30 & wait"))
        .with_timeout(timeout)
        .run();

    let state = with_timeout(session.wait()).await;
    let elapsed = started.elapsed();

    assert_eq!(state, SessionState::TimedOut { after: timeout });
    assert!(
        elapsed < timeout + Duration::from_millis(1500),
        "descendants kept the session alive for {elapsed:?}"
    );
    Ok(())
}

#[tokio::test]
async fn process_finishing_before_timeout_completes_normally() -> TestResult {
    init_tracing();
    let session = CommandBuilder::new("sh")
        .with_args(sh("echo quick"))
        .with_timeout(Duration::from_secs(5))
        .run();

    assert_eq!(
        with_timeout(session.wait()).await,
        SessionState::Completed { exit_code: 0 }
    );
    assert_eq!(session.stdout_lossy(), "quick\n");
    Ok(())
}

#[tokio::test]
async fn env_overrides_merge_with_inherited_environment() -> TestResult {
    init_tracing();
    let session = CommandBuilder::new("sh")
        .with_args(sh(r#"test -n "$PATH" && printf '%s' "$COMPATRUN_TEST_VALUE""#))
        .with_env("COMPATRUN_TEST_VALUE", "first")
        .with_env("COMPATRUN_TEST_VALUE", "second")
        .run();

    assert_eq!(with_timeout(session.exit_code()).await, Some(0));
    assert_eq!(session.stdout_lossy(), "second");
    Ok(())
}

#[tokio::test]
async fn current_dir_is_applied() -> TestResult {
    init_tracing();
    let dir = tempfile::tempdir()?;
    std::fs::write(dir.path().join("marker.txt"), "here")?;

    let session = CommandBuilder::new("cat")
        .with_arg("marker.txt")
        .with_current_dir(dir.path())
        .run();

    assert_eq!(with_timeout(session.exit_code()).await, Some(0));
    assert_eq!(session.stdout_lossy(), "here");
    Ok(())
}

#[tokio::test]
async fn large_output_is_fully_captured_before_completion() -> TestResult {
    init_tracing();
    let session = CommandBuilder::new("sh")
        .with_args(sh(
            "i=0; while [ $i -lt 2000 ]; do echo line$i; i=$((i+1)); done",
        ))
        .run();

    with_timeout(session.wait()).await;
    let out = session.stdout_lossy();
    assert_eq!(out.lines().count(), 2000);
    assert_eq!(out.lines().last(), Some("line1999"));
    Ok(())
}

#[tokio::test]
async fn terminal_reads_are_idempotent() -> TestResult {
    init_tracing();
    let session = CommandBuilder::new("sh")
        .with_args(sh("echo same; exit 2"))
        .run();

    let first = with_timeout(session.report()).await;
    let second = with_timeout(session.report()).await;

    assert_eq!(first.state, second.state);
    assert_eq!(first.stdout, second.stdout);
    assert_eq!(first.stderr, second.stderr);
    assert_eq!(session.exit_code().await, Some(2));
    assert_eq!(session.exit_code().await, Some(2));
    Ok(())
}

#[tokio::test]
async fn clones_observe_the_same_process() -> TestResult {
    init_tracing();
    let session = CommandBuilder::new("sh")
        .with_args(sh("sleep 0.2; echo shared"))
        .run();
    let other = session.clone();

    let (a, b) = with_timeout(async { tokio::join!(session.wait(), other.wait()) }).await;
    assert_eq!(a, b);
    assert_eq!(other.stdout_lossy(), "shared\n");
    Ok(())
}

#[tokio::test]
async fn builder_changes_after_launch_do_not_reach_the_session() -> TestResult {
    init_tracing();
    let builder = CommandBuilder::new("sh").with_args(sh("exit 0"));
    let session = builder.run();

    let builder = builder
        .with_arg("extra")
        .with_env("LATE", "1")
        .with_timeout(Duration::from_millis(1));

    assert_eq!(session.spec().args, vec!["-c", "exit 0"]);
    assert!(session.spec().env.is_empty());
    assert_eq!(session.spec().timeout, None);
    assert_eq!(builder.spec().args.len(), 3);

    assert_eq!(with_timeout(session.exit_code()).await, Some(0));
    Ok(())
}

#[tokio::test]
async fn huge_timeout_behaves_like_no_timeout() -> TestResult {
    init_tracing();
    let session = CommandBuilder::new("sh")
        .with_args(sh("echo fine"))
        .with_timeout(Duration::MAX)
        .run();

    assert_eq!(
        with_timeout(session.wait()).await,
        SessionState::Completed { exit_code: 0 }
    );
    assert_eq!(session.stdout_lossy(), "fine\n");
    Ok(())
}
