pub mod builders;
pub mod recording_launcher;

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::sync::Once;

use tracing_subscriber::{fmt, EnvFilter};

pub use recording_launcher::RecordingLauncher;

static INIT: Once = Once::new();

/// Initialise tracing for tests.
///
/// - Uses `with_test_writer()`, so logs are captured per-test.
/// - The Rust test harness only prints captured output for **failing** tests
///   (unless you run with `-- --nocapture`).
///
/// Enable levels with e.g.:
/// `RUST_LOG=debug cargo test`
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        fmt()
            .with_env_filter(filter)
            .with_test_writer() // print only for failing tests unless --nocapture
            .with_target(true)
            .init();
    });
}

/// Run a future with a 10-second timeout.
pub async fn with_timeout<F, T>(f: F) -> T
where
    F: std::future::Future<Output = T>,
{
    tokio::time::timeout(std::time::Duration::from_secs(10), f)
        .await
        .expect("Test timed out after 10 seconds")
}

/// Write an executable `sh` script named `name` into `dir`.
pub fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, format!("#!/bin/sh\n{body}\n")).expect("write script");
    let mut perms = fs::metadata(&path).expect("script metadata").permissions();
    perms.set_mode(0o755);
    fs::set_permissions(&path, perms).expect("chmod script");
    path
}

/// A fake release download script.
///
/// It writes a fake previous binary named `binary_name` into
/// `$DOWNLOAD_DIR` that prints `version` for `version` and appends every
/// invocation to `log`.
pub fn write_fake_release_script(
    dir: &Path,
    binary_name: &str,
    version: &str,
    log: &Path,
) -> PathBuf {
    let body = format!(
        r#"set -e
test -n "$DOWNLOAD_DIR"
test -n "$GO_BACK_VERSIONS"
echo "download go_back=$GO_BACK_VERSIONS" >> '{log}'
cat > "$DOWNLOAD_DIR/{binary_name}" <<'EOF'
#!/bin/sh
echo "previous $*" >> '{log}'
if [ "$1" = "version" ]; then
  echo "{version}"
fi
EOF
chmod +x "$DOWNLOAD_DIR/{binary_name}""#,
        log = log.display(),
    );
    write_script(dir, "download-previous-release.sh", &body)
}
