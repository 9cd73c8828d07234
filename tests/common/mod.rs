#![allow(dead_code, unused_imports)]

use std::error::Error;

pub use compatrun_test_utils::builders;
pub use compatrun_test_utils::{
    RecordingLauncher, init_tracing, with_timeout, write_fake_release_script, write_script,
};

pub type TestResult = Result<(), Box<dyn Error>>;

/// `sh -c <script>` as separate argv elements.
pub fn sh(script: &str) -> [String; 2] {
    ["-c".to_string(), script.to_string()]
}
