// crates/orixa-config/tests/common/mod.rs
// =============================================================================
// Module: Config Test Helpers
// Description: Shared helpers for config and catalog validation tests.
// Purpose: Reduce duplication across integration tests for orixa-config.
// =============================================================================

#![allow(dead_code, reason = "Test helpers are selectively used across suites.")]

use std::fs;
use std::path::PathBuf;

use orixa_config::ConfigError;
use tempfile::TempDir;

/// Standard result type for config tests.
pub type TestResult = Result<(), String>;

/// Asserts that `result` failed with a message containing `needle`.
pub fn assert_invalid<T>(result: Result<T, ConfigError>, needle: &str) -> TestResult {
    match result {
        Err(error) => {
            let message = error.to_string();
            if message.contains(needle) {
                Ok(())
            } else {
                Err(format!("error {message} did not contain {needle}"))
            }
        }
        Ok(_) => Err("expected invalid config".to_string()),
    }
}

/// Writes `contents` to `name` inside a fresh temp dir.
pub fn write_temp(name: &str, contents: &[u8]) -> Result<(TempDir, PathBuf), String> {
    let dir = tempfile::tempdir().map_err(|err| err.to_string())?;
    let path = dir.path().join(name);
    fs::write(&path, contents).map_err(|err| err.to_string())?;
    Ok((dir, path))
}

/// Minimal valid catalog TOML with one category and one concept.
pub const MINIMAL_CATALOG: &str = r#"
[concepts]
operators = ["is"]

[[concepts.categories]]
key = "people"
label = "People"

[[concepts.categories.concepts]]
id = "hcp"
default_name = "HCP"
default_definition = "A healthcare professional."

[[concepts.categories.concepts.sources]]
source = "Veeva CRM"
fields = ["Contact.Role"]
"#;
