// crates/orixa-cli/src/lib.rs
// ============================================================================
// Module: Orixa CLI Library
// Description: Shared helpers behind the `orixa` binary.
// Purpose: Expose localization and script replay for the binary and tests.
// Dependencies: orixa-config, orixa-core, serde, thiserror
// ============================================================================

//! ## Overview
//! The `orixa` binary validates configuration, prints catalogs, and replays
//! JSON command scripts against a fresh engine workspace. The replay model
//! lives in [`script`] so it can be tested without spawning the binary.

pub mod i18n;
pub mod script;

#[cfg(test)]
mod tests;
