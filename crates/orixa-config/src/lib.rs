// crates/orixa-config/src/lib.rs
// ============================================================================
// Module: Orixa Config Library
// Description: Configuration model, validation, and built-in catalogs.
// Purpose: Single source of truth for orixa.toml and catalog TOML semantics.
// Dependencies: orixa-core, serde, toml
// ============================================================================

//! ## Overview
//! `orixa-config` loads `orixa.toml` with strict, fail-closed validation and
//! resolves the option catalogs the engines consume: either the built-in
//! catalog embedded in this crate or a replacement catalog file named by the
//! configuration.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod catalog;
pub mod config;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use catalog::builtin_catalogs;
pub use catalog::load_catalogs;
pub use catalog::parse_catalogs;
pub use catalog::validate_catalogs;
pub use config::*;
