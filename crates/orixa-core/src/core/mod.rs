// crates/orixa-core/src/core/mod.rs
// ============================================================================
// Module: Orixa Core Types
// Description: Identifiers, timestamps, serde adapters, and static catalog types.
// Purpose: Group the data model shared by every engine.
// Dependencies: serde, time, rule-logic
// ============================================================================

//! ## Overview
//! Core types carry no behavior beyond lookups. Catalogs are static
//! configuration data consumed, never owned, by the engines.

pub mod blank;
pub mod catalog;
pub mod identifiers;
pub mod time;
