// crates/orixa-core/src/runtime/mod.rs
// ============================================================================
// Module: Orixa Runtime
// Description: Mutable engines built on the shared rule logic.
// Purpose: Group the concept, ladder, opportunity, and mapping engines.
// Dependencies: crate::{core, interfaces}, rule-logic
// ============================================================================

//! ## Overview
//! Each engine owns one slice of the rule configuration and mutates it in
//! place. Mutations return whether they applied, leave state untouched when
//! they do not, and report both outcomes through the injected
//! [`crate::EngineHooks`]. Configuration status is recomputed after every
//! applied change.

pub mod concepts;
pub mod ladder;
pub mod mapping;
pub mod opportunity;
