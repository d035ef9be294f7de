// crates/orixa-core/src/core/blank.rs
// ============================================================================
// Module: Blank Optional Fields
// Description: Serde adapter mapping empty strings to `None`.
// Purpose: Read and write optional selections stored as `""` when unset.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Unset selections (an exit rule target, a trigger type) are written as an
//! empty string. Reading accepts `""`, whitespace, `null`, or a missing field
//! as `None`; any other string is decoded as the selected value.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;
use serde::Serializer;
use serde::de::IntoDeserializer;
use serde::de::value::StringDeserializer;

// ============================================================================
// SECTION: Adapter
// ============================================================================

/// Serializes `None` as `""` and `Some` as the inner value.
///
/// # Errors
/// Returns the inner value's serialization error.
#[allow(clippy::ref_option, reason = "Serde `with` adapters receive the field by reference.")]
pub fn serialize<T: Serialize, S: Serializer>(value: &Option<T>, serializer: S) -> Result<S::Ok, S::Error> {
    match value {
        Some(inner) => inner.serialize(serializer),
        None => serializer.serialize_str(""),
    }
}

/// Deserializes a string, treating blank or `null` as `None`.
///
/// # Errors
/// Returns an error when a non-blank string does not decode as `T`.
pub fn deserialize<'de, T: Deserialize<'de>, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<T>, D::Error> {
    match Option::<String>::deserialize(deserializer)? {
        Some(text) if !text.trim().is_empty() => {
            let inner: StringDeserializer<D::Error> = text.into_deserializer();
            T::deserialize(inner).map(Some)
        }
        _ => Ok(None),
    }
}
