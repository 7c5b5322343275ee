//! Override merging: compiled payload + profile fragment → effective payload.
//!
//! The merge is total and side-effect-free. A path present in the override
//! fragment replaces the compiled value at that path outright; if the
//! override redefines a path as a different shape (scalar where the
//! compiler emitted an object, or vice versa), the override shape wins.
//! Paths absent from the fragment keep the compiler's values, so merging an
//! empty fragment is the identity.

use serde_json::{Map, Value};

use crate::payload::compile::CompiledPayload;

/// The payload actually transmitted: compiled body with overrides applied.
#[derive(Debug, Clone, PartialEq)]
pub struct EffectivePayload(Value);

impl EffectivePayload {
    /// Borrows the underlying JSON structure. This is always the unmasked
    /// data; display masking derives from it and never replaces it.
    #[must_use]
    pub const fn as_value(&self) -> &Value {
        &self.0
    }

    /// Consumes the payload into its JSON structure.
    #[must_use]
    pub fn into_value(self) -> Value {
        self.0
    }

    /// Renders the payload as indented JSON text for the raw editor.
    #[must_use]
    pub fn to_pretty_string(&self) -> String {
        serde_json::to_string_pretty(&self.0).unwrap_or_else(|_| self.0.to_string())
    }

    /// Wraps an already-effective JSON body.
    ///
    /// Used by the reverse-parse direction, where the user's raw edit *is*
    /// the effective payload.
    #[must_use]
    pub(crate) const fn from_value(value: Value) -> Self {
        Self(value)
    }
}

fn merge_value(base: &mut Value, overlay: &Value) {
    match (base, overlay) {
        (Value::Object(base_map), Value::Object(overlay_map)) => {
            for (key, overlay_value) in overlay_map {
                match base_map.get_mut(key) {
                    Some(base_value) => merge_value(base_value, overlay_value),
                    None => {
                        base_map.insert(key.clone(), overlay_value.clone());
                    }
                }
            }
        }
        (base_slot, _) => *base_slot = overlay.clone(),
    }
}

/// Overlays a profile's override fragment onto a compiled payload.
///
/// Neither input is mutated. `merge(compiled, None)` returns the compiled
/// body unchanged.
#[must_use]
pub fn merge(compiled: &CompiledPayload, fragment: Option<&Value>) -> EffectivePayload {
    let mut body = compiled.as_value().clone();
    if let Some(fragment) = fragment {
        merge_value(&mut body, fragment);
    }
    EffectivePayload(body)
}

/// Computes the implicit override fragment: the paths where `edited`
/// diverges from (or extends) `compiled`.
///
/// This is the inverse of [`merge`] for the paths `edited` carries:
/// `merge(compiled, override_diff(edited, compiled))` reproduces every
/// value in `edited`. Paths present only in `compiled` are not expressible
/// as an override (overrides replace, they never delete) and are left to
/// the compiler.
#[must_use]
pub fn override_diff(edited: &Value, compiled: &Value) -> Option<Value> {
    match (edited, compiled) {
        (Value::Object(edited_map), Value::Object(compiled_map)) => {
            let mut fragment = Map::new();
            for (key, edited_value) in edited_map {
                match compiled_map.get(key) {
                    Some(compiled_value) => {
                        if let Some(diff) = override_diff(edited_value, compiled_value) {
                            fragment.insert(key.clone(), diff);
                        }
                    }
                    None => {
                        fragment.insert(key.clone(), edited_value.clone());
                    }
                }
            }
            if fragment.is_empty() {
                None
            } else {
                Some(Value::Object(fragment))
            }
        }
        _ if edited == compiled => None,
        _ => Some(edited.clone()),
    }
}
