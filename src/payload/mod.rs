//! Payload compilation, override merging, and privacy masking.
//!
//! The pipeline is strictly ordered: a [`crate::model::FieldModel`] compiles
//! into a [`CompiledPayload`], a profile's override fragment merges on top to
//! produce the [`EffectivePayload`] that is transmitted, and masking derives
//! a display-only [`MaskedView`] as the very last step. Masking never feeds
//! back into compilation or merging.

pub mod compile;
pub mod mask;
pub mod merge;

pub use compile::{compile, CompileOptions, CompiledPayload, OptionalField, OptionalHeader};
pub use mask::{mask, MaskedView};
pub use merge::{merge, override_diff, EffectivePayload};
