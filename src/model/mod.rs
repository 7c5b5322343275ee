//! Typed field model and scenario selection.
//!
//! This module defines the editable representation of one payment profile:
//! the scenario being exercised, the per-category field schema, and the
//! typed name → value map the rest of the engine compiles from.

pub mod field;
pub mod scenario;

pub use field::{FieldKind, FieldModel, FieldSpec, FieldValue};
pub use scenario::{ApmMethod, PayloadShape, ProfileCategory, Scenario};
