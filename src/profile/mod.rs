//! Saved payment profiles and their persistence seam.
//!
//! A profile is a named, persisted configuration: a field-model snapshot
//! plus optional per-scenario override fragments. The engine only ever
//! writes profiles through an explicit save; nothing here persists as a
//! side effect of editing.

pub mod store;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::model::{ApmMethod, FieldModel, ProfileCategory, Scenario};

pub use store::{FileProfileStore, ProfileStore};

/// Identity of a saved profile.
///
/// The name doubles as the payment-type-profile header value sent with
/// every dispatch for this profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileIdentity {
    /// Profile name; unique within (country, type).
    pub name: String,
    /// ISO country code the profile belongs to.
    pub country: String,
    /// Category the field model is drawn from.
    pub category: ProfileCategory,
}

impl ProfileIdentity {
    /// Value for the `X-EBANX-Custom-Payment-Type-Profile` request header.
    #[must_use]
    pub fn header_value(&self) -> &str {
        &self.name
    }
}

/// A persisted profile record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    /// Identity (name, country, category).
    pub identity: ProfileIdentity,
    /// Grouping key inside the store document: card brand (`visa`,
    /// `mastercard`) or alternative-payment method wire name (`mpesa`).
    pub type_code: String,
    /// Field-model snapshot.
    pub fields: FieldModel,
    /// Saved override fragments, one per scenario at most. Absent entries
    /// mean the compiled payload is used as-is.
    #[serde(default)]
    pub overrides: BTreeMap<Scenario, Value>,
}

impl Profile {
    /// Creates a profile with no overrides.
    #[must_use]
    pub fn new(
        identity: ProfileIdentity,
        type_code: impl Into<String>,
        fields: FieldModel,
    ) -> Self {
        Self { identity, type_code: type_code.into(), fields, overrides: BTreeMap::new() }
    }

    /// Resolves the alternative-payment method declared by this profile's
    /// type code, if it names one.
    #[must_use]
    pub fn apm_method(&self) -> Option<ApmMethod> {
        match self.type_code.as_str() {
            "mpesa" => Some(ApmMethod::Mpesa),
            "mtn_momo" => Some(ApmMethod::MtnMomo),
            "banktransfer" => Some(ApmMethod::BankTransfer),
            "eft" => Some(ApmMethod::Eft),
            _ => None,
        }
    }
}
