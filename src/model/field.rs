//! Typed field model for one payment profile.
//!
//! The field model is a plain in-memory map from field name to typed value.
//! Keys are fixed per profile category; writes outside a field's declared
//! type fail with [`TesterError::Validation`] and leave the model unchanged.
//! The model has no side effects and no knowledge of payload structure —
//! compilation and reverse-parsing live in [`crate::payload`].

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    error::{Result, TesterError},
    model::scenario::ProfileCategory,
};

/// Declared type of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Free-form string.
    Text,
    /// Digits-only string (card numbers, security codes). These are the
    /// fields the privacy mask knows how to redact.
    Digits,
    /// Decimal amount, kept exact via [`rust_decimal`].
    Amount,
    /// Boolean toggle.
    Flag,
}

/// A typed field value.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// Free-form string value.
    Text(String),
    /// Digits-only string value.
    Digits(String),
    /// Exact decimal amount.
    Amount(Decimal),
    /// Boolean value.
    Flag(bool),
}

impl FieldValue {
    /// Returns the kind of this value.
    #[must_use]
    pub const fn kind(&self) -> FieldKind {
        match self {
            Self::Text(_) => FieldKind::Text,
            Self::Digits(_) => FieldKind::Digits,
            Self::Amount(_) => FieldKind::Amount,
            Self::Flag(_) => FieldKind::Flag,
        }
    }

    /// Parses a raw string into a value of the given kind.
    ///
    /// # Errors
    ///
    /// Returns [`TesterError::Validation`] when the string does not satisfy
    /// the kind (non-digits into [`FieldKind::Digits`], unparsable decimal
    /// into [`FieldKind::Amount`], anything but `true`/`false` into
    /// [`FieldKind::Flag`]).
    pub fn parse(field: &str, kind: FieldKind, raw: &str) -> Result<Self> {
        match kind {
            FieldKind::Text => Ok(Self::Text(raw.to_owned())),
            FieldKind::Digits => {
                if raw.is_empty() || !raw.chars().all(|c| c.is_ascii_digit()) {
                    return Err(TesterError::Validation {
                        field: field.to_owned(),
                        reason: "expected digits".to_owned(),
                    });
                }
                Ok(Self::Digits(raw.to_owned()))
            }
            FieldKind::Amount => raw
                .parse::<Decimal>()
                .map(Self::Amount)
                .map_err(|e| TesterError::Validation {
                    field: field.to_owned(),
                    reason: format!("expected a decimal amount: {e}"),
                }),
            FieldKind::Flag => match raw {
                "true" => Ok(Self::Flag(true)),
                "false" => Ok(Self::Flag(false)),
                _ => Err(TesterError::Validation {
                    field: field.to_owned(),
                    reason: "expected 'true' or 'false'".to_owned(),
                }),
            },
        }
    }

    /// Converts a JSON value into a field value of the given kind.
    ///
    /// Numbers are accepted for [`FieldKind::Amount`] so payloads that carry
    /// bare JSON numbers still reverse-parse.
    ///
    /// # Errors
    ///
    /// Returns [`TesterError::Validation`] when the JSON value cannot
    /// represent the kind.
    pub fn from_json(field: &str, kind: FieldKind, value: &Value) -> Result<Self> {
        match (kind, value) {
            (FieldKind::Flag, Value::Bool(b)) => Ok(Self::Flag(*b)),
            (FieldKind::Amount, Value::Number(n)) => Self::parse(field, kind, &n.to_string()),
            (_, Value::String(s)) => Self::parse(field, kind, s),
            _ => Err(TesterError::Validation {
                field: field.to_owned(),
                reason: format!("JSON value {value} does not fit field type"),
            }),
        }
    }

    /// Renders this value as the JSON it compiles to.
    ///
    /// Amounts serialize as plain decimal strings so scale survives a
    /// round trip through the raw payload editor.
    #[must_use]
    pub fn to_json(&self) -> Value {
        match self {
            Self::Text(s) | Self::Digits(s) => Value::String(s.clone()),
            Self::Amount(d) => Value::String(d.to_string()),
            Self::Flag(b) => Value::Bool(*b),
        }
    }

    /// Renders this value for display in a form field.
    #[must_use]
    pub fn display(&self) -> String {
        match self {
            Self::Text(s) | Self::Digits(s) => s.clone(),
            Self::Amount(d) => d.to_string(),
            Self::Flag(b) => b.to_string(),
        }
    }
}

/// Schema entry: one editable field and its declared type.
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    /// Field name, also the key in the compiled payload binding table.
    pub name: &'static str,
    /// Declared type.
    pub kind: FieldKind,
}

const fn spec(name: &'static str, kind: FieldKind) -> FieldSpec {
    FieldSpec { name, kind }
}

/// Customer fields shared by every category.
const CUSTOMER_FIELDS: [FieldSpec; 7] = [
    spec("amount_total", FieldKind::Amount),
    spec("currency_code", FieldKind::Text),
    spec("name", FieldKind::Text),
    spec("email", FieldKind::Text),
    spec("birth_date", FieldKind::Text),
    spec("country", FieldKind::Text),
    spec("phone_number", FieldKind::Text),
];

/// Card-specific fields.
const CARD_FIELDS: [FieldSpec; 4] = [
    spec("card_number", FieldKind::Digits),
    spec("card_name", FieldKind::Text),
    spec("card_due_date", FieldKind::Text),
    spec("card_cvv", FieldKind::Digits),
];

/// Typed name → value map for one profile.
///
/// Construct with [`FieldModel::reset`] to get the default model for a
/// category, or deserialize a persisted snapshot. Values are validated
/// against the category schema on every write.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Snapshot", into = "Snapshot")]
pub struct FieldModel {
    category: ProfileCategory,
    values: BTreeMap<String, FieldValue>,
}

impl FieldModel {
    /// Returns the default field model for a category.
    ///
    /// Defaults are usable placeholder test data, so a freshly reset model
    /// always compiles.
    #[must_use]
    pub fn reset(category: ProfileCategory) -> Self {
        let mut model = Self { category, values: BTreeMap::new() };
        let defaults: &[(&str, &str)] = match category {
            ProfileCategory::Card => &[
                ("amount_total", "100"),
                ("currency_code", "NGN"),
                ("name", "Test User"),
                ("email", "test+ng@example.com"),
                ("birth_date", "01/01/1990"),
                ("country", "ng"),
                ("phone_number", "+2348089895495"),
                ("card_number", "4111111111111111"),
                ("card_name", "Test User"),
                ("card_due_date", "12/2025"),
                ("card_cvv", "123"),
            ],
            ProfileCategory::AlternativePayment => &[
                ("amount_total", "75"),
                ("currency_code", "KES"),
                ("name", "Test User"),
                ("email", "test+ke@example.com"),
                ("birth_date", "01/01/1990"),
                ("country", "ke"),
                ("phone_number", "254708663158"),
            ],
        };
        for (name, raw) in defaults {
            let parsed = FieldValue::parse(name, Self::kind_of(category, name), raw)
                .unwrap_or_else(|_| FieldValue::Text((*raw).to_owned()));
            model.values.insert((*name).to_owned(), parsed);
        }
        model
    }

    /// Returns the schema for a category.
    #[must_use]
    pub fn schema(category: ProfileCategory) -> Vec<FieldSpec> {
        match category {
            ProfileCategory::Card => {
                CUSTOMER_FIELDS.iter().chain(CARD_FIELDS.iter()).copied().collect()
            }
            ProfileCategory::AlternativePayment => CUSTOMER_FIELDS.to_vec(),
        }
    }

    fn kind_of(category: ProfileCategory, name: &str) -> FieldKind {
        Self::schema(category)
            .iter()
            .find(|s| s.name == name)
            .map_or(FieldKind::Text, |s| s.kind)
    }

    fn spec_for(&self, name: &str) -> Result<FieldSpec> {
        Self::schema(self.category)
            .into_iter()
            .find(|s| s.name == name)
            .ok_or_else(|| TesterError::Validation {
                field: name.to_owned(),
                reason: "unknown field for this profile category".to_owned(),
            })
    }

    /// Returns the profile category this model was built for.
    #[must_use]
    pub const fn category(&self) -> ProfileCategory {
        self.category
    }

    /// Looks up a field value.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.values.get(name)
    }

    /// Writes a typed value, returning the previous one.
    ///
    /// # Errors
    ///
    /// Returns [`TesterError::Validation`] when the field is unknown for
    /// this category or the value's kind does not match the declaration.
    /// The model is unchanged on error.
    pub fn set(&mut self, name: &str, value: FieldValue) -> Result<Option<FieldValue>> {
        let spec = self.spec_for(name)?;
        if value.kind() != spec.kind {
            return Err(TesterError::Validation {
                field: name.to_owned(),
                reason: "value type does not match field declaration".to_owned(),
            });
        }
        Ok(self.values.insert(name.to_owned(), value))
    }

    /// Parses a raw string by the field's declared kind and writes it.
    ///
    /// # Errors
    ///
    /// Returns [`TesterError::Validation`] on unknown field or unparsable
    /// value; the model is unchanged on error.
    pub fn set_text(&mut self, name: &str, raw: &str) -> Result<Option<FieldValue>> {
        let spec = self.spec_for(name)?;
        let value = FieldValue::parse(name, spec.kind, raw)?;
        Ok(self.values.insert(name.to_owned(), value))
    }

    /// Iterates fields in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }
}

/// Persisted form of a field model: category plus natural JSON values.
#[derive(Debug, Serialize, Deserialize)]
struct Snapshot {
    category: ProfileCategory,
    values: BTreeMap<String, Value>,
}

impl From<FieldModel> for Snapshot {
    fn from(model: FieldModel) -> Self {
        Self {
            category: model.category,
            values: model.values.iter().map(|(k, v)| (k.clone(), v.to_json())).collect(),
        }
    }
}

impl TryFrom<Snapshot> for FieldModel {
    type Error = TesterError;

    fn try_from(snapshot: Snapshot) -> Result<Self> {
        let mut model = Self { category: snapshot.category, values: BTreeMap::new() };
        for (name, raw) in &snapshot.values {
            let kind = Self::kind_of(snapshot.category, name);
            let value = FieldValue::from_json(name, kind, raw)?;
            model.values.insert(name.clone(), value);
        }
        Ok(model)
    }
}
