//! Display-only privacy masking for sensitive payload fields.
//!
//! Masking is a pure projection over an [`EffectivePayload`]: the masked
//! copy is what screens and logs may show, while the view keeps a handle to
//! the untouched source for the transport layer. Mask runs are fixed-length
//! so the redacted portion never leaks how long the real value is.

use serde_json::Value;

use crate::payload::merge::EffectivePayload;

/// Character used for redacted runs.
const MASK_CHAR: char = '*';

/// Fixed run length replacing the tail of a card number.
const CARD_RUN: usize = 10;

/// Fixed run length replacing a security code.
const CODE_RUN: usize = 3;

/// Fixed run length replacing the interior of a credential.
const CREDENTIAL_RUN: usize = 4;

#[derive(Debug, Clone, Copy)]
enum MaskRule {
    /// Keep the first six characters (issuer prefix), redact the rest.
    CardNumber,
    /// Redact the whole value.
    SecurityCode,
    /// Keep the first and last four characters, redact the interior.
    Credential,
}

/// Sensitive paths and how each is redacted. Masking applies only here;
/// every other path is copied through verbatim.
const SENSITIVE_PATHS: &[(&[&str], MaskRule)] = &[
    (&["integration_key"], MaskRule::Credential),
    (&["payment", "card", "card_number"], MaskRule::CardNumber),
    (&["payment", "card", "card_cvv"], MaskRule::SecurityCode),
];

fn run(len: usize) -> String {
    std::iter::repeat(MASK_CHAR).take(len).collect()
}

fn mask_card_number(value: &str) -> String {
    if value.len() >= 6 {
        format!("{}{}", &value[..6], run(CARD_RUN))
    } else {
        // Too short for a prefix; the full fixed-length run is its own
        // masked form, which keeps re-masking stable.
        run(6 + CARD_RUN)
    }
}

fn mask_security_code(_value: &str) -> String {
    run(CODE_RUN)
}

fn mask_credential(value: &str) -> String {
    if value.len() > 8 {
        format!(
            "{}{}{}",
            &value[..4],
            run(CREDENTIAL_RUN),
            &value[value.len() - 4..]
        )
    } else {
        run(CREDENTIAL_RUN)
    }
}

fn apply_rule(rule: MaskRule, value: &str) -> String {
    match rule {
        MaskRule::CardNumber => mask_card_number(value),
        MaskRule::SecurityCode => mask_security_code(value),
        MaskRule::Credential => mask_credential(value),
    }
}

/// Display-safe projection of an effective payload.
///
/// The view is ephemeral: recompute it on every read rather than storing
/// it. It always carries a reference back to the unmasked source so
/// dispatch can use the real values regardless of display state.
#[derive(Debug)]
pub struct MaskedView<'a> {
    masked: Value,
    source: &'a EffectivePayload,
}

impl<'a> MaskedView<'a> {
    /// Borrows the masked JSON structure for display.
    #[must_use]
    pub const fn masked(&self) -> &Value {
        &self.masked
    }

    /// Borrows the unmasked payload this view was derived from.
    #[must_use]
    pub const fn source(&self) -> &'a EffectivePayload {
        self.source
    }

    /// Renders the masked structure as indented JSON text.
    #[must_use]
    pub fn to_pretty_string(&self) -> String {
        serde_json::to_string_pretty(&self.masked).unwrap_or_else(|_| self.masked.to_string())
    }
}

/// Derives a masked view of an effective payload.
///
/// Pure and idempotent on its own output: masking an already-masked value
/// yields the same value. String values at sensitive paths are redacted per
/// their rule; non-string scalars at those paths are replaced by the rule's
/// fixed run so nothing sensitive slips through as a number.
#[must_use]
pub fn mask(payload: &EffectivePayload) -> MaskedView<'_> {
    let mut masked = payload.as_value().clone();
    for (path, rule) in SENSITIVE_PATHS {
        if let Some(slot) = lookup_mut(&mut masked, path) {
            match slot {
                Value::String(s) => *s = apply_rule(*rule, s),
                Value::Object(_) | Value::Array(_) | Value::Null => {}
                other => {
                    let len = match rule {
                        MaskRule::CardNumber => 6 + CARD_RUN,
                        MaskRule::SecurityCode => CODE_RUN,
                        MaskRule::Credential => CREDENTIAL_RUN,
                    };
                    *other = Value::String(run(len));
                }
            }
        }
    }
    MaskedView { masked, source: payload }
}

fn lookup_mut<'a>(body: &'a mut Value, path: &[&str]) -> Option<&'a mut Value> {
    let mut cursor = body;
    for segment in path {
        cursor = cursor.as_object_mut()?.get_mut(*segment)?;
    }
    Some(cursor)
}
