//! Payload compiler: field model + scenario → canonical request body.
//!
//! Compilation is pure and deterministic: the same field model, scenario,
//! and options always produce an identical structure. Field placement is
//! driven by a binding table shared with the reverse-parse direction, so a
//! compiled payload always maps back onto the same field model entries.

use serde_json::{Map, Value};

use crate::{
    error::{Result, TesterError},
    model::{ApmMethod, FieldModel, PayloadShape, Scenario},
};

/// Placeholder emitted when no integration key has been configured yet.
pub(crate) const KEY_PLACEHOLDER: &str = "{integration_key}";

/// An optional payload field gated by a toggle.
///
/// Disabled toggles are simply omitted from the compiled body. An enabled
/// toggle with an empty value fails compilation instead of emitting a
/// malformed field.
#[derive(Debug, Clone, Default)]
pub struct OptionalField {
    /// Whether the field is included at all.
    pub enabled: bool,
    /// The value to emit when enabled.
    pub value: String,
}

/// An optional HTTP header gated by a toggle.
///
/// Validated at compile time alongside the body so an enabled-but-empty
/// header blocks compilation the same way an empty optional field does; the
/// header itself is attached at dispatch, not embedded in the body.
#[derive(Debug, Clone, Default)]
pub struct OptionalHeader {
    /// Whether the header is sent at all.
    pub enabled: bool,
    /// Header name.
    pub name: String,
    /// Header value.
    pub value: String,
}

/// Explicit compiler configuration.
///
/// Everything that used to be a global toggle is passed in here so
/// compilation stays free of hidden state.
#[derive(Debug, Clone, Default)]
pub struct CompileOptions {
    /// Integration key injected at the top of the body. Empty means the
    /// placeholder is emitted instead.
    pub integration_key: String,
    /// Soft descriptor shown on the payer's statement.
    pub soft_descriptor: OptionalField,
    /// Extra request header, validated here and sent by the transport.
    pub custom_header: OptionalHeader,
    /// Method type for the alternative-payment scenario. Ignored for card
    /// scenarios; required for [`Scenario::AlternativePayment`].
    pub method: Option<ApmMethod>,
}

impl CompileOptions {
    /// Creates options with just an integration key.
    #[must_use]
    pub fn new(integration_key: impl Into<String>) -> Self {
        Self { integration_key: integration_key.into(), ..Self::default() }
    }
}

/// Canonical compiled request body, before override merging.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledPayload(Value);

impl CompiledPayload {
    /// Borrows the underlying JSON structure.
    #[must_use]
    pub const fn as_value(&self) -> &Value {
        &self.0
    }

    /// Consumes the payload into its JSON structure.
    #[must_use]
    pub fn into_value(self) -> Value {
        self.0
    }
}

/// One field → payload-path binding.
#[derive(Debug, Clone, Copy)]
pub(crate) struct FieldBinding {
    /// Field model key.
    pub field: &'static str,
    /// Path of the value inside the compiled body.
    pub path: &'static [&'static str],
}

const fn bind(field: &'static str, path: &'static [&'static str]) -> FieldBinding {
    FieldBinding { field, path }
}

/// Bindings for both card scenarios.
const CARD_BINDINGS: [FieldBinding; 11] = [
    bind("amount_total", &["payment", "amount_total"]),
    bind("currency_code", &["payment", "currency_code"]),
    bind("name", &["payment", "name"]),
    bind("email", &["payment", "email"]),
    bind("birth_date", &["payment", "birth_date"]),
    bind("country", &["payment", "country"]),
    bind("phone_number", &["payment", "phone_number"]),
    bind("card_number", &["payment", "card", "card_number"]),
    bind("card_name", &["payment", "card", "card_name"]),
    bind("card_due_date", &["payment", "card", "card_due_date"]),
    bind("card_cvv", &["payment", "card", "card_cvv"]),
];

/// Bindings for payment-nested alternative-payment methods.
const APM_NESTED_BINDINGS: [FieldBinding; 7] = [
    bind("amount_total", &["payment", "amount_total"]),
    bind("currency_code", &["payment", "currency_code"]),
    bind("name", &["payment", "name"]),
    bind("email", &["payment", "email"]),
    bind("birth_date", &["payment", "birth_date"]),
    bind("country", &["payment", "country"]),
    bind("phone_number", &["payment", "phone_number"]),
];

/// Bindings for direct (top-level) alternative-payment methods.
const APM_DIRECT_BINDINGS: [FieldBinding; 7] = [
    bind("amount_total", &["amount_total"]),
    bind("currency_code", &["currency_code"]),
    bind("name", &["name"]),
    bind("email", &["email"]),
    bind("birth_date", &["birth_date"]),
    bind("country", &["country"]),
    bind("phone_number", &["phone_number"]),
];

/// Returns the binding table for a scenario.
///
/// The same table drives compilation and reverse-parsing, which is what
/// makes the two directions agree on every editable field.
pub(crate) fn bindings(scenario: Scenario, method: Option<ApmMethod>) -> &'static [FieldBinding] {
    match scenario {
        Scenario::Unauthenticated | Scenario::Authenticated => &CARD_BINDINGS,
        Scenario::AlternativePayment => match method.map(ApmMethod::shape) {
            Some(PayloadShape::Direct) => &APM_DIRECT_BINDINGS,
            // Nested is the table for the scenario even when the method is
            // missing; compilation rejects that case before using it.
            Some(PayloadShape::PaymentNested) | None => &APM_NESTED_BINDINGS,
        },
    }
}

/// Inserts `value` at `path`, creating intermediate objects as needed.
pub(crate) fn insert_path(body: &mut Value, path: &[&str], value: Value) {
    let mut cursor = body;
    for segment in &path[..path.len() - 1] {
        let map = cursor.as_object_mut().expect("payload body is always an object tree");
        cursor = map
            .entry((*segment).to_owned())
            .or_insert_with(|| Value::Object(Map::new()));
        if !cursor.is_object() {
            *cursor = Value::Object(Map::new());
        }
    }
    if let Some(map) = cursor.as_object_mut() {
        map.insert(path[path.len() - 1].to_owned(), value);
    }
}

/// Looks up the value at `path`, if present.
pub(crate) fn get_path<'a>(body: &'a Value, path: &[&str]) -> Option<&'a Value> {
    let mut cursor = body;
    for segment in path {
        cursor = cursor.as_object()?.get(*segment)?;
    }
    Some(cursor)
}

fn validate_options(scenario: Scenario, options: &CompileOptions) -> Result<()> {
    if options.soft_descriptor.enabled && options.soft_descriptor.value.trim().is_empty() {
        return Err(TesterError::IncompleteConfiguration(
            "soft descriptor is enabled but empty".to_owned(),
        ));
    }
    if options.custom_header.enabled
        && (options.custom_header.name.trim().is_empty()
            || options.custom_header.value.trim().is_empty())
    {
        return Err(TesterError::IncompleteConfiguration(
            "custom header is enabled but name or value is empty".to_owned(),
        ));
    }
    if scenario == Scenario::AlternativePayment && options.method.is_none() {
        return Err(TesterError::IncompleteConfiguration(
            "alternative-payment scenario requires a method type".to_owned(),
        ));
    }
    Ok(())
}

/// Compiles a field model into the canonical request body for a scenario.
///
/// Scenario-fixed parameters are not user-editable: the authenticated
/// scenario forces `auto_capture = false` and `threeds_force = true` on the
/// card block, the unauthenticated scenario captures automatically and
/// omits `threeds_force`, and alternative-payment bodies take the shape
/// declared for their method type.
///
/// # Errors
///
/// Returns [`TesterError::IncompleteConfiguration`] when an enabled toggle
/// has an empty value or the alternative-payment scenario has no method
/// type. No partial body is ever produced.
pub fn compile(
    model: &FieldModel,
    scenario: Scenario,
    options: &CompileOptions,
) -> Result<CompiledPayload> {
    validate_options(scenario, options)?;

    let mut body = Value::Object(Map::new());

    let key = if options.integration_key.is_empty() {
        KEY_PLACEHOLDER.to_owned()
    } else {
        options.integration_key.clone()
    };
    insert_path(&mut body, &["integration_key"], Value::String(key));
    insert_path(&mut body, &["operation"], Value::String("request".to_owned()));

    for binding in bindings(scenario, options.method) {
        if let Some(value) = model.get(binding.field) {
            insert_path(&mut body, binding.path, value.to_json());
        }
    }

    match scenario {
        Scenario::Unauthenticated => {
            insert_path(&mut body, &["payment", "card", "auto_capture"], Value::Bool(true));
        }
        Scenario::Authenticated => {
            insert_path(&mut body, &["payment", "card", "auto_capture"], Value::Bool(false));
            insert_path(&mut body, &["payment", "card", "threeds_force"], Value::Bool(true));
        }
        Scenario::AlternativePayment => {
            let method = options.method.expect("validated above");
            let type_path: &[&str] = match method.shape() {
                PayloadShape::PaymentNested => &["payment", "payment_type_code"],
                PayloadShape::Direct => &["payment_type_code"],
            };
            insert_path(&mut body, type_path, Value::String(method.wire_name().to_owned()));
        }
    }

    if options.soft_descriptor.enabled {
        let descriptor_path: &[&str] = match scenario {
            Scenario::AlternativePayment
                if options.method.map(ApmMethod::shape) == Some(PayloadShape::Direct) =>
            {
                &["soft_descriptor"]
            }
            _ => &["payment", "soft_descriptor"],
        };
        insert_path(
            &mut body,
            descriptor_path,
            Value::String(options.soft_descriptor.value.clone()),
        );
    }

    Ok(CompiledPayload(body))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ProfileCategory;

    fn card_model() -> FieldModel {
        FieldModel::reset(ProfileCategory::Card)
    }

    fn apm_model() -> FieldModel {
        FieldModel::reset(ProfileCategory::AlternativePayment)
    }

    #[test]
    fn test_compile_unauthenticated_structure() {
        let payload =
            compile(&card_model(), Scenario::Unauthenticated, &CompileOptions::new("sk_test"))
                .unwrap();
        let body = payload.as_value();

        assert_eq!(body["integration_key"], "sk_test");
        assert_eq!(body["operation"], "request");
        assert_eq!(body["payment"]["card"]["card_number"], "4111111111111111");
        assert_eq!(body["payment"]["card"]["auto_capture"], true);
        assert!(body["payment"]["card"].get("threeds_force").is_none());
    }

    #[test]
    fn test_compile_authenticated_forces_threeds() {
        let payload =
            compile(&card_model(), Scenario::Authenticated, &CompileOptions::new("sk_test"))
                .unwrap();
        let body = payload.as_value();

        assert_eq!(body["payment"]["card"]["auto_capture"], false);
        assert_eq!(body["payment"]["card"]["threeds_force"], true);
    }

    #[test]
    fn test_scenario_switch_changes_exactly_two_card_paths() {
        let model = card_model();
        let options = CompileOptions::new("sk_test");
        let unauth = compile(&model, Scenario::Unauthenticated, &options).unwrap().into_value();
        let auth = compile(&model, Scenario::Authenticated, &options).unwrap().into_value();

        let mut unauth_fixed = unauth.clone();
        insert_path(&mut unauth_fixed, &["payment", "card", "auto_capture"], Value::Bool(false));
        insert_path(&mut unauth_fixed, &["payment", "card", "threeds_force"], Value::Bool(true));
        assert_eq!(unauth_fixed, auth);
    }

    #[test]
    fn test_compile_missing_key_emits_placeholder() {
        let payload =
            compile(&card_model(), Scenario::Unauthenticated, &CompileOptions::default()).unwrap();
        assert_eq!(payload.as_value()["integration_key"], KEY_PLACEHOLDER);
    }

    #[test]
    fn test_compile_is_deterministic() {
        let model = card_model();
        let options = CompileOptions::new("sk_test");
        let first = compile(&model, Scenario::Authenticated, &options).unwrap();
        let second = compile(&model, Scenario::Authenticated, &options).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_compile_apm_nested_shape() {
        let mut options = CompileOptions::new("sk_test");
        options.method = Some(ApmMethod::Mpesa);

        let payload = compile(&apm_model(), Scenario::AlternativePayment, &options).unwrap();
        let body = payload.as_value();

        assert_eq!(body["payment"]["payment_type_code"], "mpesa");
        assert_eq!(body["payment"]["phone_number"], "254708663158");
        assert!(body.get("phone_number").is_none());
    }

    #[test]
    fn test_compile_apm_direct_shape() {
        let mut options = CompileOptions::new("sk_test");
        options.method = Some(ApmMethod::BankTransfer);

        let payload = compile(&apm_model(), Scenario::AlternativePayment, &options).unwrap();
        let body = payload.as_value();

        assert_eq!(body["payment_type_code"], "banktransfer");
        assert_eq!(body["currency_code"], "KES");
        assert!(body.get("payment").is_none());
    }

    #[test]
    fn test_compile_apm_without_method_fails() {
        let result = compile(
            &apm_model(),
            Scenario::AlternativePayment,
            &CompileOptions::new("sk_test"),
        );
        assert!(matches!(result, Err(TesterError::IncompleteConfiguration(_))));
    }

    #[test]
    fn test_soft_descriptor_included_when_enabled() {
        let mut options = CompileOptions::new("sk_test");
        options.soft_descriptor = OptionalField { enabled: true, value: "ACME*TEST".to_owned() };

        let payload = compile(&card_model(), Scenario::Unauthenticated, &options).unwrap();
        assert_eq!(payload.as_value()["payment"]["soft_descriptor"], "ACME*TEST");
    }

    #[test]
    fn test_soft_descriptor_omitted_when_disabled() {
        let payload =
            compile(&card_model(), Scenario::Unauthenticated, &CompileOptions::new("sk_test"))
                .unwrap();
        assert!(payload.as_value()["payment"].get("soft_descriptor").is_none());
    }

    #[test]
    fn test_soft_descriptor_enabled_empty_fails() {
        let mut options = CompileOptions::new("sk_test");
        options.soft_descriptor = OptionalField { enabled: true, value: "  ".to_owned() };

        let result = compile(&card_model(), Scenario::Unauthenticated, &options);
        assert!(matches!(result, Err(TesterError::IncompleteConfiguration(_))));
    }

    #[test]
    fn test_custom_header_enabled_empty_fails() {
        let mut options = CompileOptions::new("sk_test");
        options.custom_header =
            OptionalHeader { enabled: true, name: "X-Debug".to_owned(), value: String::new() };

        let result = compile(&card_model(), Scenario::Unauthenticated, &options);
        assert!(matches!(result, Err(TesterError::IncompleteConfiguration(_))));
    }

    #[test]
    fn test_custom_header_valid_does_not_touch_body() {
        let mut options = CompileOptions::new("sk_test");
        options.custom_header = OptionalHeader {
            enabled: true,
            name: "X-Debug".to_owned(),
            value: "on".to_owned(),
        };

        let with_header = compile(&card_model(), Scenario::Unauthenticated, &options).unwrap();
        let without =
            compile(&card_model(), Scenario::Unauthenticated, &CompileOptions::new("sk_test"))
                .unwrap();
        assert_eq!(with_header, without);
    }

    #[test]
    fn test_amounts_compile_as_decimal_strings() {
        let mut model = card_model();
        model.set_text("amount_total", "10.00").unwrap();

        let payload =
            compile(&model, Scenario::Unauthenticated, &CompileOptions::new("sk_test")).unwrap();
        assert_eq!(payload.as_value()["payment"]["amount_total"], "10.00");
    }

    #[test]
    fn test_get_path_and_insert_path() {
        let mut body = Value::Object(Map::new());
        insert_path(&mut body, &["a", "b", "c"], Value::from(1));
        assert_eq!(get_path(&body, &["a", "b", "c"]), Some(&Value::from(1)));
        assert_eq!(get_path(&body, &["a", "missing"]), None);
    }
}
