//! The synchronization hub between the typed field model and the raw
//! payload text.
//!
//! Edits flow in two directions: a form-field edit recompiles the payload
//! and publishes new raw text; a raw-text edit parses back into the field
//! model, with unrecognized paths collected into an implicit override
//! fragment. The coordinator is an explicit state machine, and its guard
//! is what keeps the two directions from ping-ponging: while one direction
//! is being applied, anything the coordinator's own writes echo back is
//! ignored instead of re-triggering the opposite transition.

use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use crate::{
    error::{Result, TesterError},
    model::{FieldModel, FieldValue, Scenario},
    payload::{
        compile::{bindings, compile, CompileOptions},
        mask::{mask, MaskedView},
        merge::{merge, override_diff, EffectivePayload},
    },
    profile::{Profile, ProfileIdentity},
};

/// Coordinator state. Exposed mainly for tests and diagnostics; callers
/// only ever observe [`Idle`](SyncState::Idle) between calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    /// No edit is being applied.
    Idle,
    /// A form-field edit is being propagated to the raw payload.
    ApplyingFieldEdit,
    /// A raw-payload edit is being propagated to the field model.
    ApplyingPayloadEdit,
}

/// Result of offering an edit to the coordinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// The edit changed state and the other representation was updated.
    Applied,
    /// The edit was an echo of the coordinator's own write, a no-op, or
    /// arrived re-entrantly while another edit was being applied.
    Ignored,
}

/// Keeps one profile's field model and raw payload text mutually
/// consistent.
///
/// All operations are synchronous pure computations over in-memory state;
/// the coordinator holds no locks and expects to be driven from a single
/// interactive thread.
#[derive(Debug)]
pub struct SyncCoordinator {
    state: SyncState,
    scenario: Scenario,
    options: CompileOptions,
    model: FieldModel,
    override_fragment: Option<Value>,
    effective: EffectivePayload,
    raw_text: String,
    pending_text: Option<String>,
}

impl SyncCoordinator {
    /// Creates a coordinator over the default field model for a scenario.
    ///
    /// # Errors
    ///
    /// Returns [`TesterError::IncompleteConfiguration`] when the options
    /// cannot compile (enabled-but-empty toggle, missing method type).
    pub fn new(scenario: Scenario, options: CompileOptions) -> Result<Self> {
        Self::with_model(FieldModel::reset(scenario.category()), None, scenario, options)
    }

    /// Creates a coordinator from a saved profile, loading its field
    /// snapshot and the override fragment saved for the scenario.
    ///
    /// # Errors
    ///
    /// Returns [`TesterError::Validation`] when the profile's category does
    /// not match the scenario, or a compile error from the options.
    pub fn from_profile(
        profile: &Profile,
        scenario: Scenario,
        options: CompileOptions,
    ) -> Result<Self> {
        if profile.identity.category != scenario.category() {
            return Err(TesterError::Validation {
                field: "profile".to_owned(),
                reason: "profile category does not match scenario".to_owned(),
            });
        }
        Self::with_model(
            profile.fields.clone(),
            profile.overrides.get(&scenario).cloned(),
            scenario,
            options,
        )
    }

    fn with_model(
        model: FieldModel,
        override_fragment: Option<Value>,
        scenario: Scenario,
        options: CompileOptions,
    ) -> Result<Self> {
        let compiled = compile(&model, scenario, &options)?;
        let effective = merge(&compiled, override_fragment.as_ref());
        let raw_text = effective.to_pretty_string();
        Ok(Self {
            state: SyncState::Idle,
            scenario,
            options,
            model,
            override_fragment,
            effective,
            raw_text,
            pending_text: None,
        })
    }

    /// Recompiles from the current model and options and republishes the
    /// raw text. State must already be set by the caller.
    fn republish(&mut self) -> Result<()> {
        let compiled = compile(&self.model, self.scenario, &self.options)?;
        self.effective = merge(&compiled, self.override_fragment.as_ref());
        self.raw_text = self.effective.to_pretty_string();
        self.pending_text = None;
        Ok(())
    }

    /// Applies a form-field edit and republishes the raw payload text.
    ///
    /// An edit that leaves the field at its current value returns
    /// [`SyncOutcome::Ignored`] without recompiling; this is what stops a
    /// UI that mirrors published values back into its form from cycling.
    ///
    /// A saved override at the same path still wins in the published
    /// payload: the edit lands in the compiled layer and the override is
    /// reapplied on top. The field model records the edit either way, so
    /// clearing the override later exposes it.
    ///
    /// # Errors
    ///
    /// [`TesterError::Validation`] when the value does not fit the field;
    /// [`TesterError::IncompleteConfiguration`] when recompilation is
    /// blocked. In both cases the previously published payload remains.
    #[instrument(skip(self, raw), fields(field = %field))]
    pub fn field_edited(&mut self, field: &str, raw: &str) -> Result<SyncOutcome> {
        if self.state != SyncState::Idle {
            debug!(state = ?self.state, "re-entrant field edit ignored");
            return Ok(SyncOutcome::Ignored);
        }
        if self.model.get(field).is_some_and(|current| current.display() == raw) {
            return Ok(SyncOutcome::Ignored);
        }

        self.state = SyncState::ApplyingFieldEdit;
        let result = self.apply_field_edit(field, raw);
        self.state = SyncState::Idle;
        result
    }

    fn apply_field_edit(&mut self, field: &str, raw: &str) -> Result<SyncOutcome> {
        let previous = self.model.set_text(field, raw)?;
        if let Err(e) = self.republish() {
            // Compilation refused the current options; put the model back so
            // the published payload and the model stay consistent.
            if let Some(value) = previous {
                let _ = self.model.set(field, value);
            }
            return Err(e);
        }
        info!(field = %field, "field edit published to raw payload");
        Ok(SyncOutcome::Applied)
    }

    /// Applies a raw payload-text edit back onto the field model.
    ///
    /// Recognized binding paths update their field entries; everything else
    /// the text carries beyond the compiled structure becomes the implicit
    /// override fragment. Text identical to the coordinator's own last
    /// published payload is treated as an echo and ignored.
    ///
    /// # Errors
    ///
    /// [`TesterError::MalformedPayload`] when the text is not valid JSON.
    /// The field model and last valid payload are untouched and the text is
    /// kept in [`pending_text`](Self::pending_text) for correction.
    #[instrument(skip(self, text))]
    pub fn payload_text_edited(&mut self, text: &str) -> Result<SyncOutcome> {
        if self.state != SyncState::Idle {
            debug!(state = ?self.state, "re-entrant payload edit ignored");
            return Ok(SyncOutcome::Ignored);
        }
        if text == self.raw_text && self.pending_text.is_none() {
            return Ok(SyncOutcome::Ignored);
        }

        self.state = SyncState::ApplyingPayloadEdit;
        let result = self.apply_payload_edit(text);
        self.state = SyncState::Idle;
        result
    }

    fn apply_payload_edit(&mut self, text: &str) -> Result<SyncOutcome> {
        let parsed: Value = match serde_json::from_str(text) {
            Ok(value) => value,
            Err(e) => {
                warn!("raw payload edit is not valid JSON");
                self.pending_text = Some(text.to_owned());
                return Err(TesterError::MalformedPayload(e));
            }
        };

        // Reverse-map recognized paths into the field model. Values that do
        // not fit the field's declared type stay in the raw body and fall
        // through to the override fragment below.
        for binding in bindings(self.scenario, self.options.method) {
            let Some(value) = crate::payload::compile::get_path(&parsed, binding.path) else {
                continue;
            };
            let spec_kind = self
                .model
                .get(binding.field)
                .map(FieldValue::kind);
            let Some(kind) = spec_kind else { continue };
            if let Ok(typed) = FieldValue::from_json(binding.field, kind, value) {
                let _ = self.model.set(binding.field, typed);
            }
        }

        let compiled = compile(&self.model, self.scenario, &self.options)?;
        self.override_fragment = override_diff(&parsed, compiled.as_value());
        self.effective = EffectivePayload::from_value(parsed);
        self.raw_text = text.to_owned();
        self.pending_text = None;
        info!("raw payload edit applied to field model");
        Ok(SyncOutcome::Applied)
    }

    /// Switches scenario and republishes.
    ///
    /// The field model is kept when the new scenario shares the current
    /// category (unauthenticated ⇄ authenticated) and reset otherwise; the
    /// active override fragment follows the same rule.
    ///
    /// # Errors
    ///
    /// Compile errors from the options, as in [`SyncCoordinator::new`].
    pub fn set_scenario(&mut self, scenario: Scenario) -> Result<SyncOutcome> {
        if scenario == self.scenario {
            return Ok(SyncOutcome::Ignored);
        }
        if scenario.category() != self.scenario.category() {
            self.model = FieldModel::reset(scenario.category());
            self.override_fragment = None;
        }
        self.scenario = scenario;
        self.republish()?;
        Ok(SyncOutcome::Applied)
    }

    /// Replaces the compiler options (integration key, toggles, method) and
    /// republishes.
    ///
    /// # Errors
    ///
    /// Compile errors from the new options; the previous options and
    /// payload stay in effect on failure.
    pub fn set_options(&mut self, options: CompileOptions) -> Result<SyncOutcome> {
        let previous = std::mem::replace(&mut self.options, options);
        if let Err(e) = self.republish() {
            self.options = previous;
            return Err(e);
        }
        Ok(SyncOutcome::Applied)
    }

    /// Replaces the active override fragment (e.g. after loading a saved
    /// profile) and republishes.
    ///
    /// # Errors
    ///
    /// Compile errors from the options, as in [`SyncCoordinator::new`].
    pub fn set_override(&mut self, fragment: Option<Value>) -> Result<SyncOutcome> {
        self.override_fragment = fragment;
        self.republish()?;
        Ok(SyncOutcome::Applied)
    }

    /// Builds a profile record from the current state for an explicit save.
    ///
    /// Nothing is persisted here; the store decides when this snapshot hits
    /// disk.
    #[must_use]
    pub fn to_profile(&self, identity: ProfileIdentity, type_code: impl Into<String>) -> Profile {
        let mut profile = Profile::new(identity, type_code, self.model.clone());
        if let Some(fragment) = &self.override_fragment {
            profile.overrides.insert(self.scenario, fragment.clone());
        }
        profile
    }

    /// Current state; [`SyncState::Idle`] between calls.
    #[must_use]
    pub const fn state(&self) -> SyncState {
        self.state
    }

    /// Active scenario.
    #[must_use]
    pub const fn scenario(&self) -> Scenario {
        self.scenario
    }

    /// The typed field model.
    #[must_use]
    pub const fn field_model(&self) -> &FieldModel {
        &self.model
    }

    /// The unmasked payload that would be transmitted.
    #[must_use]
    pub const fn effective_payload(&self) -> &EffectivePayload {
        &self.effective
    }

    /// The last published (or accepted) raw payload text.
    #[must_use]
    pub fn raw_payload_text(&self) -> &str {
        &self.raw_text
    }

    /// The user's last unparsable text, kept for correction.
    #[must_use]
    pub fn pending_text(&self) -> Option<&str> {
        self.pending_text.as_deref()
    }

    /// The active override fragment, if any.
    #[must_use]
    pub fn override_fragment(&self) -> Option<&Value> {
        self.override_fragment.as_ref()
    }

    /// Derives a fresh masked view of the effective payload.
    ///
    /// Recomputed on every call; never cached, never persisted.
    #[must_use]
    pub fn masked_view(&self) -> MaskedView<'_> {
        mask(&self.effective)
    }
}
