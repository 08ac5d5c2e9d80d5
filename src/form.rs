//! Form state controller.
//!
//! [`FormController`] is what a view binds to. It keeps the raw input text of
//! every schema field, the current error mapping, and the submit state. Input
//! arrives from two places: user keystrokes ([`FormController::on_change`])
//! and the upload path's programmatic setter
//! ([`FormController::set_json_value`]). Both write the same values, and both
//! are checked again on the next [`FormController::handle_submit`].
//!
//! ```text
//!            handle_submit
//!   Clean ──────────────▶ Validating ──┬──▶ Submitted
//!     ▲                                └──▶ Invalid
//!     └──────────── reset ─────────────────────┘
//! ```

use crate::error::FormFillError;
use crate::record::from_validated;
use crate::schema::{FieldErrors, FieldKind, FormSchema, ValidatedValues};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::{debug, info};

/// Where the form is in its submit cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum SubmitState {
    /// Nothing submitted since creation or the last reset.
    #[default]
    Clean,
    /// Validation is running.
    Validating,
    /// The last submit passed and the handler ran.
    Submitted,
    /// The last submit failed; see [`FormController::errors`].
    Invalid,
}

/// Result of one [`FormController::handle_submit`] call.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// Every field passed and the handler was called once.
    Submitted,
    /// At least one field failed; the handler was not called.
    Invalid(FieldErrors),
}

/// A view of one bound field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldBinding<'a> {
    pub name: &'a str,
    pub label: &'a str,
    pub kind: FieldKind,
    pub value: &'a str,
    pub error: Option<&'a str>,
}

/// Field values, errors, and submit state for one form instance.
#[derive(Debug, Clone)]
pub struct FormController {
    schema: FormSchema,
    values: BTreeMap<String, String>,
    // Wrong-typed JSON values, reported on the next submit.
    type_errors: FieldErrors,
    errors: FieldErrors,
    state: SubmitState,
    submit_count: usize,
}

impl FormController {
    /// A form with every schema field bound to empty input.
    pub fn new(schema: FormSchema) -> Self {
        let values = empty_values(&schema);
        Self {
            schema,
            values,
            type_errors: FieldErrors::new(),
            errors: FieldErrors::new(),
            state: SubmitState::Clean,
            submit_count: 0,
        }
    }

    pub fn schema(&self) -> &FormSchema {
        &self.schema
    }

    pub fn state(&self) -> SubmitState {
        self.state
    }

    /// Number of submit attempts since creation or the last reset.
    pub fn submit_count(&self) -> usize {
        self.submit_count
    }

    pub fn values(&self) -> &BTreeMap<String, String> {
        &self.values
    }

    pub fn value(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn error(&self, name: &str) -> Option<&str> {
        self.errors.get(name).map(String::as_str)
    }

    pub fn binding(&self, name: &str) -> Option<FieldBinding<'_>> {
        let spec = self.schema.get(name)?;
        Some(FieldBinding {
            name: &spec.name,
            label: &spec.label,
            kind: spec.kind(),
            value: self.value(name).unwrap_or(""),
            error: self.error(name),
        })
    }

    /// Bindings for every field, in schema order.
    pub fn bindings(&self) -> Vec<FieldBinding<'_>> {
        self.schema
            .fields()
            .iter()
            .filter_map(|f| self.binding(&f.name))
            .collect()
    }

    /// Apply a user keystroke.
    ///
    /// Once the form has been submitted at least once, the changed field is
    /// re-checked immediately so its error appears or clears as the user
    /// types. Returns `false` for names outside the schema.
    pub fn on_change(&mut self, name: &str, raw: impl Into<String>) -> bool {
        if !self.set_value(name, raw) {
            return false;
        }
        if self.submit_count > 0 {
            let raw = self.value(name).unwrap_or("");
            match self.schema.validate_field(name, raw) {
                Ok(_) => {
                    self.errors.remove(name);
                }
                Err(message) => {
                    self.errors.insert(name.to_string(), message);
                }
            }
        }
        true
    }

    /// Overwrite a field without validating it.
    ///
    /// Returns `false` for names outside the schema.
    pub fn set_value(&mut self, name: &str, raw: impl Into<String>) -> bool {
        match self.values.get_mut(name) {
            Some(slot) => {
                *slot = raw.into();
                self.type_errors.remove(name);
                true
            }
            None => false,
        }
    }

    /// Overwrite a field from a JSON value, as returned by the extraction
    /// service.
    ///
    /// Strings are used verbatim, anything else as its JSON text. A value
    /// whose JSON type the field does not take (see
    /// [`FieldKind::accepts_json`]) is kept for display and fails the next
    /// submit with `Expected <type>, received <type>` until the field is
    /// edited. `null` leaves the field untouched and returns `false`; so does
    /// an unknown name.
    pub fn set_json_value(&mut self, name: &str, value: &Value) -> bool {
        let Some(kind) = self.schema.get(name).map(|f| f.kind()) else {
            return false;
        };
        let raw = match value {
            Value::Null => return false,
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        self.set_value(name, raw);
        if let Err(message) = kind.accepts_json(value) {
            debug!("'{}' holds a wrong-typed value: {}", name, message);
            self.type_errors.insert(name.to_string(), message);
        }
        true
    }

    /// Validate every field and, if all pass, hand the typed record to
    /// `on_valid` exactly once.
    ///
    /// Failing fields are all reported together. A record type that does not
    /// match the schema is the only `Err`.
    pub fn handle_submit<T, F>(&mut self, on_valid: F) -> Result<SubmitOutcome, FormFillError>
    where
        T: DeserializeOwned,
        F: FnOnce(T),
    {
        self.state = SubmitState::Validating;
        self.submit_count += 1;

        let validated = match self.check_all() {
            Ok(v) => v,
            Err(errors) => {
                info!(
                    "Submission rejected: {} invalid field(s): {}",
                    errors.len(),
                    errors.keys().cloned().collect::<Vec<_>>().join(", ")
                );
                self.errors = errors.clone();
                self.state = SubmitState::Invalid;
                return Ok(SubmitOutcome::Invalid(errors));
            }
        };

        let submitted = Value::Object(validated.clone());
        info!("Form submitted: {}", submitted);
        debug!("Structural schema: {}", self.schema.to_json_schema());

        let record = match from_validated::<T>(validated) {
            Ok(r) => r,
            Err(e) => {
                self.state = SubmitState::Invalid;
                return Err(e);
            }
        };

        self.errors.clear();
        on_valid(record);
        self.state = SubmitState::Submitted;
        Ok(SubmitOutcome::Submitted)
    }

    /// Back to empty input, no errors, `Clean`.
    pub fn reset(&mut self) {
        self.values = empty_values(&self.schema);
        self.type_errors.clear();
        self.errors.clear();
        self.state = SubmitState::Clean;
        self.submit_count = 0;
    }

    /// Schema rules over the raw text, with type mismatches taking the place
    /// of whatever the text check said for the same field.
    fn check_all(&self) -> Result<ValidatedValues, FieldErrors> {
        let checked = self.schema.validate(&self.values);
        if self.type_errors.is_empty() {
            return checked;
        }
        let mut errors = checked.err().unwrap_or_default();
        errors.extend(self.type_errors.clone());
        Err(errors)
    }
}

impl Default for FormController {
    fn default() -> Self {
        Self::new(FormSchema::financial_profile())
    }
}

fn empty_values(schema: &FormSchema) -> BTreeMap<String, String> {
    schema
        .fields()
        .iter()
        .map(|f| (f.name.clone(), String::new()))
        .collect()
}
