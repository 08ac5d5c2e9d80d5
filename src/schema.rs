//! Schema definition: one rule set, two products.
//!
//! A [`FormSchema`] is an ordered list of [`FieldSpec`]s. From that single
//! list it produces
//!
//! 1. a validator ([`FormSchema::validate`]) that turns raw input text into
//!    typed values or a per-field error mapping, and
//! 2. a structural description ([`FormSchema::to_json_schema`]), a draft-07
//!    JSON Schema that is uploaded alongside each document so the extraction
//!    service knows which fields to return.
//!
//! Both walk the same `FieldSpec`s, so the client-side rules and the
//! published schema cannot drift apart.
//!
//! Constraint violations are data. Nothing here panics or returns an error
//! type for bad input.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Number, Value};
use std::collections::BTreeMap;

/// Field name → human-readable message, one entry per failing field.
pub type FieldErrors = BTreeMap<String, String>;

/// Field name → coerced value (string or number), one entry per field.
pub type ValidatedValues = Map<String, Value>;

/// Message for a numeric field whose input is not a finite number.
pub const NOT_A_NUMBER_MESSAGE: &str = "Expected number, received nan";

const JSON_SCHEMA_DIALECT: &str = "http://json-schema.org/draft-07/schema#";

// Shape only. The leading-dot and double-dot restrictions are checked in
// `is_valid_email` because the regex crate has no look-around.
static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^[A-Z0-9_'+\-.]*[A-Z0-9_+\-]@([A-Z0-9][A-Z0-9\-]*\.)+[A-Z]{2,}$").unwrap()
});

/// Returns `true` for addresses of the form `local@domain.tld`.
pub fn is_valid_email(s: &str) -> bool {
    !s.starts_with('.') && !s.contains("..") && EMAIL_RE.is_match(s)
}

/// Input kind, which decides whether raw text is coerced to a number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Text,
    Number,
}

impl FieldKind {
    /// Check the JSON type of a value arriving from outside the input widgets.
    ///
    /// Text takes strings only. Number takes numbers, and strings, which are
    /// then parsed like typed input.
    pub fn accepts_json(self, value: &Value) -> Result<(), String> {
        let expected = match (self, value) {
            (FieldKind::Text, Value::String(_)) => return Ok(()),
            (FieldKind::Number, Value::Number(_) | Value::String(_)) => return Ok(()),
            (FieldKind::Text, _) => "string",
            (FieldKind::Number, _) => "number",
        };
        Err(format!(
            "Expected {expected}, received {}",
            json_type_name(value)
        ))
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// The constraint attached to a field, with its failure message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "camelCase")]
pub enum FieldRule {
    /// Text of at least one character.
    Required { message: String },
    /// Text shaped like `local@domain.tld`.
    Email { message: String },
    /// A finite number greater than or equal to `min`.
    Minimum { min: f64, message: String },
}

/// One named, labelled, constrained field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSpec {
    pub name: String,
    pub label: String,
    pub rule: FieldRule,
}

impl FieldSpec {
    pub fn required(
        name: impl Into<String>,
        label: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            rule: FieldRule::Required {
                message: message.into(),
            },
        }
    }

    pub fn email(
        name: impl Into<String>,
        label: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            rule: FieldRule::Email {
                message: message.into(),
            },
        }
    }

    pub fn minimum(
        name: impl Into<String>,
        label: impl Into<String>,
        min: f64,
        message: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            rule: FieldRule::Minimum {
                min,
                message: message.into(),
            },
        }
    }

    pub fn kind(&self) -> FieldKind {
        match self.rule {
            FieldRule::Minimum { .. } => FieldKind::Number,
            FieldRule::Required { .. } | FieldRule::Email { .. } => FieldKind::Text,
        }
    }

    /// Coerce and check one raw input value.
    pub fn check(&self, raw: &str) -> Result<Value, String> {
        match &self.rule {
            FieldRule::Required { message } => {
                if raw.is_empty() {
                    Err(message.clone())
                } else {
                    Ok(Value::String(raw.to_string()))
                }
            }
            FieldRule::Email { message } => {
                if is_valid_email(raw) {
                    Ok(Value::String(raw.to_string()))
                } else {
                    Err(message.clone())
                }
            }
            FieldRule::Minimum { min, message } => {
                let n = coerce_number(raw).ok_or_else(|| NOT_A_NUMBER_MESSAGE.to_string())?;
                if n < *min {
                    return Err(message.clone());
                }
                Number::from_f64(n)
                    .map(Value::Number)
                    .ok_or_else(|| NOT_A_NUMBER_MESSAGE.to_string())
            }
        }
    }

    fn json_schema(&self) -> Value {
        match &self.rule {
            FieldRule::Required { .. } => json!({ "type": "string", "minLength": 1 }),
            FieldRule::Email { .. } => json!({ "type": "string", "format": "email" }),
            FieldRule::Minimum { min, .. } => json!({ "type": "number", "minimum": min }),
        }
    }
}

/// Parse number-input text the way a numeric input element does: empty or
/// unparsable text is "not a number".
fn coerce_number(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// An ordered, named set of field rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormSchema {
    name: String,
    fields: Vec<FieldSpec>,
}

impl FormSchema {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    /// Append a field. A later spec with the same name replaces the earlier one
    /// in place.
    pub fn field(mut self, spec: FieldSpec) -> Self {
        match self.fields.iter_mut().find(|f| f.name == spec.name) {
            Some(existing) => *existing = spec,
            None => self.fields.push(spec),
        }
        self
    }

    /// The personal/financial form: names, contact details, income, expenses.
    pub fn financial_profile() -> Self {
        Self::new(crate::config::DEFAULT_SCHEMA_NAME)
            .field(FieldSpec::required(
                "firstName",
                "First Name",
                "First name is required",
            ))
            .field(FieldSpec::required(
                "lastName",
                "Last Name",
                "Last name is required",
            ))
            .field(FieldSpec::email("email", "Email", "Invalid email address"))
            .field(FieldSpec::required(
                "phone",
                "Phone",
                "Phone number is required",
            ))
            .field(FieldSpec::minimum(
                "income",
                "Annual Income",
                0.0,
                "Income must be a positive number",
            ))
            .field(FieldSpec::minimum(
                "expenses",
                "Monthly Expenses",
                0.0,
                "Expenses must be a positive number",
            ))
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    pub fn get(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Check a single field. Unknown names are reported as an error message.
    pub fn validate_field(&self, name: &str, raw: &str) -> Result<Value, String> {
        match self.get(name) {
            Some(spec) => spec.check(raw),
            None => Err(format!("Unknown field '{name}'")),
        }
    }

    /// Check every field and report every failure.
    ///
    /// A field missing from `values` is checked as empty input.
    pub fn validate(&self, values: &BTreeMap<String, String>) -> Result<ValidatedValues, FieldErrors> {
        let mut validated = ValidatedValues::new();
        let mut errors = FieldErrors::new();

        for spec in &self.fields {
            let raw = values.get(&spec.name).map(String::as_str).unwrap_or("");
            match spec.check(raw) {
                Ok(value) => {
                    validated.insert(spec.name.clone(), value);
                }
                Err(message) => {
                    errors.insert(spec.name.clone(), message);
                }
            }
        }

        if errors.is_empty() {
            Ok(validated)
        } else {
            Err(errors)
        }
    }

    /// The structural schema sent to the extraction service.
    pub fn to_json_schema(&self) -> Value {
        let properties: Map<String, Value> = self
            .fields
            .iter()
            .map(|f| (f.name.clone(), f.json_schema()))
            .collect();
        let required: Vec<Value> = self
            .fields
            .iter()
            .map(|f| Value::String(f.name.clone()))
            .collect();

        let mut definitions = Map::new();
        definitions.insert(
            self.name.clone(),
            json!({
                "type": "object",
                "properties": properties,
                "required": required,
                "additionalProperties": false,
            }),
        );

        json!({
            "$ref": format!("#/definitions/{}", self.name),
            "definitions": definitions,
            "$schema": JSON_SCHEMA_DIALECT,
        })
    }
}

impl Default for FormSchema {
    fn default() -> Self {
        Self::financial_profile()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_values() -> BTreeMap<String, String> {
        [
            ("firstName", "Jane"),
            ("lastName", "Doe"),
            ("email", "jane@example.com"),
            ("phone", "555-0100"),
            ("income", "50000"),
            ("expenses", "2000"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
    }

    #[test]
    fn valid_record_passes() {
        let schema = FormSchema::financial_profile();
        let values = schema.validate(&valid_values()).unwrap();
        assert_eq!(values["firstName"], "Jane");
        assert_eq!(values["income"].as_f64(), Some(50000.0));
        assert_eq!(values.len(), 6);
    }

    #[test]
    fn empty_required_fields_each_get_one_message() {
        let schema = FormSchema::financial_profile();
        for name in ["firstName", "lastName", "phone"] {
            let mut values = valid_values();
            values.insert(name.to_string(), String::new());
            let errors = schema.validate(&values).unwrap_err();
            assert_eq!(errors.len(), 1, "field {name}: {errors:?}");
            assert!(errors[name].contains("required"));
        }
    }

    #[test]
    fn all_failures_reported_together() {
        let schema = FormSchema::financial_profile();
        let errors = schema.validate(&BTreeMap::new()).unwrap_err();
        assert_eq!(errors.len(), 6);
        assert_eq!(errors["firstName"], "First name is required");
        assert_eq!(errors["email"], "Invalid email address");
        assert_eq!(errors["income"], NOT_A_NUMBER_MESSAGE);
    }

    #[test]
    fn email_shapes() {
        for ok in ["a@b.co", "jane@example.com", "j.o'neil+tag@mail.example.org"] {
            assert!(is_valid_email(ok), "{ok} should be valid");
        }
        for bad in [
            "",
            "plain",
            "@example.com",
            "jane@",
            "jane@example",
            "jane@example.c",
            ".jane@example.com",
            "ja..ne@example.com",
            "jane.@example.com",
            "jane@-example.com",
            "jane doe@example.com",
        ] {
            assert!(!is_valid_email(bad), "{bad} should be invalid");
        }
    }

    #[test]
    fn numeric_rules() {
        let schema = FormSchema::financial_profile();
        assert_eq!(
            schema.validate_field("income", "-1"),
            Err("Income must be a positive number".to_string())
        );
        assert_eq!(schema.validate_field("income", "0").unwrap().as_f64(), Some(0.0));
        assert_eq!(schema.validate_field("expenses", " 12.5 ").unwrap().as_f64(), Some(12.5));
        for bad in ["", "abc", "12abc", "NaN", "inf"] {
            assert_eq!(
                schema.validate_field("expenses", bad),
                Err(NOT_A_NUMBER_MESSAGE.to_string()),
                "input {bad:?}"
            );
        }
    }

    #[test]
    fn unknown_field_is_a_message() {
        let schema = FormSchema::financial_profile();
        assert!(schema.validate_field("ssn", "123").unwrap_err().contains("ssn"));
    }

    #[test]
    fn json_schema_mirrors_rules() {
        let schema = FormSchema::financial_profile();
        let js = schema.to_json_schema();

        assert_eq!(js["$ref"], "#/definitions/FormSchema");
        assert_eq!(js["$schema"], JSON_SCHEMA_DIALECT);

        let def = &js["definitions"]["FormSchema"];
        assert_eq!(def["type"], "object");
        assert_eq!(def["additionalProperties"], false);
        assert_eq!(def["properties"]["firstName"]["minLength"], 1);
        assert_eq!(def["properties"]["email"]["format"], "email");
        assert_eq!(def["properties"]["income"]["type"], "number");
        assert_eq!(def["properties"]["expenses"]["minimum"].as_f64(), Some(0.0));

        let required: Vec<&str> = def["required"]
            .as_array()
            .unwrap()
            .iter()
            .filter_map(Value::as_str)
            .collect();
        let names: Vec<&str> = schema.fields().iter().map(|f| f.name.as_str()).collect();
        assert_eq!(required, names);
    }

    #[test]
    fn renamed_schema_moves_definition() {
        let js = FormSchema::financial_profile()
            .with_name("Applicant")
            .to_json_schema();
        assert_eq!(js["$ref"], "#/definitions/Applicant");
        assert!(js["definitions"].get("Applicant").is_some());
    }

    #[test]
    fn field_replaces_same_name() {
        let schema = FormSchema::new("S")
            .field(FieldSpec::required("a", "A", "one"))
            .field(FieldSpec::minimum("a", "A", 1.0, "two"));
        assert_eq!(schema.fields().len(), 1);
        assert_eq!(schema.fields()[0].kind(), FieldKind::Number);
    }

    #[test]
    fn json_type_check_per_kind() {
        assert!(FieldKind::Text.accepts_json(&json!("Jane")).is_ok());
        assert_eq!(
            FieldKind::Text.accepts_json(&json!({ "given": "Jane" })),
            Err("Expected string, received object".to_string())
        );
        assert_eq!(
            FieldKind::Text.accepts_json(&json!(true)),
            Err("Expected string, received boolean".to_string())
        );
        assert_eq!(
            FieldKind::Text.accepts_json(&json!(5550100)),
            Err("Expected string, received number".to_string())
        );

        assert!(FieldKind::Number.accepts_json(&json!(50000)).is_ok());
        assert!(FieldKind::Number.accepts_json(&json!("50000")).is_ok());
        assert_eq!(
            FieldKind::Number.accepts_json(&json!([1, 2])),
            Err("Expected number, received array".to_string())
        );
    }
}
