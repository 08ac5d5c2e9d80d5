//! Typed records flowing in and out of the form.

use crate::error::FormFillError;
use crate::schema::ValidatedValues;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A fully validated submission of the financial-profile form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormRecord {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    /// Annual income.
    pub income: f64,
    /// Monthly expenses.
    pub expenses: f64,
}

impl TryFrom<ValidatedValues> for FormRecord {
    type Error = FormFillError;

    fn try_from(values: ValidatedValues) -> Result<Self, Self::Error> {
        from_validated(values)
    }
}

/// Deserialize validated values into any record type.
pub fn from_validated<T: serde::de::DeserializeOwned>(
    values: ValidatedValues,
) -> Result<T, FormFillError> {
    serde_json::from_value(Value::Object(values))
        .map_err(|e| FormFillError::SchemaMismatch(e.to_string()))
}

/// Body returned by `POST /upload-pdf`.
///
/// `result` is required: a 2xx reply without it (for example
/// `{"error": "..."}`) is treated as malformed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionResponse {
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    /// Field name → extracted value.
    pub result: Map<String, Value>,
}
