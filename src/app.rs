//! The assembled form application: one form, one upload panel, one explainer.
//!
//! The structural schema is generated once from the form's [`FormSchema`] and
//! handed to the upload panel, so the fields the service is asked for are
//! exactly the fields the form validates.

use crate::config::FormFillConfig;
use crate::error::FormFillError;
use crate::explainer::ExplainerPanel;
use crate::form::FormController;
use crate::schema::FormSchema;
use crate::upload::{UploadPanel, UploadState};
use serde_json::Value;

/// Everything a form page owns.
#[derive(Debug)]
pub struct FormApp {
    pub form: FormController,
    pub upload: UploadPanel,
    pub explainer: ExplainerPanel,
    schema_json: Value,
}

impl FormApp {
    /// The financial-profile form, named after `config.schema_name`.
    pub fn new(config: &FormFillConfig) -> Result<Self, FormFillError> {
        let schema = FormSchema::financial_profile().with_name(config.schema_name.clone());
        Self::with_schema(config, schema)
    }

    pub fn with_schema(config: &FormFillConfig, schema: FormSchema) -> Result<Self, FormFillError> {
        let schema_json = schema.to_json_schema();
        Ok(Self {
            upload: UploadPanel::new(config, schema_json.clone())?,
            form: FormController::new(schema),
            explainer: ExplainerPanel::new(),
            schema_json,
        })
    }

    /// The structural schema sent with each upload.
    pub fn structural_schema(&self) -> &Value {
        &self.schema_json
    }

    /// Upload the selected file and populate the form from the reply.
    pub async fn upload_selected(&mut self) -> UploadState {
        self.upload.submit_upload(&mut self.form).await
    }
}
