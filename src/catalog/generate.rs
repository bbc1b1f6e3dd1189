use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::catalog::brand::{BrandConfig, validate_brand};
use crate::catalog::template::{TemplateCatalog, TemplateDefinition};
use crate::foundation::error::{EditorError, EditorResult};

/// Body of a generate call. The brand stays raw JSON until validated.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    pub template_id: String,
    pub brand: Value,
    #[serde(default)]
    pub variables: BTreeMap<String, String>,
}

impl GenerateRequest {
    /// Parse a request body.
    pub fn from_json(value: &Value) -> EditorResult<Self> {
        serde_json::from_value(value.clone())
            .map_err(|e| EditorError::validation(format!("parse generate request: {e}")))
    }
}

/// Everything a client needs to render the template itself.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateResponse {
    pub template_id: String,
    pub brand: BrandConfig,
    /// Caller variables merged over the template's defaults.
    pub variables: BTreeMap<String, String>,
    pub template: TemplateDefinition,
}

/// Validate a generate request against the catalog. No rendering happens here.
///
/// Brand schema violations are reported before the template lookup, matching the order the API
/// checks them in.
pub fn generate(catalog: &TemplateCatalog, request: &GenerateRequest) -> EditorResult<GenerateResponse> {
    let brand = validate_brand(&request.brand).map_err(EditorError::BrandInvalid)?;
    let template = catalog.get(&request.template_id)?;
    let variables = template.resolve_variables(&request.variables)?;

    Ok(GenerateResponse {
        template_id: request.template_id.clone(),
        brand,
        variables,
        template: template.clone(),
    })
}
