use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::foundation::core::{AspectRatio, Canvas};
use crate::foundation::error::{EditorError, EditorResult};

/// Gallery grouping for a template.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemplateCategory {
    Chain,
    Feature,
    Swap,
    Portfolio,
    Wallet,
    Multichain,
    Thread,
    Stats,
    Community,
    Announcement,
    Quote,
    Social,
    Banner,
    /// Any category this build does not know; kept so one entry cannot fail the catalog.
    #[serde(other)]
    Other,
}

/// Value type a template variable accepts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VariableKind {
    Text,
    Image,
    Color,
}

/// One user-fillable slot declared by a template.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateVariable {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: VariableKind,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
}

/// Template metadata as served by the catalog.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateDefinition {
    pub id: String,
    pub name: String,
    pub description: String,
    pub category: TemplateCategory,
    pub aspect_ratio: AspectRatio,
    #[serde(default)]
    pub variables: Vec<TemplateVariable>,
}

impl TemplateDefinition {
    /// Native pixel size of this template.
    pub fn canvas(&self) -> Canvas {
        self.aspect_ratio.canvas()
    }

    /// Declared defaults, keyed by variable name. Variables without a default are omitted.
    pub fn default_variables(&self) -> BTreeMap<String, String> {
        self.variables
            .iter()
            .filter_map(|v| v.default.clone().map(|d| (v.name.clone(), d)))
            .collect()
    }

    /// Merge caller-provided values over the declared defaults.
    ///
    /// Names the template does not declare are passed through untouched. A value longer than the
    /// variable's `max_length` (counted in chars) is rejected.
    pub fn resolve_variables(
        &self,
        provided: &BTreeMap<String, String>,
    ) -> EditorResult<BTreeMap<String, String>> {
        for var in &self.variables {
            let (Some(max), Some(value)) = (var.max_length, provided.get(&var.name)) else {
                continue;
            };
            let len = value.chars().count();
            if len > max {
                return Err(EditorError::validation(format!(
                    "variable '{}' is {len} characters, max {max}",
                    var.name
                )));
            }
        }

        let mut out = self.default_variables();
        for (k, v) in provided {
            out.insert(k.clone(), v.clone());
        }
        Ok(out)
    }
}

/// In-memory template catalog loaded from the JSON list the API serves.
#[derive(Clone, Debug, Default)]
pub struct TemplateCatalog {
    templates: Vec<TemplateDefinition>,
}

impl TemplateCatalog {
    /// Build a catalog, rejecting duplicate ids.
    pub fn new(templates: Vec<TemplateDefinition>) -> EditorResult<Self> {
        let mut seen = std::collections::HashSet::new();
        for t in &templates {
            if t.id.trim().is_empty() {
                return Err(EditorError::validation("template id must be non-empty"));
            }
            if !seen.insert(t.id.as_str()) {
                return Err(EditorError::validation(format!(
                    "duplicate template id '{}'",
                    t.id
                )));
            }
        }
        Ok(Self { templates })
    }

    /// Parse a JSON array of template definitions.
    pub fn from_json_str(json: &str) -> EditorResult<Self> {
        let templates: Vec<TemplateDefinition> = serde_json::from_str(json)
            .map_err(|e| EditorError::validation(format!("parse template catalog JSON: {e}")))?;
        Self::new(templates)
    }

    /// Parse a template catalog JSON file on disk.
    #[tracing::instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn from_path(path: impl AsRef<Path>) -> EditorResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            EditorError::validation(format!("open template catalog '{}': {e}", path.display()))
        })?;
        let templates: Vec<TemplateDefinition> = serde_json::from_reader(BufReader::new(f))
            .map_err(|e| EditorError::validation(format!("parse template catalog JSON: {e}")))?;
        let catalog = Self::new(templates)?;
        tracing::debug!(templates = catalog.len(), "template catalog loaded");
        Ok(catalog)
    }

    /// All templates in declaration order.
    pub fn list(&self) -> &[TemplateDefinition] {
        &self.templates
    }

    /// Look up one template by id.
    pub fn get(&self, id: &str) -> EditorResult<&TemplateDefinition> {
        self.templates
            .iter()
            .find(|t| t.id == id)
            .ok_or_else(|| EditorError::template_not_found(id))
    }

    /// Templates of a single category, in declaration order.
    pub fn by_category(
        &self,
        category: TemplateCategory,
    ) -> impl Iterator<Item = &TemplateDefinition> + '_ {
        self.templates.iter().filter(move |t| t.category == category)
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/catalog/template.rs"]
mod tests;
