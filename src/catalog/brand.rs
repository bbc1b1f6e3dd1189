use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::foundation::error::FieldError;

/// Brand palette. Values are CSS color strings, typically hex.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrandColors {
    pub primary: String,
    pub secondary: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accent: Option<String>,
    pub background: String,
    pub text: String,
}

/// Optional brand font families (CSS family stacks).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrandFonts {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heading: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
}

/// Brand configuration every template renders against.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrandConfig {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tagline: Option<String>,
    /// Logo URL or `data:` URL.
    pub logo: String,
    pub colors: BrandColors,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fonts: Option<BrandFonts>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub twitter: Option<String>,
}

impl BrandConfig {
    /// The brand the editor starts with before the user configures their own.
    pub fn default_brand() -> Self {
        Self {
            name: "ShapeShift".to_string(),
            tagline: Some("Your Keys. Your Crypto.".to_string()),
            logo: "https://assets.coincap.io/assets/icons/fox@2x.png".to_string(),
            colors: BrandColors {
                primary: "#3761F9".to_string(),
                secondary: "#1D4ED8".to_string(),
                accent: Some("#00D395".to_string()),
                background: "#0A0B0D".to_string(),
                text: "#FFFFFF".to_string(),
            },
            fonts: None,
            website: Some("https://shapeshift.com".to_string()),
            twitter: Some("@ShapeShift".to_string()),
        }
    }

    /// Look up a dotted field path (`colors.primary`, `fonts.heading`) as a string.
    ///
    /// Missing optional fields resolve to `None`.
    pub fn field(&self, path: &str) -> Option<String> {
        let v = serde_json::to_value(self).ok()?;
        let mut cur = &v;
        for seg in path.split('.') {
            cur = cur.get(seg)?;
        }
        cur.as_str().map(str::to_string)
    }
}

impl Default for BrandConfig {
    fn default() -> Self {
        Self::default_brand()
    }
}

/// Validate untrusted JSON against the brand schema, collecting every field-level problem.
pub fn validate_brand(value: &Value) -> Result<BrandConfig, Vec<FieldError>> {
    let Some(obj) = value.as_object() else {
        return Err(vec![FieldError::new("(root)", "expected object")]);
    };

    let mut errors = Vec::new();
    required_str(obj, "name", "name", &mut errors);
    optional_str(obj, "tagline", "tagline", &mut errors);
    required_str(obj, "logo", "logo", &mut errors);
    optional_str(obj, "website", "website", &mut errors);
    optional_str(obj, "twitter", "twitter", &mut errors);

    match obj.get("colors") {
        None => errors.push(FieldError::new("colors", "required")),
        Some(Value::Object(colors)) => {
            for key in ["primary", "secondary", "background", "text"] {
                required_str(colors, key, &format!("colors.{key}"), &mut errors);
            }
            optional_str(colors, "accent", "colors.accent", &mut errors);
        }
        Some(_) => errors.push(FieldError::new("colors", "expected object")),
    }

    match obj.get("fonts") {
        None => {}
        Some(Value::Object(fonts)) => {
            optional_str(fonts, "heading", "fonts.heading", &mut errors);
            optional_str(fonts, "body", "fonts.body", &mut errors);
        }
        Some(_) => errors.push(FieldError::new("fonts", "expected object")),
    }

    if !errors.is_empty() {
        return Err(errors);
    }

    serde_json::from_value(value.clone()).map_err(|e| vec![FieldError::new("(root)", e.to_string())])
}

fn required_str(
    obj: &serde_json::Map<String, Value>,
    key: &str,
    path: &str,
    errors: &mut Vec<FieldError>,
) {
    match obj.get(key) {
        None => errors.push(FieldError::new(path, "required")),
        Some(Value::String(_)) => {}
        Some(_) => errors.push(FieldError::new(path, "expected string")),
    }
}

fn optional_str(
    obj: &serde_json::Map<String, Value>,
    key: &str,
    path: &str,
    errors: &mut Vec<FieldError>,
) {
    match obj.get(key) {
        None | Some(Value::String(_)) => {}
        Some(_) => errors.push(FieldError::new(path, "expected string")),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/catalog/brand.rs"]
mod tests;
