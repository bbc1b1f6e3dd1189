use std::time::Duration;

/// Convenience result type used across brandcanvas.
pub type EditorResult<T> = Result<T, EditorError>;

/// One field-level problem found while validating a brand configuration.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct FieldError {
    /// Dotted path of the offending field, e.g. `colors.primary`.
    pub path: String,
    /// Human readable description.
    pub message: String,
}

impl FieldError {
    /// Build a [`FieldError`] for `path`.
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for FieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

/// Top-level error taxonomy used by editor APIs.
///
/// Scene graph mutations never produce errors; these are reserved for the asynchronous and
/// boundary operations (image decode, template bake, export, catalog and brand input).
#[derive(thiserror::Error, Debug)]
pub enum EditorError {
    /// Invalid user-provided data at an API boundary.
    #[error("validation error: {0}")]
    Validation(String),

    /// Unknown template id passed to a catalog lookup or generate request.
    #[error("template not found: {0}")]
    TemplateNotFound(String),

    /// Brand configuration failed schema validation.
    #[error("brand validation failed: {}", join_field_errors(.0))]
    BrandInvalid(Vec<FieldError>),

    /// Image, SVG or font bytes could not be decoded.
    #[error("decode error: {0}")]
    Decode(String),

    /// Template renderer or compositor failure.
    #[error("render error: {0}")]
    Render(String),

    /// A bake did not produce a capture within its time budget.
    #[error("timed out after {0:?}")]
    Timeout(Duration),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl EditorError {
    /// Build a [`EditorError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`EditorError::TemplateNotFound`] value.
    pub fn template_not_found(id: impl Into<String>) -> Self {
        Self::TemplateNotFound(id.into())
    }

    /// Build a [`EditorError::Decode`] value.
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Build a [`EditorError::Render`] value.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// HTTP-equivalent status for the boundary this error would surface at.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::TemplateNotFound(_) => 404,
            Self::Validation(_) | Self::BrandInvalid(_) => 400,
            _ => 500,
        }
    }
}

fn join_field_errors(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
