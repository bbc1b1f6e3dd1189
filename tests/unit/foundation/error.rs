use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        EditorError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(
        EditorError::template_not_found("quote-card-1")
            .to_string()
            .contains("template not found: quote-card-1")
    );
    assert!(EditorError::decode("x").to_string().contains("decode error:"));
    assert!(EditorError::render("x").to_string().contains("render error:"));
}

#[test]
fn brand_errors_list_every_field() {
    let err = EditorError::BrandInvalid(vec![
        FieldError::new("name", "required"),
        FieldError::new("colors.primary", "expected string"),
    ]);
    let msg = err.to_string();
    assert!(msg.contains("name: required"));
    assert!(msg.contains("colors.primary: expected string"));
}

#[test]
fn status_codes_match_boundary_semantics() {
    assert_eq!(EditorError::template_not_found("x").status_code(), 404);
    assert_eq!(EditorError::validation("x").status_code(), 400);
    assert_eq!(EditorError::BrandInvalid(vec![]).status_code(), 400);
    assert_eq!(EditorError::decode("x").status_code(), 500);
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = EditorError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}
