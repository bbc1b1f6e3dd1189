use super::*;

const CATALOG: &str = r##"[
  {
    "id": "quote-card",
    "name": "Quote Card",
    "description": "A quote with attribution",
    "category": "quote",
    "aspectRatio": "1:1",
    "variables": [
      { "name": "quote", "type": "text", "label": "Quote", "default": "Stay humble.", "maxLength": 12 },
      { "name": "author", "type": "text", "label": "Author" },
      { "name": "accent", "type": "color", "label": "Accent", "default": "#00D395" }
    ]
  },
  {
    "id": "announcement-banner",
    "name": "Announcement Banner",
    "description": "Wide banner",
    "category": "announcement",
    "aspectRatio": "16:9",
    "variables": []
  }
]"##;

#[test]
fn parses_catalog_json() {
    let catalog = TemplateCatalog::from_json_str(CATALOG).unwrap();
    assert_eq!(catalog.len(), 2);

    let quote = catalog.get("quote-card").unwrap();
    assert_eq!(quote.aspect_ratio, AspectRatio::Square);
    assert_eq!(quote.category, TemplateCategory::Quote);
    assert_eq!(quote.variables[0].kind, VariableKind::Text);
    assert_eq!(quote.variables[0].max_length, Some(12));
    assert_eq!(quote.variables[2].kind, VariableKind::Color);

    let banner = catalog.get("announcement-banner").unwrap();
    assert_eq!(banner.canvas(), Canvas { width: 1200, height: 675 });
}

#[test]
fn unknown_template_is_not_found() {
    let catalog = TemplateCatalog::from_json_str(CATALOG).unwrap();
    let err = catalog.get("nope").unwrap_err();
    assert!(matches!(err, EditorError::TemplateNotFound(ref id) if id == "nope"));
    assert_eq!(err.status_code(), 404);
}

#[test]
fn duplicate_ids_are_rejected() {
    let json = r#"[
      {"id":"a","name":"A","description":"","category":"social","aspectRatio":"1:1"},
      {"id":"a","name":"B","description":"","category":"banner","aspectRatio":"4:5"}
    ]"#;
    assert!(TemplateCatalog::from_json_str(json).is_err());
}

#[test]
fn unfamiliar_category_maps_to_other() {
    let json = r#"[
      {"id":"promo","name":"Promo","description":"","category":"promotional","aspectRatio":"16:9"},
      {"id":"card","name":"Card","description":"","category":"quote","aspectRatio":"1:1"}
    ]"#;
    let catalog = TemplateCatalog::from_json_str(json).unwrap();
    assert_eq!(catalog.len(), 2);
    assert_eq!(catalog.get("promo").unwrap().category, TemplateCategory::Other);
    assert_eq!(catalog.get("card").unwrap().category, TemplateCategory::Quote);
}

#[test]
fn by_category_filters() {
    let catalog = TemplateCatalog::from_json_str(CATALOG).unwrap();
    let ids: Vec<&str> = catalog
        .by_category(TemplateCategory::Announcement)
        .map(|t| t.id.as_str())
        .collect();
    assert_eq!(ids, vec!["announcement-banner"]);
    assert_eq!(catalog.by_category(TemplateCategory::Wallet).count(), 0);
}

#[test]
fn resolve_variables_merges_defaults() {
    let catalog = TemplateCatalog::from_json_str(CATALOG).unwrap();
    let quote = catalog.get("quote-card").unwrap();

    let defaults = quote.default_variables();
    assert_eq!(defaults.len(), 2);
    assert_eq!(defaults["quote"], "Stay humble.");

    let mut provided = BTreeMap::new();
    provided.insert("author".to_string(), "Satoshi".to_string());
    provided.insert("extra".to_string(), "kept".to_string());
    let resolved = quote.resolve_variables(&provided).unwrap();
    assert_eq!(resolved["quote"], "Stay humble.");
    assert_eq!(resolved["author"], "Satoshi");
    assert_eq!(resolved["accent"], "#00D395");
    assert_eq!(resolved["extra"], "kept");
}

#[test]
fn resolve_variables_enforces_max_length() {
    let catalog = TemplateCatalog::from_json_str(CATALOG).unwrap();
    let quote = catalog.get("quote-card").unwrap();

    let mut provided = BTreeMap::new();
    provided.insert("quote".to_string(), "this is far too long".to_string());
    let err = quote.resolve_variables(&provided).unwrap_err();
    assert!(err.to_string().contains("max 12"));

    provided.insert("quote".to_string(), "ünïcödé ok".to_string());
    assert!(quote.resolve_variables(&provided).is_ok());
}

#[test]
fn from_path_reports_missing_file() {
    let err = TemplateCatalog::from_path("target/does-not-exist/templates.json").unwrap_err();
    assert!(err.to_string().contains("open template catalog"));
}
