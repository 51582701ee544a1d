//! Localized sibling fields: one `<field>_<code>` per configured language.

use crate::i18n::LanguageRegistry;
use crate::localization::attributes::extract;
use crate::localization::LocalizedAccessor;
use crate::schema::ModelClass;
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

/// Add `<field>_<code>` siblings of `field_name` for every configured
/// language, plus the accessors that route through them.
///
/// Siblings that already exist are left alone, so calling this again is
/// harmless. A missing source field is skipped.
///
/// # Returns
/// The number of sibling fields added.
pub fn localize_field(
    model: &mut ModelClass,
    field_name: &str,
    languages: &Arc<LanguageRegistry>,
) -> usize {
    let Some(field) = model.field(field_name) else {
        debug!(model = %model.name(), field = field_name, "No such field, skipping localization");
        return 0;
    };

    let kind = field.kind;
    let creation_counter = field.creation_counter;
    let mut attrs = extract(field);
    attrs.editable = Some(false);

    // Keeps the new column from breaking not-null construction until populated
    if !attrs.is_nullable() && attrs.default.is_none() {
        attrs.default = Some(Value::String(String::new()));
    }

    let mut added = 0;
    for code in languages.codes() {
        let localized_name = format!("{}_{}", field_name, code);
        if model.has_field(&localized_name) {
            continue;
        }

        let mut localized = attrs.build(localized_name.clone(), kind);
        localized.creation_counter = creation_counter;
        model.add_field(localized);
        model.install_accessor(
            localized_name,
            LocalizedAccessor::for_language(field_name, code, Arc::clone(languages)),
        );
        added += 1;
    }

    model.install_accessor(field_name, LocalizedAccessor::main(field_name, Arc::clone(languages)));

    if added > 0 {
        debug!(model = %model.name(), field = field_name, added, "Localized field");
    }
    added
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{FieldDefinition, FieldKind, ModelDef, ModelRegistry};
    use proptest::prelude::*;
    use serde_json::json;

    fn languages() -> Arc<LanguageRegistry> {
        Arc::new(LanguageRegistry::new(&[("en", "English"), ("fr", "Français")], "en").unwrap())
    }

    fn article(registry: &mut ModelRegistry) -> ModelClass {
        let id = registry
            .register(
                ModelDef::new("blog", "Article")
                    .field(FieldDefinition::char("title", 64).label("Title"))
                    .field(FieldDefinition::text("body").null(true))
                    .field(FieldDefinition::new("slug", FieldKind::Slug)),
            )
            .unwrap();
        registry.model(id).clone()
    }

    // ==================== Sibling Field Tests ====================

    #[test]
    fn test_localize_adds_sibling_per_language() {
        let mut model = article(&mut ModelRegistry::new());
        let added = localize_field(&mut model, "title", &languages());

        assert_eq!(added, 2);
        assert_eq!(
            model.field_names(),
            vec!["title", "title_en", "title_fr", "body", "slug"]
        );
        for name in ["title_en", "title_fr"] {
            let field = model.field(name).unwrap();
            assert!(!field.editable);
            assert_eq!(field.kind, FieldKind::Char);
            assert_eq!(field.max_length, Some(64));
            assert_eq!(field.label.as_deref(), Some("Title"));
            assert_eq!(field.default, Some(json!("")));
        }
    }

    #[test]
    fn test_nullable_field_gets_no_default() {
        let mut model = article(&mut ModelRegistry::new());
        localize_field(&mut model, "body", &languages());

        let field = model.field("body_fr").unwrap();
        assert_eq!(field.null, Some(true));
        assert_eq!(field.default, None);
        assert_eq!(field.kind, FieldKind::Text);
    }

    #[test]
    fn test_explicit_default_is_kept() {
        let mut registry = ModelRegistry::new();
        let id = registry
            .register(
                ModelDef::new("blog", "Post")
                    .field(FieldDefinition::char("status", 10).default_value("draft")),
            )
            .unwrap();
        let mut model = registry.model(id).clone();
        localize_field(&mut model, "status", &languages());

        assert_eq!(model.field("status_en").unwrap().default, Some(json!("draft")));
    }

    #[test]
    fn test_unset_max_length_uses_kind_default() {
        let mut model = article(&mut ModelRegistry::new());
        localize_field(&mut model, "slug", &languages());

        let field = model.field("slug_en").unwrap();
        assert_eq!(field.max_length, None);
        assert_eq!(field.db_type(), "varchar(50)");
    }

    #[test]
    fn test_missing_field_is_skipped() {
        let mut model = article(&mut ModelRegistry::new());
        let before = model.field_names().len();

        assert_eq!(localize_field(&mut model, "subtitle", &languages()), 0);
        assert_eq!(model.field_names().len(), before);
        assert!(model.accessor("subtitle").is_none());
    }

    // ==================== Accessor Installation Tests ====================

    #[test]
    fn test_accessors_installed() {
        let mut model = article(&mut ModelRegistry::new());
        localize_field(&mut model, "title", &languages());

        assert!(model.accessor("title").unwrap().is_main());
        assert_eq!(model.accessor("title_fr").unwrap().language(), Some("fr"));
        assert_eq!(model.accessor("title_fr").unwrap().field_name(), "title");
        assert!(model.accessor("body").is_none());
    }

    // ==================== Idempotence Tests ====================

    #[test]
    fn test_localize_twice_is_noop() {
        let mut model = article(&mut ModelRegistry::new());
        localize_field(&mut model, "title", &languages());
        let second = localize_field(&mut model, "title", &languages());

        assert_eq!(second, 0);
        let count = model.field_names().iter().filter(|n| **n == "title_fr").count();
        assert_eq!(count, 1);
    }

    #[test]
    fn test_only_missing_languages_are_added() {
        let mut model = article(&mut ModelRegistry::new());
        let english = Arc::new(LanguageRegistry::new(&[("en", "English")], "en").unwrap());
        localize_field(&mut model, "title", &english);

        assert_eq!(localize_field(&mut model, "title", &languages()), 1);
        assert_eq!(
            model.field_names(),
            vec!["title", "title_en", "title_fr", "body", "slug"]
        );
    }

    proptest! {
        #[test]
        fn prop_repeated_localization_yields_one_sibling_per_language(repeats in 1usize..5) {
            let mut model = article(&mut ModelRegistry::new());
            for _ in 0..repeats {
                localize_field(&mut model, "title", &languages());
            }
            for code in ["en", "fr"] {
                let name = format!("title_{}", code);
                let count = model.fields().iter().filter(|f| f.name == name).count();
                prop_assert_eq!(count, 1);
            }
        }
    }
}
