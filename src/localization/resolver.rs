//! Translatable-field resolution.
//!
//! A model's translatable fields are the union of:
//!
//! - its own one-shot `translatable_fields` declaration,
//! - the external configuration entry for its `app_label.module_name`,
//! - the resolved fields of every ancestor,
//! - the declaration of every mixin ancestor, which is never consumed.
//!
//! The result is cached in `opts.translatable_fields`. Ancestors are walked
//! through the precomputed linearization, farthest first, so each ancestor is
//! resolved before anything that inherits from it.

use crate::config::TranslatableModels;
use crate::schema::{ModelId, ModelRegistry};

/// Resolve the translatable fields of `id` and its ancestors.
///
/// Classes without metadata resolve to nothing. Cached results are returned
/// unless `force` is set.
pub fn resolve(
    registry: &mut ModelRegistry,
    id: ModelId,
    external: &TranslatableModels,
    force: bool,
) -> Vec<String> {
    let model = registry.model(id);
    let Some(meta) = model.meta() else {
        return Vec::new();
    };
    if !force {
        if let Some(cached) = &meta.translatable_fields {
            return cached.clone();
        }
    }

    let order: Vec<ModelId> = model.mro().iter().rev().copied().collect();
    for class_id in order {
        let class = registry.model(class_id);
        let Some(meta) = class.meta() else {
            continue;
        };
        if class_id != id && !force && meta.translatable_fields.is_some() {
            continue;
        }

        let mut fields: Vec<String> = if force {
            meta.translatable_fields.clone().unwrap_or_default()
        } else {
            Vec::new()
        };
        if let Some(configured) = external.get(&meta.label()) {
            fields.extend(configured.iter().cloned());
        }
        for ancestor in &class.mro()[1..] {
            let ancestor = registry.model(*ancestor);
            let inherited = match ancestor.meta() {
                Some(meta) => meta.translatable_fields.as_deref(),
                None => ancestor.declared_translatable_fields(),
            };
            if let Some(inherited) = inherited {
                fields.extend(inherited.iter().cloned());
            }
        }

        let class = registry.model_mut(class_id);
        if let Some(declared) = class.take_declared_translatable() {
            fields.extend(declared);
        }

        let mut unique: Vec<String> = Vec::with_capacity(fields.len());
        for field in fields {
            if !unique.contains(&field) {
                unique.push(field);
            }
        }

        if let Some(meta) = class.meta.as_mut() {
            meta.translatable_fields = Some(unique);
        }
    }

    registry
        .model(id)
        .meta()
        .and_then(|meta| meta.translatable_fields.clone())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{FieldDefinition, ModelDef};

    fn external() -> TranslatableModels {
        let mut external = TranslatableModels::new();
        external.insert("pages.page".to_string(), vec!["title".to_string()]);
        external
    }

    // ==================== Source Tests ====================

    #[test]
    fn test_resolve_local_declaration_is_consumed() {
        let mut registry = ModelRegistry::new();
        let id = registry
            .register(
                ModelDef::new("blog", "Article")
                    .field(FieldDefinition::char("title", 64))
                    .translatable_fields(["title", "title"]),
            )
            .unwrap();

        assert_eq!(resolve(&mut registry, id, &external(), false), vec!["title"]);
        assert!(registry.model(id).declared_translatable_fields().is_none());
        assert_eq!(
            registry.model(id).meta().unwrap().translatable_fields,
            Some(vec!["title".to_string()])
        );
    }

    #[test]
    fn test_resolve_external_configuration() {
        let mut registry = ModelRegistry::new();
        let id = registry
            .register(ModelDef::new("Pages", "Page").field(FieldDefinition::char("title", 64)))
            .unwrap();

        assert_eq!(resolve(&mut registry, id, &external(), false), vec!["title"]);
    }

    #[test]
    fn test_resolve_mixin_is_empty() {
        let mut registry = ModelRegistry::new();
        let id = registry
            .register(ModelDef::mixin("Printable").translatable_fields(["title"]))
            .unwrap();

        assert!(resolve(&mut registry, id, &external(), true).is_empty());
    }

    #[test]
    fn test_resolve_inherits_from_ancestors() {
        let mut registry = ModelRegistry::new();
        let base = registry
            .register(
                ModelDef::new("blog", "Entry")
                    .is_abstract(true)
                    .field(FieldDefinition::char("title", 64))
                    .translatable_fields(["title"]),
            )
            .unwrap();
        let article = registry
            .register(
                ModelDef::new("blog", "Article")
                    .base(base)
                    .field(FieldDefinition::text("body"))
                    .translatable_fields(["body"]),
            )
            .unwrap();

        assert_eq!(
            resolve(&mut registry, article, &external(), false),
            vec!["title", "body"]
        );
        // The ancestor was resolved along the way
        assert_eq!(
            registry.model(base).meta().unwrap().translatable_fields,
            Some(vec!["title".to_string()])
        );
    }

    #[test]
    fn test_resolve_diamond() {
        let mut registry = ModelRegistry::new();
        let root = registry
            .register(ModelDef::new("app", "Root").translatable_fields(["name"]))
            .unwrap();
        let left = registry
            .register(ModelDef::new("app", "Left").base(root).translatable_fields(["left"]))
            .unwrap();
        let right = registry
            .register(ModelDef::new("app", "Right").base(root).translatable_fields(["right"]))
            .unwrap();
        let leaf = registry
            .register(ModelDef::new("app", "Leaf").base(left).base(right))
            .unwrap();

        let mut fields = resolve(&mut registry, leaf, &external(), false);
        fields.sort();
        assert_eq!(fields, vec!["left", "name", "right"]);
    }

    #[test]
    fn test_resolve_inherits_mixin_declaration() {
        let mut registry = ModelRegistry::new();
        let mixin = registry
            .register(ModelDef::mixin("TranslatableTitle").translatable_fields(["title"]))
            .unwrap();
        let page = registry
            .register(
                ModelDef::new("pages", "Page")
                    .base(mixin)
                    .field(FieldDefinition::char("title", 64)),
            )
            .unwrap();
        let post = registry
            .register(ModelDef::new("pages", "Post").base(mixin).translatable_fields(["body"]))
            .unwrap();

        assert_eq!(resolve(&mut registry, page, &external(), false), vec!["title"]);
        assert_eq!(resolve(&mut registry, post, &external(), false), vec!["title", "body"]);
        // Shared by every subclass, so never consumed
        assert!(registry.model(mixin).declared_translatable_fields().is_some());
    }

    // ==================== Caching Tests ====================

    #[test]
    fn test_resolve_uses_cache_unless_forced() {
        let mut registry = ModelRegistry::new();
        let id = registry
            .register(ModelDef::new("pages", "page").translatable_fields(["title"]))
            .unwrap();
        assert_eq!(resolve(&mut registry, id, &TranslatableModels::new(), false), vec!["title"]);

        let mut more = TranslatableModels::new();
        more.insert("pages.page".to_string(), vec!["summary".to_string()]);

        // Cached result wins without force
        assert_eq!(resolve(&mut registry, id, &more, false), vec!["title"]);
        // Forced resolution keeps what was cached and adds the new source
        assert_eq!(resolve(&mut registry, id, &more, true), vec!["title", "summary"]);
    }
}
