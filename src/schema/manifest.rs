//! JSON model manifest.
//!
//! Lets tools outside the application (the sync CLI) see the application's
//! models. Entries are registered in file order, so bases must be listed
//! before the models that extend them.
//!
//! ```json
//! {
//!   "models": [
//!     { "name": "Entry", "app_label": "blog", "abstract": true,
//!       "fields": [{ "name": "title", "type": "char", "max_length": 64 }],
//!       "translatable_fields": ["title"] },
//!     { "name": "Article", "app_label": "blog", "bases": ["blog.entry"],
//!       "fields": [{ "name": "body", "type": "text" }],
//!       "url": "/articles/{id}/" }
//!   ]
//! }
//! ```

use crate::schema::{FieldDefinition, ModelDef, ModelId, ModelRegistry};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;
use tracing::info;

#[derive(Debug, Clone, Deserialize)]
pub struct Manifest {
    pub models: Vec<ModelEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ModelEntry {
    pub name: String,

    /// Absent for mixins
    #[serde(default)]
    pub app_label: Option<String>,

    #[serde(default, rename = "abstract")]
    pub is_abstract: bool,

    #[serde(default)]
    pub db_table: Option<String>,

    /// Labels of already listed models
    #[serde(default)]
    pub bases: Vec<String>,

    #[serde(default)]
    pub fields: Vec<FieldDefinition>,

    #[serde(default)]
    pub translatable_fields: Option<Vec<String>>,

    #[serde(default)]
    pub url: Option<String>,
}

impl Manifest {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read model manifest at {}", path.display()))?;
        Self::parse(&raw).with_context(|| format!("Invalid model manifest at {}", path.display()))
    }

    pub fn parse(raw: &str) -> Result<Self> {
        serde_json::from_str(raw).context("Failed to parse model manifest")
    }

    /// Register every entry, in order.
    pub fn register_into(self, registry: &mut ModelRegistry) -> Result<Vec<ModelId>> {
        let mut ids = Vec::with_capacity(self.models.len());

        for entry in self.models {
            let mut def = match &entry.app_label {
                Some(app_label) => ModelDef::new(app_label.clone(), entry.name.clone()),
                None => ModelDef::mixin(entry.name.clone()),
            }
            .is_abstract(entry.is_abstract);

            if let Some(db_table) = entry.db_table {
                def = def.db_table(db_table);
            }
            for base in &entry.bases {
                let base_id = registry
                    .lookup(base)
                    .with_context(|| format!("Unknown base '{}' for model '{}'", base, entry.name))?;
                def = def.base(base_id);
            }
            for field in entry.fields {
                def = def.field(field);
            }
            if let Some(fields) = entry.translatable_fields {
                def = def.translatable_fields(fields);
            }
            if let Some(url) = entry.url {
                def = def.url(url);
            }

            let id = registry
                .register(def)
                .with_context(|| format!("Failed to register model '{}'", entry.name))?;
            ids.push(id);
        }

        info!("Registered {} models from manifest", ids.len());
        Ok(ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const MANIFEST: &str = r#"{
        "models": [
            { "name": "Publishable" },
            { "name": "Entry", "app_label": "blog", "abstract": true,
              "fields": [{ "name": "title", "type": "char", "max_length": 64 }] },
            { "name": "Article", "app_label": "blog", "bases": ["blog.entry", "publishable"],
              "db_table": "articles",
              "fields": [{ "name": "body", "type": "text", "null": true }],
              "translatable_fields": ["body"],
              "url": "/articles/{id}/" }
        ]
    }"#;

    #[test]
    fn test_parse_and_register() {
        let manifest = Manifest::parse(MANIFEST).expect("Should parse");
        let mut registry = ModelRegistry::new();
        let ids = manifest.register_into(&mut registry).expect("Should register");

        assert_eq!(ids.len(), 3);
        let article = registry.model(ids[2]);
        assert_eq!(article.meta().unwrap().db_table, "articles");
        assert_eq!(article.field_names(), vec!["title", "body"]);
        assert_eq!(article.declared_translatable_fields(), Some(&["body".to_string()][..]));
        assert_eq!(article.url_pattern(), Some("/articles/{id}/"));
        assert!(registry.model(ids[0]).meta().is_none());
    }

    #[test]
    fn test_unknown_base_is_reported() {
        let manifest = Manifest::parse(
            r#"{ "models": [{ "name": "Article", "app_label": "blog", "bases": ["blog.entry"] }] }"#,
        )
        .unwrap();
        let err = manifest.register_into(&mut ModelRegistry::new()).unwrap_err();
        assert!(err.to_string().contains("Unknown base 'blog.entry'"));
    }

    #[test]
    fn test_load_from_file() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let path = temp_dir.path().join("models.json");
        std::fs::write(&path, MANIFEST).unwrap();

        let manifest = Manifest::load(&path).expect("Should load");
        assert_eq!(manifest.models.len(), 3);
    }

    #[test]
    fn test_load_missing_file() {
        let err = Manifest::load("/non/existent/models.json").unwrap_err();
        assert!(err.to_string().contains("Failed to read model manifest"));
    }
}
