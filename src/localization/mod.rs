//! Field localization engine.
//!
//! When a model class is finalized the engine works out which of its fields
//! are translatable, adds one non-editable sibling field per configured
//! language (`title_en`, `title_fr`, ...) right after the source field, and
//! installs accessors so that `title` reads and writes the current
//! language's value with a fallback to the canonical one.
//!
//! - `attributes`: the cloneable attribute subset of a field
//! - `synthesizer`: sibling field creation
//! - `accessor`: per-(field, language) read/write routing
//! - `resolver`: declared, configured and inherited translatable fields

mod accessor;
pub mod attributes;
pub mod resolver;
pub mod synthesizer;

pub use accessor::{is_truthy, LocalizedAccessor};
pub use attributes::{extract, FieldAttributes};
pub use synthesizer::localize_field;

use crate::config::{Config, TranslatableModels};
use crate::i18n::LanguageRegistry;
use crate::schema::{ModelId, ModelRegistry};
use anyhow::Result;
use std::sync::Arc;
use tracing::debug;

/// Immutable localization settings shared by every model of a registry.
#[derive(Debug, Clone)]
pub struct LocalizationEngine {
    languages: Arc<LanguageRegistry>,
    external: Arc<TranslatableModels>,
}

impl LocalizationEngine {
    /// # Arguments
    /// * `languages` - Configured languages
    /// * `external` - Translatable fields for models that cannot declare them
    ///   themselves, keyed by `app_label.module_name` (any case)
    pub fn new(languages: Arc<LanguageRegistry>, external: TranslatableModels) -> Self {
        let external = external
            .into_iter()
            .map(|(model, fields)| (model.to_lowercase(), fields))
            .collect();
        Self {
            languages,
            external: Arc::new(external),
        }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let languages = Arc::new(LanguageRegistry::from_config(config)?);
        Ok(Self::new(languages, config.translatable_models.clone()))
    }

    pub fn languages(&self) -> &Arc<LanguageRegistry> {
        &self.languages
    }

    pub fn external(&self) -> &TranslatableModels {
        &self.external
    }

    /// Translatable field names of a model, see [`resolver::resolve`].
    pub fn translatable_fields(&self, registry: &mut ModelRegistry, id: ModelId, force: bool) -> Vec<String> {
        resolver::resolve(registry, id, &self.external, force)
    }

    /// Re-resolve one model and localize each of its translatable fields.
    pub fn make_model_translatable(&self, registry: &mut ModelRegistry, id: ModelId) {
        let fields = self.translatable_fields(registry, id, true);
        let model = registry.model_mut(id);
        for field_name in &fields {
            localize_field(model, field_name, &self.languages);
        }
    }

    /// Localize a freshly finalized model and all of its ancestors.
    ///
    /// Ancestors are processed before the classes that extend them.
    pub fn on_model_ready(&self, registry: &mut ModelRegistry, id: ModelId) {
        let order: Vec<ModelId> = registry.model(id).mro().iter().rev().copied().collect();
        for class_id in order {
            if registry.model(class_id).meta().is_none() {
                continue;
            }
            self.make_model_translatable(registry, class_id);
        }

        let model = registry.model(id);
        if let Some(fields) = model.meta().and_then(|meta| meta.translatable_fields.as_ref()) {
            if !fields.is_empty() {
                debug!(model = %model.name(), fields = ?fields, "Model is translatable");
            }
        }
    }
}
