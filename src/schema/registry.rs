//! Model registry: the place model classes are finalized.
//!
//! `register` computes the class's C3 linearization, copies inherited fields
//! and accessors, assigns declaration-order counters, and then hands the
//! finished class to the localization engine when one is installed.

use crate::config::Config;
use crate::error::SchemaError;
use crate::localization::LocalizationEngine;
use crate::schema::{ModelClass, ModelDef, ModelId, ModelOptions};
use anyhow::Result;
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

#[derive(Debug, Default)]
pub struct ModelRegistry {
    models: Vec<ModelClass>,
    by_label: HashMap<String, ModelId>,
    engine: Option<LocalizationEngine>,
    creation_counter: u64,
}

impl ModelRegistry {
    /// A registry without localization.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry that localizes every model it finalizes.
    pub fn with_localization(engine: LocalizationEngine) -> Self {
        Self {
            engine: Some(engine),
            ..Self::default()
        }
    }

    /// Localization is installed only when `use_i18n` is set.
    pub fn from_config(config: &Config) -> Result<Self> {
        if !config.use_i18n {
            return Ok(Self::new());
        }
        Ok(Self::with_localization(LocalizationEngine::from_config(config)?))
    }

    pub fn engine(&self) -> Option<&LocalizationEngine> {
        self.engine.as_ref()
    }

    /// Finalize a model class.
    ///
    /// # Returns
    /// * `Ok(ModelId)` for the new class
    /// * `Err` on duplicate labels, unknown bases, fields on a mixin, field
    ///   clashes with inherited fields, or bases with no consistent ordering
    pub fn register(&mut self, def: ModelDef) -> Result<ModelId, SchemaError> {
        let ModelDef {
            name,
            app_label,
            db_table,
            is_abstract,
            bases,
            fields,
            translatable_fields,
            url_pattern,
        } = def;

        for base in &bases {
            if base.0 >= self.models.len() {
                return Err(SchemaError::UnknownBase {
                    model: name,
                    base: format!("#{}", base.0),
                });
            }
        }

        let meta = app_label.map(|app_label| {
            let module_name = name.to_lowercase();
            ModelOptions {
                db_table: db_table
                    .unwrap_or_else(|| format!("{}_{}", app_label, module_name).to_lowercase()),
                app_label,
                module_name,
                is_abstract,
                translatable_fields: None,
            }
        });

        if meta.is_none() && !fields.is_empty() {
            return Err(SchemaError::MixinFields(name));
        }

        let label = match &meta {
            Some(meta) => meta.label(),
            None => name.to_lowercase(),
        };
        if self.by_label.contains_key(&label) {
            return Err(SchemaError::DuplicateModel(label));
        }

        let id = ModelId(self.models.len());
        let mro = self
            .linearize(id, &bases)
            .ok_or_else(|| SchemaError::InconsistentHierarchy(name.clone()))?;

        let mut class = ModelClass {
            id,
            name,
            meta,
            bases,
            mro,
            fields: Vec::new(),
            parent_fields: HashMap::new(),
            declared_translatable: translatable_fields,
            accessors: BTreeMap::new(),
            url_pattern,
        };

        // Farthest ancestor first, so nearer ancestors win for accessors
        let ancestors: Vec<ModelId> = class.mro[1..].iter().rev().copied().collect();
        for ancestor in ancestors {
            let ancestor = &self.models[ancestor.0];
            let concrete = match &ancestor.meta {
                None => continue,
                Some(meta) if meta.is_abstract => None,
                Some(_) => Some(ancestor.id),
            };
            for field in &ancestor.fields {
                if !class.has_field(&field.name) {
                    if let Some(owner) = ancestor.field_owner(&field.name).or(concrete) {
                        class.parent_fields.insert(field.name.clone(), owner);
                    }
                    class.add_field(field.clone());
                }
            }
            for (attr, accessor) in &ancestor.accessors {
                class.install_accessor(attr.clone(), accessor.clone());
            }
        }

        for mut field in fields {
            if class.has_field(&field.name) {
                return Err(SchemaError::FieldClash {
                    model: class.name,
                    field: field.name,
                });
            }
            self.creation_counter += 1;
            field.creation_counter = self.creation_counter;
            class.add_field(field);
        }

        debug!(
            model = %class.name,
            label = %label,
            fields = class.fields.len(),
            "Registered model"
        );

        self.models.push(class);
        self.by_label.insert(label, id);

        if let Some(engine) = self.engine.clone() {
            engine.on_model_ready(self, id);
        }

        Ok(id)
    }

    /// Get a registered model.
    ///
    /// # Panics
    /// Panics if `id` was not produced by this registry.
    pub fn model(&self, id: ModelId) -> &ModelClass {
        &self.models[id.0]
    }

    pub fn get(&self, id: ModelId) -> Option<&ModelClass> {
        self.models.get(id.0)
    }

    pub(crate) fn model_mut(&mut self, id: ModelId) -> &mut ModelClass {
        &mut self.models[id.0]
    }

    /// Find a model by `app_label.module_name` (or mixin name), case-insensitively.
    pub fn lookup(&self, label: &str) -> Option<ModelId> {
        self.by_label.get(&label.to_lowercase()).copied()
    }

    /// Model ids in registration order.
    pub fn ids(&self) -> impl Iterator<Item = ModelId> {
        (0..self.models.len()).map(ModelId)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ModelClass> {
        self.models.iter()
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    /// C3 linearization of a new class `id` with the given direct bases.
    fn linearize(&self, id: ModelId, bases: &[ModelId]) -> Option<Vec<ModelId>> {
        let mut sequences: Vec<Vec<ModelId>> = bases
            .iter()
            .map(|base| self.models[base.0].mro.clone())
            .collect();
        sequences.push(bases.to_vec());

        let mut result = vec![id];
        loop {
            sequences.retain(|seq| !seq.is_empty());
            if sequences.is_empty() {
                return Some(result);
            }

            let candidate = sequences
                .iter()
                .map(|seq| seq[0])
                .find(|head| !sequences.iter().any(|seq| seq[1..].contains(head)))?;

            result.push(candidate);
            for seq in sequences.iter_mut() {
                if seq[0] == candidate {
                    seq.remove(0);
                }
            }
        }
    }
}
