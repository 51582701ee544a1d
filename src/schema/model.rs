//! Model classes and their definitions.

use crate::localization::LocalizedAccessor;
use crate::schema::{FieldDefinition, ModelInstance};
use std::collections::{BTreeMap, HashMap};

/// Handle to a model registered in a [`ModelRegistry`](crate::schema::ModelRegistry).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModelId(pub(crate) usize);

/// Schema metadata (`opts`) of a model with storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelOptions {
    pub app_label: String,

    /// Lowercased class name
    pub module_name: String,

    pub db_table: String,

    /// Abstract models only exist to be inherited from and own no table
    pub is_abstract: bool,

    /// Resolved translatable fields, filled in by the resolver
    pub translatable_fields: Option<Vec<String>>,
}

impl ModelOptions {
    /// Lowercased `app_label.module_name`.
    pub fn label(&self) -> String {
        format!("{}.{}", self.app_label, self.module_name).to_lowercase()
    }
}

/// Everything needed to register a model class.
#[derive(Debug, Clone)]
pub struct ModelDef {
    pub(crate) name: String,
    pub(crate) app_label: Option<String>,
    pub(crate) db_table: Option<String>,
    pub(crate) is_abstract: bool,
    pub(crate) bases: Vec<ModelId>,
    pub(crate) fields: Vec<FieldDefinition>,
    pub(crate) translatable_fields: Option<Vec<String>>,
    pub(crate) url_pattern: Option<String>,
}

impl ModelDef {
    /// A model with schema metadata.
    pub fn new(app_label: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            app_label: Some(app_label.into()),
            db_table: None,
            is_abstract: false,
            bases: Vec::new(),
            fields: Vec::new(),
            translatable_fields: None,
            url_pattern: None,
        }
    }

    /// A plain class without metadata. Mixins take part in the base
    /// ordering and own no fields, but their `translatable_fields`
    /// declaration is inherited by every model extending them.
    pub fn mixin(name: impl Into<String>) -> Self {
        Self {
            app_label: None,
            ..Self::new("", name)
        }
    }

    pub fn is_abstract(mut self, is_abstract: bool) -> Self {
        self.is_abstract = is_abstract;
        self
    }

    pub fn db_table(mut self, db_table: impl Into<String>) -> Self {
        self.db_table = Some(db_table.into());
        self
    }

    pub fn base(mut self, base: ModelId) -> Self {
        self.bases.push(base);
        self
    }

    pub fn field(mut self, field: FieldDefinition) -> Self {
        self.fields.push(field);
        self
    }

    /// Declare fields to localize. Consumed the first time the model is
    /// resolved; a mixin keeps its declaration for its subclasses.
    pub fn translatable_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.translatable_fields = Some(fields.into_iter().map(Into::into).collect());
        self
    }

    /// Absolute URL pattern with `{field}` placeholders, e.g. `/articles/{slug}/`.
    pub fn url(mut self, pattern: impl Into<String>) -> Self {
        self.url_pattern = Some(pattern.into());
        self
    }
}

/// A finalized model class.
#[derive(Debug, Clone)]
pub struct ModelClass {
    pub(crate) id: ModelId,
    pub(crate) name: String,
    pub(crate) meta: Option<ModelOptions>,
    pub(crate) bases: Vec<ModelId>,
    pub(crate) mro: Vec<ModelId>,
    pub(crate) fields: Vec<FieldDefinition>,
    /// Inherited fields stored in a concrete ancestor's table
    pub(crate) parent_fields: HashMap<String, ModelId>,
    pub(crate) declared_translatable: Option<Vec<String>>,
    pub(crate) accessors: BTreeMap<String, LocalizedAccessor>,
    pub(crate) url_pattern: Option<String>,
}

impl ModelClass {
    pub fn id(&self) -> ModelId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Registry key: `app_label.module_name` for models, the class name for mixins.
    pub fn label(&self) -> String {
        match &self.meta {
            Some(meta) => meta.label(),
            None => self.name.to_lowercase(),
        }
    }

    pub fn meta(&self) -> Option<&ModelOptions> {
        self.meta.as_ref()
    }

    pub fn bases(&self) -> &[ModelId] {
        &self.bases
    }

    /// This class followed by its ancestors in C3 order.
    pub fn mro(&self) -> &[ModelId] {
        &self.mro
    }

    /// Fields ordered by declaration.
    pub fn fields(&self) -> &[FieldDefinition] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FieldDefinition> {
        self.fields.iter().find(|field| field.name == name)
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.field(name).is_some()
    }

    /// The concrete ancestor whose table stores an inherited field.
    ///
    /// `None` for local fields and for fields inherited from abstract
    /// ancestors, which live in this model's own table.
    pub fn field_owner(&self, name: &str) -> Option<ModelId> {
        self.parent_fields.get(name).copied()
    }

    pub fn field_names(&self) -> Vec<&str> {
        self.fields.iter().map(|field| field.name.as_str()).collect()
    }

    /// Not yet consumed `translatable_fields` declaration.
    pub fn declared_translatable_fields(&self) -> Option<&[String]> {
        self.declared_translatable.as_deref()
    }

    pub fn accessor(&self, name: &str) -> Option<&LocalizedAccessor> {
        self.accessors.get(name)
    }

    pub fn accessors(&self) -> impl Iterator<Item = (&str, &LocalizedAccessor)> {
        self.accessors.iter().map(|(name, accessor)| (name.as_str(), accessor))
    }

    pub fn url_pattern(&self) -> Option<&str> {
        self.url_pattern.as_deref()
    }

    /// An empty instance of this model.
    pub fn instance(&self) -> ModelInstance<'_> {
        ModelInstance::new(self)
    }

    /// Insert a field after every field with the same or a lower creation counter.
    pub(crate) fn add_field(&mut self, field: FieldDefinition) {
        let position = self
            .fields
            .iter()
            .position(|existing| existing.creation_counter > field.creation_counter)
            .unwrap_or(self.fields.len());
        self.fields.insert(position, field);
    }

    pub(crate) fn install_accessor(&mut self, name: impl Into<String>, accessor: LocalizedAccessor) {
        self.accessors.insert(name.into(), accessor);
    }

    pub(crate) fn take_declared_translatable(&mut self) -> Option<Vec<String>> {
        self.declared_translatable.take()
    }
}
