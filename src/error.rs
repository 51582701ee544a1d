use thiserror::Error;

/// Errors raised while registering model classes.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SchemaError {
    #[error("model '{0}' is already registered")]
    DuplicateModel(String),

    #[error("unknown base model '{base}' for '{model}'")]
    UnknownBase { model: String, base: String },

    #[error("cannot create a consistent base ordering for '{0}'")]
    InconsistentHierarchy(String),

    #[error("field '{field}' on '{model}' clashes with an inherited field")]
    FieldClash { model: String, field: String },

    #[error("'{0}' has no metadata and cannot declare fields")]
    MixinFields(String),
}
