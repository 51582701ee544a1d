//! Schema layer: model classes, field definitions and the registry that
//! finalizes them.
//!
//! This is the host the localization engine plugs into. Model classes are
//! registered once, in dependency order (bases before subclasses), and are
//! read-only afterwards apart from the engine's own bookkeeping.

mod field;
mod instance;
pub mod manifest;
mod model;
mod registry;

pub use field::{FieldDefinition, FieldKind};
pub use instance::{ModelInstance, Slots};
pub use model::{ModelClass, ModelDef, ModelId, ModelOptions};
pub use registry::ModelRegistry;
