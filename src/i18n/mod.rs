//! Language configuration and the ambient "current language".
//!
//! - `registry`: the configured languages and the default, resolved once at startup
//! - `activation`: task-local and thread-local activation of the current language
//!
//! # Example
//!
//! ```rust,ignore
//! use magic_translation::i18n::{self, LanguageRegistry};
//!
//! let registry = LanguageRegistry::new(&[("en", "English"), ("fr", "Français")], "en")?;
//! i18n::activate("fr");
//! assert_eq!(registry.current_language(), "fr");
//! ```

pub mod activation;
mod registry;

pub use activation::{activate, deactivate, get_language};
pub use registry::{LanguageConfig, LanguageRegistry};
