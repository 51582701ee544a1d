//! Language registry: the configured, ordered set of languages.
//!
//! The registry is built once from [`Config`](crate::config::Config) and then
//! shared by reference (usually behind an `Arc`) with every component that
//! needs to know which languages exist or which one is current.

use crate::config::Config;
use crate::i18n::activation;
use anyhow::{bail, Result};

/// Configuration for a supported language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageConfig {
    /// Language code as configured (e.g., "en", "pt-br")
    pub code: String,

    /// Display name (e.g., "English", "Français")
    pub name: String,

    /// Whether this is the process-wide default language (exactly one is)
    pub is_default: bool,
}

/// Immutable registry of configured languages.
#[derive(Debug, Clone)]
pub struct LanguageRegistry {
    languages: Vec<LanguageConfig>,
}

impl LanguageRegistry {
    /// Build a registry from ordered (code, name) pairs.
    ///
    /// # Arguments
    /// * `languages` - Ordered (code, display name) pairs
    /// * `default` - Code of the default language; must be one of `languages`
    ///
    /// # Returns
    /// * `Err` if the list is empty, a code repeats, or `default` is not listed
    pub fn new<C, N>(languages: &[(C, N)], default: &str) -> Result<Self>
    where
        C: AsRef<str>,
        N: AsRef<str>,
    {
        if languages.is_empty() {
            bail!("At least one language must be configured");
        }

        let mut configs: Vec<LanguageConfig> = Vec::with_capacity(languages.len());
        for (code, name) in languages {
            let code = code.as_ref();
            if configs.iter().any(|lang| lang.code == code) {
                bail!("Language '{}' is configured twice", code);
            }
            configs.push(LanguageConfig {
                code: code.to_string(),
                name: name.as_ref().to_string(),
                is_default: code == default,
            });
        }

        if !configs.iter().any(|lang| lang.is_default) {
            bail!("Default language '{}' is not among the configured languages", default);
        }

        Ok(Self { languages: configs })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(&config.languages, &config.language_code)
    }

    /// Get a language configuration by its code.
    pub fn get_by_code(&self, code: &str) -> Option<&LanguageConfig> {
        self.languages.iter().find(|lang| lang.code == code)
    }

    /// All configured languages, in configuration order.
    pub fn list(&self) -> &[LanguageConfig] {
        &self.languages
    }

    /// Configured language codes, in configuration order.
    pub fn codes(&self) -> impl Iterator<Item = &str> {
        self.languages.iter().map(|lang| lang.code.as_str())
    }

    /// Check if a language code is configured.
    pub fn is_supported(&self, code: &str) -> bool {
        self.get_by_code(code).is_some()
    }

    /// The process-wide default language code.
    pub fn default_language(&self) -> &str {
        self.languages
            .iter()
            .find(|lang| lang.is_default)
            .map(|lang| lang.code.as_str())
            .unwrap_or_else(|| self.languages[0].code.as_str())
    }

    /// The ambient language if it is configured, otherwise the default.
    pub fn current_language(&self) -> &str {
        match activation::get_language() {
            Some(code) => match self.get_by_code(&code) {
                Some(lang) => lang.code.as_str(),
                None => self.default_language(),
            },
            None => self.default_language(),
        }
    }
}
