//! Localized accessors: per-(field, language) read/write routing.
//!
//! A field `title` localized into `en` and `fr` gets three accessors:
//!
//! - `title_en`, `title_fr`: bound to one language
//! - `title`: the main accessor, bound to whichever language is current
//!
//! Reads prefer the language slot (`title_fr`) and fall back to the
//! canonical slot (`title`) when the language slot is empty. Writes through
//! the main accessor update both the current language slot and the canonical
//! slot; writes through a language accessor only touch their own slot.

use crate::i18n::LanguageRegistry;
use crate::schema::Slots;
use serde_json::Value;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct LocalizedAccessor {
    field_name: String,
    language: Option<String>,
    languages: Arc<LanguageRegistry>,
}

impl LocalizedAccessor {
    /// Accessor installed under the field's own name.
    pub fn main(field_name: impl Into<String>, languages: Arc<LanguageRegistry>) -> Self {
        Self {
            field_name: field_name.into(),
            language: None,
            languages,
        }
    }

    /// Accessor installed under `<field>_<language>`.
    pub fn for_language(
        field_name: impl Into<String>,
        language: impl Into<String>,
        languages: Arc<LanguageRegistry>,
    ) -> Self {
        Self {
            field_name: field_name.into(),
            language: Some(language.into()),
            languages,
        }
    }

    /// Canonical field name; also the canonical slot.
    pub fn field_name(&self) -> &str {
        &self.field_name
    }

    pub fn language(&self) -> Option<&str> {
        self.language.as_deref()
    }

    pub fn is_main(&self) -> bool {
        self.language.is_none()
    }

    /// The bound language, or the current one for the main accessor.
    pub fn effective_language(&self) -> &str {
        match &self.language {
            Some(code) => code.as_str(),
            None => self.languages.current_language(),
        }
    }

    pub fn localized_slot(&self) -> String {
        format!("{}_{}", self.field_name, self.effective_language())
    }

    pub fn get(&self, slots: &Slots) -> Option<Value> {
        match slots.get(&self.localized_slot()) {
            Some(value) if is_truthy(value) => Some(value.clone()),
            _ => slots.get(&self.field_name).cloned(),
        }
    }

    pub fn set(&self, slots: &mut Slots, value: Value) {
        let language = self.effective_language();

        // An empty write in the current language keeps the visible value
        let value = if language == self.languages.current_language() && !is_truthy(&value) {
            slots.get(&self.field_name).cloned().unwrap_or(Value::Null)
        } else {
            value
        };

        if self.is_main() {
            slots.insert(self.field_name.clone(), value.clone());
        }
        slots.insert(format!("{}_{}", self.field_name, language), value);
    }
}

/// `null`, `false`, `0`, `""`, `[]` and `{}` are falsy.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().map(|n| n != 0.0).unwrap_or(true),
        Value::String(text) => !text.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(entries) => !entries.is_empty(),
    }
}
