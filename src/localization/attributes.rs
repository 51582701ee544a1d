//! Cloneable attribute subset of a field definition.

use crate::schema::{FieldDefinition, FieldKind};
use serde_json::Value;

/// Attributes copied from a source field onto its localized siblings.
///
/// Unset members stay `None`, so the sibling falls back to its kind's
/// defaults exactly like the source did.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldAttributes {
    pub label: Option<String>,
    pub help_text: Option<String>,
    pub choices: Option<Vec<(String, String)>>,
    pub max_length: Option<u32>,
    pub default: Option<Value>,
    pub blank: Option<bool>,
    pub null: Option<bool>,
    pub editable: Option<bool>,
}

/// Extract the explicitly set members of
/// {label, help_text, choices, max_length, default, blank, null}.
pub fn extract(field: &FieldDefinition) -> FieldAttributes {
    FieldAttributes {
        label: field.label.clone(),
        help_text: field.help_text.clone(),
        choices: field.choices.clone(),
        max_length: field.max_length,
        default: field.default.clone(),
        blank: field.blank,
        null: field.null,
        editable: None,
    }
}

impl FieldAttributes {
    /// Names of the attributes that are set.
    #[cfg(test)]
    fn names(&self) -> Vec<&'static str> {
        let mut names = Vec::new();
        if self.label.is_some() {
            names.push("label");
        }
        if self.help_text.is_some() {
            names.push("help_text");
        }
        if self.choices.is_some() {
            names.push("choices");
        }
        if self.max_length.is_some() {
            names.push("max_length");
        }
        if self.default.is_some() {
            names.push("default");
        }
        if self.blank.is_some() {
            names.push("blank");
        }
        if self.null.is_some() {
            names.push("null");
        }
        if self.editable.is_some() {
            names.push("editable");
        }
        names
    }

    pub fn is_nullable(&self) -> bool {
        self.null.unwrap_or(false)
    }

    /// Construct a field of `kind` from these attributes.
    pub fn build(&self, name: impl Into<String>, kind: FieldKind) -> FieldDefinition {
        let mut field = FieldDefinition::new(name, kind);
        field.label = self.label.clone();
        field.help_text = self.help_text.clone();
        field.choices = self.choices.clone();
        field.max_length = self.max_length;
        field.default = self.default.clone();
        field.blank = self.blank;
        field.null = self.null;
        field.editable = self.editable.unwrap_or(true);
        field
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extract_omits_unset_attributes() {
        let field = FieldDefinition::char("title", 64).label("Title");
        let attrs = extract(&field);
        assert_eq!(attrs.names(), vec!["label", "max_length"]);
    }

    #[test]
    fn test_extract_copies_every_set_attribute() {
        let field = FieldDefinition::char("status", 10)
            .label("Status")
            .help_text("Publication state")
            .choices([("draft", "Draft"), ("live", "Live")])
            .default_value("draft")
            .blank(true)
            .null(false);

        let attrs = extract(&field);
        assert_eq!(
            attrs.names(),
            vec!["label", "help_text", "choices", "max_length", "default", "blank", "null"]
        );
        assert_eq!(attrs.default, Some(json!("draft")));
        assert!(!attrs.is_nullable());
    }

    #[test]
    fn test_extract_ignores_column_and_editable() {
        let mut field = FieldDefinition::text("body").column("body_text");
        field.editable = false;
        let attrs = extract(&field);
        assert!(attrs.names().is_empty());
    }

    #[test]
    fn test_build_uses_kind_defaults_for_unset() {
        let attrs = FieldAttributes::default();
        let field = attrs.build("slug_en", FieldKind::Slug);
        assert_eq!(field.max_length, None);
        assert_eq!(field.effective_max_length(), Some(50));
        assert!(field.editable);
    }
}
