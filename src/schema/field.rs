//! Field definitions: one storage column each.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Semantic type of a field. Localized siblings reuse the kind of their source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Char,
    Text,
    Slug,
    Email,
    Url,
    Integer,
    BigInteger,
    Boolean,
    Float,
    Date,
    DateTime,
    Json,
}

impl FieldKind {
    /// Max length the kind applies when none is given.
    pub fn default_max_length(self) -> Option<u32> {
        match self {
            FieldKind::Slug => Some(50),
            FieldKind::Email => Some(254),
            FieldKind::Url => Some(200),
            _ => None,
        }
    }

    fn is_varchar(self) -> bool {
        matches!(
            self,
            FieldKind::Char | FieldKind::Slug | FieldKind::Email | FieldKind::Url
        )
    }
}

/// Schema description of a single model field.
///
/// Every attribute in the cloneable subset is an `Option`; `None` means the
/// attribute was never set and the kind's own default applies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDefinition {
    pub name: String,

    #[serde(rename = "type")]
    pub kind: FieldKind,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub help_text: Option<String>,

    /// (stored value, display name) pairs
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub choices: Option<Vec<(String, String)>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blank: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub null: Option<bool>,

    #[serde(default = "default_editable")]
    pub editable: bool,

    /// Explicit column name; the field name is used when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column: Option<String>,

    /// Declaration-order key, assigned by the model registry
    #[serde(skip)]
    pub creation_counter: u64,
}

fn default_editable() -> bool {
    true
}

impl FieldDefinition {
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
            label: None,
            help_text: None,
            choices: None,
            max_length: None,
            default: None,
            blank: None,
            null: None,
            editable: true,
            column: None,
            creation_counter: 0,
        }
    }

    pub fn char(name: impl Into<String>, max_length: u32) -> Self {
        Self::new(name, FieldKind::Char).max_length(max_length)
    }

    pub fn text(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Text)
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn help_text(mut self, help_text: impl Into<String>) -> Self {
        self.help_text = Some(help_text.into());
        self
    }

    pub fn choices<K, V>(mut self, choices: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.choices = Some(
            choices
                .into_iter()
                .map(|(value, name)| (value.into(), name.into()))
                .collect(),
        );
        self
    }

    pub fn max_length(mut self, max_length: u32) -> Self {
        self.max_length = Some(max_length);
        self
    }

    pub fn default_value(mut self, default: impl Into<Value>) -> Self {
        self.default = Some(default.into());
        self
    }

    pub fn blank(mut self, blank: bool) -> Self {
        self.blank = Some(blank);
        self
    }

    pub fn null(mut self, null: bool) -> Self {
        self.null = Some(null);
        self
    }

    pub fn column(mut self, column: impl Into<String>) -> Self {
        self.column = Some(column.into());
        self
    }

    pub fn is_nullable(&self) -> bool {
        self.null.unwrap_or(false)
    }

    pub fn effective_max_length(&self) -> Option<u32> {
        self.max_length.or_else(|| self.kind.default_max_length())
    }

    /// Storage column name.
    pub fn column_name(&self) -> &str {
        self.column.as_deref().unwrap_or(&self.name)
    }

    /// PostgreSQL column type for this field.
    pub fn db_type(&self) -> String {
        if self.kind.is_varchar() {
            return match self.effective_max_length() {
                Some(length) => format!("varchar({})", length),
                None => "varchar".to_string(),
            };
        }
        match self.kind {
            FieldKind::Text => "text",
            FieldKind::Integer => "integer",
            FieldKind::BigInteger => "bigint",
            FieldKind::Boolean => "boolean",
            FieldKind::Float => "double precision",
            FieldKind::Date => "date",
            FieldKind::DateTime => "timestamp with time zone",
            FieldKind::Json => "jsonb",
            FieldKind::Char | FieldKind::Slug | FieldKind::Email | FieldKind::Url => "varchar",
        }
        .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_builder_sets_only_given_attributes() {
        let field = FieldDefinition::char("title", 64).label("Title");
        assert_eq!(field.max_length, Some(64));
        assert_eq!(field.label.as_deref(), Some("Title"));
        assert!(field.help_text.is_none());
        assert!(field.null.is_none());
        assert!(field.editable);
    }

    #[test]
    fn test_db_type_mapping() {
        assert_eq!(FieldDefinition::char("title", 64).db_type(), "varchar(64)");
        assert_eq!(FieldDefinition::text("body").db_type(), "text");
        assert_eq!(FieldDefinition::new("slug", FieldKind::Slug).db_type(), "varchar(50)");
        assert_eq!(FieldDefinition::new("n", FieldKind::BigInteger).db_type(), "bigint");
        assert_eq!(
            FieldDefinition::new("at", FieldKind::DateTime).db_type(),
            "timestamp with time zone"
        );
    }

    #[test]
    fn test_column_name_override() {
        let field = FieldDefinition::text("body").column("body_text");
        assert_eq!(field.column_name(), "body_text");
        assert_eq!(FieldDefinition::text("body").column_name(), "body");
    }

    #[test]
    fn test_deserialize_from_manifest_shape() {
        let field: FieldDefinition = serde_json::from_value(json!({
            "name": "status",
            "type": "char",
            "max_length": 10,
            "choices": [["draft", "Draft"], ["live", "Live"]],
            "default": "draft"
        }))
        .expect("Should deserialize");

        assert_eq!(field.kind, FieldKind::Char);
        assert_eq!(field.choices.as_ref().map(Vec::len), Some(2));
        assert_eq!(field.default, Some(json!("draft")));
        assert!(field.editable);
        assert_eq!(field.creation_counter, 0);
    }
}
