use crate::helpers::slug::slugify;
use serde::Deserialize;
use std::fmt::Display;

/// Key of the field that carries a record's display name.
pub const NAME_FIELD_KEY: &str = "__name__";

/// Declared type of a field, as written in the book.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum FieldType {
    /// Free text
    Plain,
    /// One of a fixed list of options
    Enum,
    /// Computed from other fields; never stored
    Formula,
    /// Link to records of another sheet
    Join,
    /// Typed per record; the actual type is discovered from the values
    Generic,
    /// Anything this converter does not know about
    Other(String),
}

impl From<String> for FieldType {
    fn from(name: String) -> Self {
        match name.as_str() {
            "plain" => FieldType::Plain,
            "enum" => FieldType::Enum,
            "formula" => FieldType::Formula,
            "join" => FieldType::Join,
            "generic" => FieldType::Generic,
            _ => FieldType::Other(name),
        }
    }
}

impl Display for FieldType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldType::Plain => f.write_str("plain"),
            FieldType::Enum => f.write_str("enum"),
            FieldType::Formula => f.write_str("formula"),
            FieldType::Join => f.write_str("join"),
            FieldType::Generic => f.write_str("generic"),
            FieldType::Other(name) => f.write_str(name),
        }
    }
}

/// Reference to the sheet a join field points at.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct LinkedSheet {
    #[serde(rename = "_id", default)]
    pub id: String,
}

/// One column definition within a sheet.
#[derive(Clone, Debug, Deserialize)]
pub struct Field {
    /// Stable identifier within the sheet; records are keyed by it
    pub key: String,
    /// Display name
    #[serde(default)]
    pub name: String,
    /// Declared type
    #[serde(rename = "type")]
    pub kind: FieldType,
    /// Options of an enum field
    #[serde(rename = "enum", default)]
    pub options: Vec<String>,
    /// Formula expression tree, kept verbatim
    #[serde(default)]
    pub expression: Option<serde_json::Value>,
    /// Sheet targeted by a join field
    #[serde(rename = "linkedSheet", default)]
    pub linked_sheet: Option<LinkedSheet>,
}

impl Field {
    /// Column name derived from the display name, `None` when it slugs to nothing.
    pub fn column_name(&self) -> Option<String> {
        Some(slugify(self.name.as_str())).filter(|name| !name.is_empty())
    }

    /// True for fields that never get a base table column of their own and are
    /// surfaced through the view's `_name_` projection instead.
    pub fn is_name_suppressed(&self) -> bool {
        self.key == NAME_FIELD_KEY || self.column_name().is_none()
    }
}
