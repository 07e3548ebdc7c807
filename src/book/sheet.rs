use crate::book::field::Field;
use crate::book::record::Record;
use crate::helpers::slug::slugify;
use serde::Deserialize;
use std::collections::HashMap;

/// One table-like collection of records with a shared field schema.
#[derive(Clone, Debug, Deserialize)]
pub struct Sheet {
    /// Sheet identifier, referenced by joins
    #[serde(rename = "_id")]
    pub id: String,
    /// Human name, source of the table name
    pub title: String,
    /// How the sheet picks its record display name
    #[serde(rename = "nameFieldMode", default)]
    pub name_field_mode: Option<String>,
    #[serde(default)]
    pub fields: Vec<Field>,
    #[serde(default)]
    pub records: Vec<Record>,
    /// Field key to position in `fields`
    #[serde(skip)]
    field_index: HashMap<String, usize>,
}

impl Sheet {
    pub fn new(id: &str, title: &str, fields: Vec<Field>, records: Vec<Record>) -> Self {
        let mut sheet = Self {
            id: id.to_owned(),
            title: title.to_owned(),
            name_field_mode: None,
            fields,
            records,
            field_index: HashMap::new(),
        };
        sheet.index();
        sheet
    }

    /// Rebuilds the field lookup. Called once after deserialization.
    pub(crate) fn index(&mut self) {
        self.field_index = self
            .fields
            .iter()
            .enumerate()
            .map(|(index, field)| (field.key.to_owned(), index))
            .collect();
    }

    /// Table name derived from the title.
    pub fn table_name(&self) -> String {
        slugify(self.title.as_str())
    }

    /// Position of the field with `key`.
    pub fn field_position(&self, key: &str) -> Option<usize> {
        self.field_index.get(key).copied()
    }

    pub fn field(&self, key: &str) -> Option<&Field> {
        self.field_position(key).map(|index| &self.fields[index])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn sheet_lookup() {
        let fields = serde_json::from_value(json!([
            {"key": "f1", "name": "Name", "type": "plain"},
            {"key": "f2", "name": "Owner", "type": "join"},
        ]))
        .unwrap();
        let sheet = Sheet::new("s1", "Project Tasks!", fields, Vec::new());

        assert_eq!(sheet.table_name(), "project_tasks");
        assert_eq!(sheet.field_position("f2"), Some(1));
        assert_eq!(sheet.field("f1").map(|field| field.name.as_str()), Some("Name"));
        assert!(sheet.field("f3").is_none());
    }
}
