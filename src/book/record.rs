use serde::Deserialize;
use serde_json::Map;
use serde_json::Value;
use std::fmt::Display;

/// Concrete subtype a record reports for a value of a generic field.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ValueType {
    String,
    Numeric,
    Boolean,
    Currency,
    Percent,
    Image,
    Date,
    File,
    Email,
    DayOfYear,
    /// A subtype this converter does not know about
    Other(String),
}

impl ValueType {
    pub fn parse(name: &str) -> Self {
        match name {
            "string" => ValueType::String,
            "numeric" => ValueType::Numeric,
            "boolean" => ValueType::Boolean,
            "currency" => ValueType::Currency,
            "percent" => ValueType::Percent,
            "image" => ValueType::Image,
            "date" => ValueType::Date,
            "file" => ValueType::File,
            "email" => ValueType::Email,
            "dayofyear" | "day-of-year" => ValueType::DayOfYear,
            _ => ValueType::Other(name.to_owned()),
        }
    }
}

impl Display for ValueType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ValueType::String => "string",
            ValueType::Numeric => "numeric",
            ValueType::Boolean => "boolean",
            ValueType::Currency => "currency",
            ValueType::Percent => "percent",
            ValueType::Image => "image",
            ValueType::Date => "date",
            ValueType::File => "file",
            ValueType::Email => "email",
            ValueType::DayOfYear => "dayofyear",
            ValueType::Other(name) => name.as_str(),
        };
        f.write_str(name)
    }
}

/// A present `{type, value}` entry of a record.
#[derive(Copy, Clone, Debug)]
pub struct Cell<'a> {
    /// Subtype declared by the record, if any
    pub kind: Option<&'a str>,
    /// Scalar payload, if any
    pub value: Option<&'a Value>,
}

impl Cell<'_> {
    pub fn value_type(&self) -> Option<ValueType> {
        self.kind.map(ValueType::parse)
    }
}

/// One row's worth of keyed values within a sheet.
#[derive(Clone, Debug, Deserialize)]
pub struct Record {
    /// Record identifier, primary key of the sheet's table
    #[serde(rename = "_id")]
    pub id: String,
    /// Field key to value descriptor
    #[serde(flatten)]
    pub values: Map<String, Value>,
}

impl Record {
    /// Looks up the value descriptor for `key`.
    /// Absent entries, `null` and anything that is not an object yield `None`.
    pub fn cell(&self, key: &str) -> Option<Cell<'_>> {
        let descriptor = self.values.get(key)?.as_object()?;
        Some(Cell {
            kind: descriptor.get("type").and_then(Value::as_str),
            value: descriptor.get("value").filter(|value| !value.is_null()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parse_value_types() {
        assert_eq!(ValueType::parse("numeric"), ValueType::Numeric);
        assert_eq!(ValueType::parse("dayofyear"), ValueType::DayOfYear);
        assert_eq!(ValueType::parse("day-of-year"), ValueType::DayOfYear);
        assert_eq!(ValueType::parse("rating"), ValueType::Other("rating".to_owned()));
        assert_eq!(ValueType::DayOfYear.to_string(), "dayofyear");
    }

    #[test]
    fn record_cells() {
        let record: Record = serde_json::from_value(json!({
            "_id": "r1",
            "f1": {"type": "numeric", "value": 12.5},
            "f2": null,
            "f3": "bare",
            "f4": {"type": "string"},
            "f5": {"type": "string", "value": null},
        }))
        .unwrap();

        assert_eq!(record.id, "r1");
        assert!(!record.values.contains_key("_id"));

        let cell = record.cell("f1").unwrap();
        assert_eq!(cell.value_type(), Some(ValueType::Numeric));
        assert_eq!(cell.value, Some(&json!(12.5)));

        assert!(record.cell("f2").is_none());
        assert!(record.cell("f3").is_none());
        assert!(record.cell("missing").is_none());
        assert!(record.cell("f4").unwrap().value.is_none());
        assert!(record.cell("f5").unwrap().value.is_none());
    }
}
