//! Type inference: decides, per field, whether it becomes a column and of which type.
use crate::book::Field;
use crate::book::FieldType;
use crate::book::Sheet;
use crate::book::ValueType;
use crate::database::column::Column;
use crate::database::column::ColumnType;
use crate::database::column::Observation;
use tracing::debug;
use tracing::warn;

/// How a field is represented in the base table.
#[derive(Clone, Debug)]
pub enum FieldShape {
    /// An ordinary column
    Column(Column),
    /// Stored in an associative table, resolved by the view
    Join,
    /// Never stored; projected as an empty literal by the view
    Formula,
    /// No column of its own; surfaced as the view's `_name_`
    Suppressed,
}

/// Infers the shape of `field`, scanning the sheet's records for generic fields.
pub fn infer(sheet: &Sheet, field: &Field) -> FieldShape {
    match &field.kind {
        FieldType::Formula => return FieldShape::Formula,
        FieldType::Join => return FieldShape::Join,
        _ => (),
    }
    let name = match field.column_name() {
        Some(name) if !field.is_name_suppressed() => name,
        _ => {
            let records = populated(sheet, field);
            if records > 0 {
                debug!(
                    sheet = sheet.title.as_str(),
                    field = field.key.as_str(),
                    records,
                    "name field values are not stored, the view shows the first column instead"
                );
            }
            return FieldShape::Suppressed;
        }
    };
    let column = match &field.kind {
        FieldType::Plain | FieldType::Enum => Column::new(&field.key, &name, ColumnType::Text),
        FieldType::Generic => {
            let observation = observe(sheet, field);
            debug!(
                sheet = sheet.title.as_str(),
                field = field.key.as_str(),
                actual = ?observation.actual,
                conflicting = observation.conflicting,
                "inferred generic field"
            );
            let mut column = Column::new(&field.key, &name, observation.column_type());
            column.observation = observation;
            column
        }
        other => {
            warn!(
                sheet = sheet.title.as_str(),
                field = field.key.as_str(),
                kind = %other,
                "field with an unrecognized type, storing as text"
            );
            Column::new(&field.key, &name, ColumnType::Text)
        }
    };
    FieldShape::Column(column)
}

/// Collects the subtypes every record reports for `field`.
fn observe(sheet: &Sheet, field: &Field) -> Observation {
    Observation::detect(
        sheet
            .records
            .iter()
            .filter_map(|record| record.cell(field.key.as_str()))
            .filter_map(|cell| cell.value_type())
            .inspect(|kind| {
                if let ValueType::Other(subtype) = kind {
                    warn!(
                        sheet = sheet.title.as_str(),
                        field = field.key.as_str(),
                        subtype = subtype.as_str(),
                        "record value with an unrecognized subtype, storing as text"
                    );
                }
            }),
    )
}

/// Counts the records carrying a value for `field`.
fn populated(sheet: &Sheet, field: &Field) -> usize {
    sheet
        .records
        .iter()
        .filter_map(|record| record.cell(field.key.as_str()))
        .filter(|cell| cell.value.is_some())
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::book::NAME_FIELD_KEY;
    use serde_json::json;

    fn sheet(kinds: &[Option<&str>]) -> Sheet {
        let fields = serde_json::from_value(json!([
            {"key": "f1", "name": "Amount", "type": "generic"},
        ]))
        .unwrap();
        let records = kinds
            .iter()
            .enumerate()
            .map(|(index, kind)| {
                let cell = match kind {
                    Some(kind) => json!({"type": kind, "value": "x"}),
                    None => json!(null),
                };
                serde_json::from_value(json!({"_id": format!("r{index}"), "f1": cell})).unwrap()
            })
            .collect();
        Sheet::new("s1", "Sheet", fields, records)
    }

    fn column(shape: FieldShape) -> Column {
        match shape {
            FieldShape::Column(column) => column,
            other => panic!("expected a column, got {other:?}"),
        }
    }

    fn shape_of(kind: &str, name: &str, key: &str) -> FieldShape {
        let field: Field =
            serde_json::from_value(json!({"key": key, "name": name, "type": kind})).unwrap();
        infer(&Sheet::new("s1", "Sheet", vec![field.clone()], Vec::new()), &field)
    }

    #[test]
    fn declared_types() {
        let column = column(shape_of("plain", "Title", "f1"));
        assert_eq!(column.kind, ColumnType::Text);
        assert_eq!(column.name, "title");
        assert_eq!(column.key, "f1");

        assert_eq!(column_kind(shape_of("enum", "Status", "f1")), ColumnType::Text);
        assert!(matches!(shape_of("formula", "Total", "f1"), FieldShape::Formula));
        assert!(matches!(shape_of("join", "", "f1"), FieldShape::Join));
        assert!(matches!(shape_of("plain", "Name", "__name__"), FieldShape::Suppressed));
        assert!(matches!(shape_of("plain", "", "f1"), FieldShape::Suppressed));
    }

    fn column_kind(shape: FieldShape) -> ColumnType {
        column(shape).kind
    }

    #[test]
    fn unknown_type_defaults_to_text() {
        assert_eq!(column_kind(shape_of("rollup", "Rolled", "f1")), ColumnType::Text);
    }

    #[test]
    fn generic_agreeing() {
        let sheet = sheet(&[Some("numeric"), None, Some("numeric")]);
        let column = column(infer(&sheet, &sheet.fields[0]));
        assert_eq!(column.kind, ColumnType::Float);
        assert_eq!(column.observation.actual, Some(ValueType::Numeric));

        let sheet = sheet_with(&["boolean", "boolean"]);
        assert_eq!(column_kind(infer(&sheet, &sheet.fields[0])), ColumnType::Boolean);
    }

    fn sheet_with(kinds: &[&str]) -> Sheet {
        sheet(&kinds.iter().map(|kind| Some(*kind)).collect::<Vec<_>>())
    }

    #[test]
    fn generic_conflicting() {
        let sheet = sheet_with(&["numeric", "string", "numeric"]);
        let column = column(infer(&sheet, &sheet.fields[0]));
        assert_eq!(column.kind, ColumnType::Text);
        assert!(column.observation.conflicting);
        assert_eq!(column.observation.actual, Some(ValueType::Numeric));
    }

    #[test]
    fn generic_dates() {
        let sheet = sheet_with(&["date", "date"]);
        let column = column(infer(&sheet, &sheet.fields[0]));
        assert_eq!(column.kind, ColumnType::Text);
        assert!(column.normalizes_dates());
    }

    #[test]
    fn generic_without_observations() {
        let sheet = sheet(&[None, None]);
        assert_eq!(column_kind(infer(&sheet, &sheet.fields[0])), ColumnType::Text);
    }

    #[test]
    fn generic_unknown_subtype() {
        let sheet = sheet_with(&["hologram", "hologram"]);
        let column = column(infer(&sheet, &sheet.fields[0]));
        assert_eq!(column.kind, ColumnType::Text);
        assert_eq!(column.observation.actual, Some(ValueType::Other("hologram".to_owned())));
        assert!(!column.normalizes_dates());
    }

    #[test]
    fn suppressed_field_values_are_counted() {
        let mut renamed = sheet_with(&["string", "string"]);
        renamed.fields[0].key = NAME_FIELD_KEY.to_owned();
        assert_eq!(populated(&renamed, &renamed.fields[0]), 0);

        let partial = sheet(&[Some("string"), None, Some("string")]);
        assert_eq!(populated(&partial, &partial.fields[0]), 2);
        let mut field = partial.fields[0].clone();
        field.name = String::new();
        assert!(matches!(infer(&partial, &field), FieldShape::Suppressed));
    }
}
