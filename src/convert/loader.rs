//! Record loading: converting book values into positional row parameters.

use crate::book::Record;
use crate::book::Sheet;
use crate::convert::ConvertError;
use crate::database::column::Column;
use crate::database::column::ColumnType;
use crate::database::table::Table;
use crate::error::RustyBookError;
use chrono::NaiveDate;
use duckdb::params_from_iter;
use duckdb::types::Value;
use duckdb::Connection;
use serde_json::Value as Json;
use tracing::debug;

/// Inserts every record of `sheet` into `table`, in record order.
pub(crate) fn load_table(connection: &Connection, sheet: &Sheet, table: &Table) -> Result<usize, RustyBookError> {
    let mut statement = connection.prepare(table.insert_statement().as_str())?;
    for record in &sheet.records {
        let row = row_values(sheet, table, record)?;
        statement.execute(params_from_iter(row))?;
    }
    debug!(table = table.name.as_str(), rows = sheet.records.len(), "inserted records");
    Ok(sheet.records.len())
}

/// Builds one row: `_id` first, then one value per column in column order.
pub(crate) fn row_values(sheet: &Sheet, table: &Table, record: &Record) -> Result<Vec<Value>, RustyBookError> {
    let mut row = Vec::with_capacity(table.columns.len() + 1);
    row.push(Value::Text(record.id.to_owned()));
    for column in &table.columns {
        let value = record
            .cell(column.key.as_str())
            .and_then(|cell| cell.value);
        let value = match value {
            Some(value) => to_sql_value(column, value).map_err(|message| ConvertError::InvalidValue {
                sheet: sheet.title.to_owned(),
                record: record.id.to_owned(),
                field: column.key.to_owned(),
                message,
            })?,
            None => Value::Null,
        };
        row.push(value);
    }
    Ok(row)
}

/// Converts a value payload to the representation stored in `column`.
fn to_sql_value(column: &Column, value: &Json) -> Result<Value, String> {
    match (column.kind, value) {
        (_, Json::Null) => Ok(Value::Null),
        (ColumnType::Text, value) if column.normalizes_dates() => match value {
            Json::String(date) => normalize_date(date)
                .map(Value::Text)
                .map_err(|e| format!("'{date}' is not a MM/DD/YYYY date: {e}")),
            other => Err(format!("date value must be a string, got {other}")),
        },
        (ColumnType::Text, Json::String(text)) => Ok(Value::Text(text.to_owned())),
        (ColumnType::Text, other) => Ok(Value::Text(other.to_string())),
        (ColumnType::Float, Json::Number(number)) => number
            .as_f64()
            .map(Value::Double)
            .ok_or_else(|| format!("'{number}' is not representable as a float")),
        (ColumnType::Float, Json::String(text)) => text
            .trim()
            .parse::<f64>()
            .map(Value::Double)
            .map_err(|e| format!("'{text}' is not a number: {e}")),
        (ColumnType::Boolean, Json::Bool(flag)) => Ok(Value::Boolean(*flag)),
        (ColumnType::Boolean, Json::String(text)) if text == "true" || text == "false" => {
            Ok(Value::Boolean(text == "true"))
        }
        (kind, other) => Err(format!("{other} cannot be stored in a {} column", kind.as_str())),
    }
}

/// Rewrites a `MM/DD/YYYY` date as `YYYY-MM-DD`.
pub(crate) fn normalize_date(value: &str) -> Result<String, chrono::ParseError> {
    NaiveDate::parse_from_str(value.trim(), "%m/%d/%Y").map(|date| date.format("%Y-%m-%d").to_string())
}
