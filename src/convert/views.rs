//! Browsing views: one denormalized projection per sheet.
//!
//! The inner select extends the base table with one linked `_id` per join field,
//! reached through the associative table. A record linked several times shows its
//! first recorded link, so a view has exactly the rows of its table. The outer select restores field
//! declaration order, renames the name field to `_name_` and stubs formulas.
use crate::book::Book;
use crate::book::NAME_FIELD_KEY;
use crate::convert::inference::FieldShape;
use crate::convert::schema::Schema;
use crate::database::table::Table;
use crate::database::table::ID_COLUMN;
use crate::error::ResultMessage;
use crate::error::RustyBookError;
use crate::helpers::slug::literal;
use crate::helpers::slug::quote;
use duckdb::Connection;
use tracing::debug;

/// Reserved view column carrying the record display name.
pub const NAME_COLUMN: &str = "_name_";

/// Builds the `CREATE VIEW` statement for `table`.
pub fn view_statement(book: &Book, schema: &Schema, table: &Table) -> String {
    let sheet = &book.sheets[table.sheet];
    let base = quote(table.name.as_str());
    let mut joined = vec![format!("{base}.*")];
    let mut sources = vec![base.to_owned()];
    let mut projections = vec![quote(ID_COLUMN)];
    let mut has_name = false;

    for (index, (field, shape)) in sheet.fields.iter().zip(&schema.shapes[table.sheet]).enumerate() {
        if field.key == NAME_FIELD_KEY || matches!(shape, FieldShape::Suppressed) {
            if has_name {
                debug!(view = table.view_name().as_str(), field = field.key.as_str(), "name column already projected");
                continue;
            }
            has_name = true;
            projections.push(format!("{} AS {}", name_source(table), quote(NAME_COLUMN)));
            continue;
        }
        match shape {
            FieldShape::Formula => {
                projections.push(format!("{} AS {}", literal(""), quote(field.key.as_str())));
            }
            FieldShape::Join => match schema.binding(table.sheet, index) {
                Some(binding) => {
                    let link = quote(format!("j{index}").as_str());
                    let other = quote(format!("l{index}").as_str());
                    let label = quote(binding.label.as_str());
                    let side = quote(binding.side.as_str());
                    let opposite = quote(binding.side.opposite().as_str());
                    // one row per record: the first link recorded for it
                    sources.push(format!(
                        "LEFT JOIN (SELECT {side}, arg_min({opposite}, rowid) AS {opposite} FROM {} GROUP BY {side}) AS {link} ON {link}.{side} = {base}.{}",
                        quote(binding.join_table.as_str()),
                        quote(ID_COLUMN),
                    ));
                    sources.push(format!(
                        "LEFT JOIN {} AS {other} ON {other}.{} = {link}.{opposite}",
                        quote(binding.other_table.as_str()),
                        quote(ID_COLUMN),
                    ));
                    joined.push(format!("{other}.{} AS {label}", quote(ID_COLUMN)));
                    projections.push(label);
                }
                None => {
                    // join field without a declaration: nothing to resolve
                    let label = field.column_name().unwrap_or_else(|| field.key.to_owned());
                    projections.push(format!("CAST(NULL AS text) AS {}", quote(label.as_str())));
                }
            },
            FieldShape::Column(column) => projections.push(quote(column.name.as_str())),
            FieldShape::Suppressed => (),
        }
    }

    format!(
        "CREATE VIEW {} AS SELECT {} FROM (SELECT {} FROM {}) AS {}",
        quote(table.view_name().as_str()),
        projections.join(", "),
        joined.join(", "),
        sources.join(" "),
        quote("base"),
    )
}

/// Column shown as the record display name: the first stored column, or `_id`
/// when the sheet stores none.
fn name_source(table: &Table) -> String {
    table
        .columns
        .first()
        .map(|column| quote(column.name.as_str()))
        .unwrap_or_else(|| quote(ID_COLUMN))
}

pub(crate) fn create_view(connection: &Connection, book: &Book, schema: &Schema, table: &Table) -> Result<(), RustyBookError> {
    let statement = view_statement(book, schema, table);
    debug!(sql = statement.as_str(), "creating view");
    connection
        .execute_batch(statement.as_str())
        .map_err(RustyBookError::from)
        .with_prefix(table.view_name().as_str())
}
