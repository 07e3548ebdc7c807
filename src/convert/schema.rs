//! Resolution of a book into an immutable relational schema.
//!
//! Resolution is the first of two passes: it runs inference for every field and
//! computes every table, associative table and join binding without touching the
//! store. The second pass only reads the result.
use crate::book::Book;
use crate::book::FieldPosition;
use crate::book::JoinDef;
use crate::convert::inference::infer;
use crate::convert::inference::FieldShape;
use crate::database::join_table::JoinBinding;
use crate::database::join_table::JoinEndpoint;
use crate::database::join_table::JoinTable;
use crate::database::join_table::Side;
use crate::database::table::Table;
use crate::database::table::ID_COLUMN;
use crate::error::RustyBookError;
use std::collections::HashMap;

/// Tables, associative tables and join bindings derived from one book.
#[derive(Clone, Debug)]
pub struct Schema {
    /// Base tables, in sheet order
    pub tables: Vec<Table>,
    /// Per sheet, the shape of every field in declaration order
    pub shapes: Vec<Vec<FieldShape>>,
    /// Associative tables, in join declaration order
    pub joins: Vec<JoinTable>,
    /// Join binding of each join field that takes part in a declared join
    pub bindings: HashMap<FieldPosition, JoinBinding>,
}

impl Schema {
    /// Resolves the schema of `book`. Fails when a join endpoint does not resolve.
    pub fn resolve(book: &Book) -> Result<Self, RustyBookError> {
        let mut tables = Vec::with_capacity(book.sheets.len());
        let mut shapes = Vec::with_capacity(book.sheets.len());
        for (index, sheet) in book.sheets.iter().enumerate() {
            let sheet_shapes: Vec<FieldShape> =
                sheet.fields.iter().map(|field| infer(sheet, field)).collect();
            let columns = sheet_shapes
                .iter()
                .filter_map(|shape| match shape {
                    FieldShape::Column(column) => Some(column.to_owned()),
                    _ => None,
                })
                .collect();
            tables.push(Table {
                name: sheet.table_name(),
                sheet: index,
                columns,
            });
            shapes.push(sheet_shapes);
        }

        let mut joins = Vec::with_capacity(book.joins.len());
        let mut bindings = HashMap::new();
        for join in &book.joins {
            let join_table = resolve_join(book, &tables, join)?;
            for side in [Side::Left, Side::Right] {
                let endpoint = join_table.endpoint(side);
                bindings.insert(
                    FieldPosition {
                        sheet: endpoint.sheet,
                        field: endpoint.field,
                    },
                    join_table.binding(side),
                );
            }
            joins.push(join_table);
        }

        Ok(Schema {
            tables,
            shapes,
            joins,
            bindings,
        })
    }

    /// Lists `(table, column, type)` for every base and associative table column.
    pub fn describe(&self) -> Vec<(String, String, String)> {
        let mut columns = Vec::new();
        for table in &self.tables {
            columns.push((table.name.to_owned(), ID_COLUMN.to_owned(), "text".to_owned()));
            for column in &table.columns {
                columns.push((
                    table.name.to_owned(),
                    column.name.to_owned(),
                    column.kind.as_str().to_owned(),
                ));
            }
        }
        for join in &self.joins {
            for side in [Side::Left, Side::Right] {
                columns.push((join.name.to_owned(), side.as_str().to_owned(), "text".to_owned()));
            }
        }
        columns
    }

    pub fn binding(&self, sheet: usize, field: usize) -> Option<&JoinBinding> {
        self.bindings.get(&FieldPosition { sheet, field })
    }
}

/// Resolves both endpoints of `join` and names its associative table.
fn resolve_join(book: &Book, tables: &[Table], join: &JoinDef) -> Result<JoinTable, RustyBookError> {
    let left = book.resolve_endpoint(join, &join.left)?;
    let right = book.resolve_endpoint(join, &join.right)?;
    let left_table = tables[left.sheet].name.as_str();
    let right_table = tables[right.sheet].name.as_str();
    Ok(JoinTable::new(
        join.id.as_str(),
        endpoint(book, left, left_table, right_table),
        endpoint(book, right, right_table, left_table),
    ))
}

fn endpoint(book: &Book, position: FieldPosition, table: &str, other_table: &str) -> JoinEndpoint {
    let field = &book.sheets[position.sheet].fields[position.field];
    JoinEndpoint {
        sheet: position.sheet,
        field: position.field,
        table: table.to_owned(),
        label: field.column_name().unwrap_or_else(|| other_table.to_owned()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::book::BookError;
    use crate::database::column::ColumnType;
    use serde_json::json;

    fn book() -> Book {
        Book::parse(
            json!({
                "sheets": [
                    {"_id": "s1", "title": "People", "fields": [
                        {"key": "__name__", "name": "Name", "type": "plain"},
                        {"key": "f1", "name": "Full Name", "type": "plain"},
                        {"key": "f2", "name": "", "type": "join"},
                        {"key": "f3", "name": "Age", "type": "generic"},
                        {"key": "f4", "name": "Summary", "type": "formula"},
                    ], "records": [
                        {"_id": "p1", "f3": {"type": "numeric", "value": 31}},
                    ]},
                    {"_id": "s2", "title": "Tasks", "fields": [
                        {"key": "g1", "name": "Title", "type": "plain"},
                        {"key": "g2", "name": "Owner", "type": "join"},
                    ], "records": []},
                ],
                "joins": [
                    {"_id": "j1", "left": {"sheetId": "s1", "fieldKey": "f2"}, "right": {"sheetId": "s2", "fieldKey": "g2"}},
                ],
            })
            .to_string()
            .as_str(),
        )
        .unwrap()
    }

    #[test]
    fn resolve_tables() {
        let schema = Schema::resolve(&book()).unwrap();

        assert_eq!(schema.tables.len(), 2);
        let people = &schema.tables[0];
        assert_eq!(people.name, "people");
        let columns: Vec<(&str, ColumnType)> = people
            .columns
            .iter()
            .map(|column| (column.name.as_str(), column.kind))
            .collect();
        assert_eq!(columns, vec![("full_name", ColumnType::Text), ("age", ColumnType::Float)]);
        assert_eq!(schema.shapes[0].len(), 5);

        let tasks = &schema.tables[1];
        assert_eq!(tasks.name, "tasks");
        assert_eq!(tasks.columns.len(), 1);
    }

    #[test]
    fn resolve_joins_and_bindings() {
        let schema = Schema::resolve(&book()).unwrap();

        assert_eq!(schema.joins.len(), 1);
        assert_eq!(schema.joins[0].name, "join=people:tasks/tasks:owner");

        let left = schema.binding(0, 2).unwrap();
        assert_eq!(left.side, Side::Left);
        assert_eq!(left.other_table, "tasks");
        assert_eq!(left.label, "tasks");

        let right = schema.binding(1, 1).unwrap();
        assert_eq!(right.side, Side::Right);
        assert_eq!(right.other_table, "people");
        assert_eq!(right.label, "owner");

        assert!(schema.binding(0, 1).is_none());
    }

    #[test]
    fn resolve_is_reproducible() {
        let first = Schema::resolve(&book()).unwrap().describe();
        let second = Schema::resolve(&book()).unwrap().describe();
        assert_eq!(first, second);
        assert_eq!(first[0], ("people".to_owned(), "_id".to_owned(), "text".to_owned()));
        assert_eq!(
            first.last().unwrap(),
            &("join=people:tasks/tasks:owner".to_owned(), "right".to_owned(), "text".to_owned())
        );
    }

    #[test]
    fn resolve_unknown_endpoint() {
        let mut book = book();
        book.joins[0].right.field_key = "missing".to_owned();
        let error = Schema::resolve(&book).unwrap_err();
        assert!(
            matches!(error, RustyBookError::BookError(BookError::UnknownField { .. })),
            "{error}"
        );
    }
}
