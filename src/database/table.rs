use crate::database::column::Column;
use crate::helpers::slug::quote;

/// Name of the primary key column every base table carries.
pub const ID_COLUMN: &str = "_id";

/// A base table derived from one sheet.
#[derive(Clone, Debug)]
pub struct Table {
    /// Table name (slug of the sheet title)
    pub name: String,
    /// Position of the source sheet in the book
    pub sheet: usize,
    /// Column definitions in field declaration order, `_id` excluded
    pub columns: Vec<Column>,
}

impl Table {
    /// Name of the browsing view built over this table.
    pub fn view_name(&self) -> String {
        format!("view:{}", self.name)
    }

    /// `CREATE TABLE` statement with `_id` as the primary key.
    pub fn create_statement(&self) -> String {
        let mut definitions = vec![format!("{} text primary key", quote(ID_COLUMN))];
        definitions.extend(
            self.columns
                .iter()
                .map(|column| format!("{} {}", quote(column.name.as_str()), column.kind.as_str())),
        );
        format!("CREATE TABLE {} ({})", quote(self.name.as_str()), definitions.join(", "))
    }

    /// Positional `INSERT` statement matching [`Table::create_statement`].
    pub fn insert_statement(&self) -> String {
        let placeholders = vec!["?"; self.columns.len() + 1];
        format!("INSERT INTO {} VALUES ({})", quote(self.name.as_str()), placeholders.join(", "))
    }

    pub fn column(&self, key: &str) -> Option<&Column> {
        self.columns.iter().find(|column| column.key == key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::column::ColumnType;

    fn table() -> Table {
        Table {
            name: "tasks".to_owned(),
            sheet: 0,
            columns: vec![
                Column::new("f1", "title", ColumnType::Text),
                Column::new("f2", "estimate", ColumnType::Float),
                Column::new("f3", "done", ColumnType::Boolean),
            ],
        }
    }

    #[test]
    fn create_statement() {
        assert_eq!(
            table().create_statement(),
            r#"CREATE TABLE "tasks" ("_id" text primary key, "title" text, "estimate" float, "done" boolean)"#
        );
    }

    #[test]
    fn insert_statement() {
        assert_eq!(table().insert_statement(), r#"INSERT INTO "tasks" VALUES (?, ?, ?, ?)"#);
    }

    #[test]
    fn names() {
        let table = table();
        assert_eq!(table.view_name(), "view:tasks");
        assert_eq!(table.column("f2").map(|column| column.name.as_str()), Some("estimate"));
        assert!(table.column("f9").is_none());
    }
}
