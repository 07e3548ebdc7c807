use crate::database::table::ID_COLUMN;
use crate::helpers::slug::quote;
use std::fmt::Display;

/// Side of an associative table.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    /// Column of the associative table holding this side's record ids.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Side::Left => "left",
            Side::Right => "right",
        }
    }

    pub const fn opposite(&self) -> Side {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }
}

impl Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One side of a join: the base table it points into and its column label.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct JoinEndpoint {
    /// Position of the endpoint sheet in the book
    pub sheet: usize,
    /// Position of the join field on that sheet
    pub field: usize,
    /// Base table of the endpoint sheet
    pub table: String,
    /// Slug of the field name, or the opposite table name when the field has none
    pub label: String,
}

/// Synthetic table holding the realized record pairs of one join.
#[derive(Clone, Debug)]
pub struct JoinTable {
    /// Identifier of the join declaration
    pub id: String,
    pub name: String,
    pub left: JoinEndpoint,
    pub right: JoinEndpoint,
}

/// What the view of a sheet needs to resolve one of its join fields.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct JoinBinding {
    /// Associative table representing the relation
    pub join_table: String,
    /// Side of the associative table that holds this sheet's ids
    pub side: Side,
    /// Base table on the opposite side
    pub other_table: String,
    /// Column label the view projects the linked id under
    pub label: String,
}

impl JoinTable {
    pub fn new(id: &str, left: JoinEndpoint, right: JoinEndpoint) -> Self {
        let name = format!(
            "join={}:{}/{}:{}",
            left.table, left.label, right.table, right.label
        );
        Self {
            id: id.to_owned(),
            name,
            left,
            right,
        }
    }

    pub fn endpoint(&self, side: Side) -> &JoinEndpoint {
        match side {
            Side::Left => &self.left,
            Side::Right => &self.right,
        }
    }

    /// Binding recorded on the field at `side`.
    pub fn binding(&self, side: Side) -> JoinBinding {
        JoinBinding {
            join_table: self.name.to_owned(),
            side,
            other_table: self.endpoint(side.opposite()).table.to_owned(),
            label: self.endpoint(side).label.to_owned(),
        }
    }

    /// `CREATE TABLE` statement with a foreign key into each endpoint table.
    pub fn create_statement(&self) -> String {
        format!(
            "CREATE TABLE {name} ({left} text REFERENCES {left_table}({id}), {right} text REFERENCES {right_table}({id}))",
            name = quote(self.name.as_str()),
            left = quote(Side::Left.as_str()),
            right = quote(Side::Right.as_str()),
            left_table = quote(self.left.table.as_str()),
            right_table = quote(self.right.table.as_str()),
            id = quote(ID_COLUMN),
        )
    }

    pub fn insert_statement(&self) -> String {
        format!("INSERT INTO {} VALUES (?, ?)", quote(self.name.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn endpoint(sheet: usize, table: &str, label: &str) -> JoinEndpoint {
        JoinEndpoint {
            sheet,
            field: 0,
            table: table.to_owned(),
            label: label.to_owned(),
        }
    }

    #[test]
    fn join_table_statements() {
        let join = JoinTable::new("j1", endpoint(0, "people", "tasks"), endpoint(1, "tasks", "owner"));

        assert_eq!(join.name, "join=people:tasks/tasks:owner");
        assert_eq!(
            join.create_statement(),
            r#"CREATE TABLE "join=people:tasks/tasks:owner" ("left" text REFERENCES "people"("_id"), "right" text REFERENCES "tasks"("_id"))"#
        );
        assert_eq!(join.insert_statement(), r#"INSERT INTO "join=people:tasks/tasks:owner" VALUES (?, ?)"#);
    }

    #[test]
    fn join_bindings() {
        let join = JoinTable::new("j1", endpoint(0, "people", "tasks"), endpoint(1, "tasks", "owner"));

        let binding = join.binding(Side::Right);
        assert_eq!(binding.join_table, "join=people:tasks/tasks:owner");
        assert_eq!(binding.side, Side::Right);
        assert_eq!(binding.other_table, "people");
        assert_eq!(binding.label, "owner");

        assert_eq!(join.binding(Side::Left).other_table, "tasks");
        assert_eq!(Side::Left.opposite(), Side::Right);
    }
}
