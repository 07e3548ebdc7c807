use crate::book::Book;
use crate::database::join_table::JoinTable;
use crate::error::ResultMessage;
use crate::error::RustyBookError;
use duckdb::params;
use duckdb::Connection;
use tracing::debug;

/// Creates the associative table of `join` and inserts its realized links in
/// side-effects order. A join without recorded links yields an empty table.
pub(crate) fn materialize_join(connection: &Connection, book: &Book, join: &JoinTable) -> Result<usize, RustyBookError> {
    let statement = join.create_statement();
    debug!(sql = statement.as_str(), "creating join table");
    connection
        .execute_batch(statement.as_str())
        .map_err(RustyBookError::from)
        .with_prefix(join.name.as_str())?;

    let symrefs = book.symrefs(join.id.as_str());
    let mut insert = connection.prepare(join.insert_statement().as_str())?;
    for symref in symrefs {
        insert
            .execute(params![symref.left.id, symref.right.id])
            .map_err(RustyBookError::from)
            .with_prefix(join.name.as_str())?;
    }
    debug!(table = join.name.as_str(), rows = symrefs.len(), "inserted join references");
    Ok(symrefs.len())
}
