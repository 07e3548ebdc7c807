//! # Book Conversion Pipeline
//!
//! Materializes a parsed [`Book`] into a DuckDB store: one base table per sheet,
//! one associative table per join, and one browsing view per sheet.
//!
//! The run is strictly ordered because later statements reference earlier tables:
//!
//! 1. resolve the schema (pure, see [`schema::Schema::resolve`])
//! 2. per sheet: `CREATE TABLE`, then insert its records
//! 3. per join: `CREATE TABLE` with foreign keys, then insert its links
//! 4. per sheet: `CREATE VIEW`
//!
//! The first failing statement aborts the run. Nothing is rolled back, so the
//! caller must treat the store of a failed run as invalid.
use crate::book::Book;
use crate::error::ResultMessage;
use crate::error::RustyBookError;
use duckdb::Connection;
use thiserror::Error;
use tracing::debug;
use tracing::info;

pub mod inference;
pub(crate) mod joins;
pub(crate) mod loader;
pub mod schema;
pub mod views;

pub use schema::Schema;

/// Errors raised while converting record values.
#[derive(Error, Debug)]
pub enum ConvertError {
    /// A record value that cannot be stored in its column
    #[error("Invalid value in sheet '{sheet}', record '{record}', field '{field}': {message}")]
    InvalidValue {
        sheet: String,
        record: String,
        field: String,
        message: String,
    },
}

/// Converts `book` into the store behind `connection` and returns the resolved schema.
///
/// The connection must point at an empty database.
pub fn convert_book(book: &Book, connection: &Connection) -> Result<Schema, RustyBookError> {
    book.validate()?;
    let schema = Schema::resolve(book)?;

    info!(sheets = schema.tables.len(), "creating tables");
    for table in &schema.tables {
        let sheet = &book.sheets[table.sheet];
        let statement = table.create_statement();
        debug!(sql = statement.as_str(), "creating table");
        connection
            .execute_batch(statement.as_str())
            .map_err(RustyBookError::from)
            .with_prefix(table.name.as_str())?;
        loader::load_table(connection, sheet, table).with_prefix(table.name.as_str())?;
    }

    info!(joins = schema.joins.len(), "creating join tables");
    for join in &schema.joins {
        joins::materialize_join(connection, book, join)?;
    }

    info!(views = schema.tables.len(), "creating views");
    for table in &schema.tables {
        views::create_view(connection, book, &schema, table)?;
    }
    Ok(schema)
}
