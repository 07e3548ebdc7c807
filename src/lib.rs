//! # Rusty Book
//!
//! Converts an exported spreadsheet book (sheets, fields, records and cross-sheet
//! joins) into a DuckDB database that can be browsed with plain SQL.
//!
//! ## Features
//!
//! - **Type inference**: generic fields are typed from the subtypes their records
//!   report, falling back to text when records disagree
//! - **Explicit joins**: every declared join becomes an associative table with
//!   foreign keys into both sheets
//! - **Browsing views**: one `view:<table>` per sheet with joined ids resolved
//! - **Reproducible schema**: table, column and view names only depend on the book
//! - **Cached service flow**: reuse a built store, or fetch the book and build one
//!
//! ## Example
//!
//! ```no_run
//! use duckdb::Connection;
//! use rusty_book::{convert_book, Book};
//!
//! let book = Book::open("book.json")?;
//! let connection = Connection::open("book.db")?;
//! convert_book(&book, &connection)?;
//! # Ok::<(), rusty_book::RustyBookError>(())
//! ```
pub mod book;
pub mod convert;
pub mod database;
pub mod error;
pub(crate) mod helpers;
pub mod service;

pub use book::Book;
pub use convert::convert_book;
pub use convert::Schema;
pub use error::RustyBookError;
