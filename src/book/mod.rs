//! # Book Document Model
//!
//! Typed representation of an exported book: sheets with their fields and records,
//! the join declarations between sheets, and the side-effects section recording
//! which records are actually linked. A book is parsed once per conversion and is
//! read-only afterwards; derived metadata lives in the resolved schema instead.
use crate::error::ResultMessage;
use crate::error::RustyBookError;
use crate::helpers::reader::UnifiedReader;
use serde::Deserialize;
use std::collections::HashMap;
use thiserror::Error;

pub mod field;
pub mod join;
pub mod record;
pub mod sheet;

pub use field::{Field, FieldType, NAME_FIELD_KEY};
pub use join::{JoinDef, JoinRef, JoinSpec, SideEffects};
pub use record::{Cell, Record, ValueType};
pub use sheet::Sheet;

/// Structural problems found in a parsed book.
#[derive(Error, Debug)]
pub enum BookError {
    #[error("Join '{join}' references unknown sheet '{sheet}'")]
    UnknownSheet { join: String, sheet: String },

    #[error("Join '{join}' references unknown field '{field}' on sheet '{sheet}'")]
    UnknownField {
        join: String,
        sheet: String,
        field: String,
    },

    #[error("Join reference names undeclared join '{join}'")]
    UnknownJoin { join: String },

    #[error("Join reference '{reference}' is filed under join '{expected}' but names join '{actual}'")]
    MismatchedJoin {
        reference: String,
        expected: String,
        actual: String,
    },
}

/// Locale hints attached to the book.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct LocaleSet {
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub number: Option<String>,
}

/// The full exported structure being converted.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct Book {
    #[serde(default)]
    pub sheets: Vec<Sheet>,
    #[serde(default)]
    pub joins: Vec<JoinDef>,
    #[serde(rename = "sideEffects", default)]
    pub side_effects: SideEffects,
    #[serde(rename = "localeSet", default)]
    pub locale_set: LocaleSet,
    /// Sheet id to position in `sheets`
    #[serde(skip)]
    sheet_index: HashMap<String, usize>,
}

/// Resolved position of a join endpoint: sheet index and field index.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct FieldPosition {
    pub sheet: usize,
    pub field: usize,
}

impl Book {
    /// Parses a book from its JSON text.
    pub fn parse(text: &str) -> Result<Self, RustyBookError> {
        let mut book: Book = serde_json::from_str(text)?;
        book.index();
        Ok(book)
    }

    /// Parses a book from raw JSON bytes.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, RustyBookError> {
        let mut book: Book = serde_json::from_slice(bytes)?;
        book.index();
        Ok(book)
    }

    /// Reads and parses a book from a local path or a remote URL.
    pub fn open(location: &str) -> Result<Self, RustyBookError> {
        UnifiedReader::new(location)
            .and_then(UnifiedReader::into_bytes)
            .and_then(|bytes| Self::from_slice(&bytes))
            .with_prefix(location)
    }

    /// Builds the sheet and field lookups.
    fn index(&mut self) {
        for sheet in &mut self.sheets {
            sheet.index();
        }
        self.sheet_index = self
            .sheets
            .iter()
            .enumerate()
            .map(|(index, sheet)| (sheet.id.to_owned(), index))
            .collect();
    }

    pub fn sheet_position(&self, id: &str) -> Option<usize> {
        self.sheet_index.get(id).copied()
    }

    pub fn sheet(&self, id: &str) -> Option<&Sheet> {
        self.sheet_position(id).map(|index| &self.sheets[index])
    }

    /// Resolves one endpoint of `join` to the sheet and field it names.
    pub fn resolve_endpoint(&self, join: &JoinDef, spec: &JoinSpec) -> Result<FieldPosition, BookError> {
        let sheet = self
            .sheet_position(spec.sheet_id.as_str())
            .ok_or_else(|| BookError::UnknownSheet {
                join: join.id.to_owned(),
                sheet: spec.sheet_id.to_owned(),
            })?;
        let field = self.sheets[sheet]
            .field_position(spec.field_key.as_str())
            .ok_or_else(|| BookError::UnknownField {
                join: join.id.to_owned(),
                sheet: spec.sheet_id.to_owned(),
                field: spec.field_key.to_owned(),
            })?;
        Ok(FieldPosition { sheet, field })
    }

    /// Realized links recorded for `join_id`; empty when the book has none.
    pub fn symrefs(&self, join_id: &str) -> &[JoinRef] {
        self.side_effects
            .set
            .join
            .get(join_id)
            .map(|effects| effects.symrefs.as_slice())
            .unwrap_or(&[])
    }

    /// Checks every cross reference of the book: join endpoints must resolve and
    /// every realized link must belong to a declared join.
    pub fn validate(&self) -> Result<(), BookError> {
        for join in &self.joins {
            self.resolve_endpoint(join, &join.left)?;
            self.resolve_endpoint(join, &join.right)?;
        }
        for (join_id, effects) in &self.side_effects.set.join {
            if !self.joins.iter().any(|join| &join.id == join_id) {
                return Err(BookError::UnknownJoin { join: join_id.to_owned() });
            }
            for symref in &effects.symrefs {
                match &symref.join_id {
                    Some(actual) if actual != join_id => {
                        return Err(BookError::MismatchedJoin {
                            reference: symref.id.to_owned().unwrap_or_default(),
                            expected: join_id.to_owned(),
                            actual: actual.to_owned(),
                        })
                    }
                    _ => (),
                }
            }
        }
        Ok(())
    }
}
