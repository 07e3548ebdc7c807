use crate::error::RustyBookError;
use std::fs::File;
use std::io::BufReader;
use std::io::Cursor;
use std::io::Read;
use thiserror::Error;
use tracing::debug;
use url::Url;

#[derive(Error, Debug)]
pub enum UnifiedReaderError {
    #[error("No data from remote file: '{0}'")]
    RemoteFileNoDataError(String),
}

/// A reader over a book document that is either a local file or a remote URL
pub(crate) enum UnifiedReader {
    /// Local file reader
    Local(BufReader<File>),
    /// Remote URL reader (in-memory buffer)
    Remote(Cursor<Vec<u8>>),
}

impl UnifiedReader {
    /// Opens a document from either a local path or remote URL.
    /// Remote URLs are downloaded eagerly through DuckDB's `read_blob`.
    pub(crate) fn new(location: &str) -> Result<UnifiedReader, RustyBookError> {
        if Self::is_remote_url(location) {
            Self::read_blob_with_duckdb(location)
        } else {
            let file = File::open(location)?;
            Ok(UnifiedReader::Local(BufReader::new(file)))
        }
    }

    /// Checks if a location names a remote URL rather than a local path
    pub(crate) fn is_remote_url(location: &str) -> bool {
        if let Ok(url) = Url::parse(location) {
            matches!(url.scheme(), "http" | "https" | "s3" | "gs")
        } else {
            false
        }
    }

    /// Reads a remote file with an in-memory DuckDB connection.
    /// DuckDB resolves the protocol and any configured credentials.
    fn read_blob_with_duckdb(location: &str) -> Result<UnifiedReader, RustyBookError> {
        debug!(location, "downloading remote document");
        let connection = duckdb::Connection::open_in_memory()?;
        let result: Result<Vec<u8>, _> =
            connection.query_row("SELECT content FROM read_blob(?)", [location], |row| row.get(0));
        connection.close().map_err(|(_, e)| e)?;

        let bytes = result?;
        if bytes.is_empty() {
            Err(UnifiedReaderError::RemoteFileNoDataError(location.to_owned()))?;
        }
        Ok(UnifiedReader::Remote(Cursor::new(bytes)))
    }

    /// Drains the reader into memory.
    pub(crate) fn into_bytes(self) -> Result<Vec<u8>, RustyBookError> {
        match self {
            UnifiedReader::Local(mut reader) => {
                let mut bytes = Vec::new();
                reader.read_to_end(&mut bytes)?;
                Ok(bytes)
            }
            UnifiedReader::Remote(cursor) => Ok(cursor.into_inner()),
        }
    }
}
