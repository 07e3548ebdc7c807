//! # Book Service
//!
//! The glue around the converter: find a cached store for a book id, or fetch the
//! book document and build a fresh store, then decide how the store is delivered.
use crate::book::Book;
use crate::convert::convert_book;
use crate::error::ResultMessage;
use crate::error::RustyBookError;
use crate::helpers::reader::UnifiedReader;
use duckdb::Connection;
use std::fs;
use std::path::Path;
use std::path::PathBuf;
use thiserror::Error;
use tracing::info;
use tracing::warn;

/// Stores above this many bytes are offered as a download instead of the browser.
pub const DEFAULT_BROWSE_LIMIT: u64 = 150_000;

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Invalid book id '{0}'")]
    InvalidBookId(String),

    #[error("Service URL is not configured")]
    MissingServiceUrl,
}

/// Settings of the service, usually filled from the command line or environment.
#[derive(Clone, Debug)]
pub struct ServiceConfig {
    /// Directory holding `<id>.json` and `<id>.db`
    pub cache_dir: PathBuf,
    /// Base URL books are fetched from, as `<source_url>/<id>.json`
    pub source_url: String,
    /// Public base URL of this service
    pub service_url: Option<String>,
    /// Browsing tool that accepts `?url=<store url>`
    pub viewer_url: String,
    /// Largest store size, in bytes, still sent to the browsing tool
    pub browse_limit: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            cache_dir: PathBuf::from("."),
            source_url: "https://fieldbook.com/books".to_owned(),
            service_url: None,
            viewer_url: "http://fiatjaf.alhur.es/sqlite-viewer/".to_owned(),
            browse_limit: DEFAULT_BROWSE_LIMIT,
        }
    }
}

/// How a built store reaches the requester.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Delivery {
    /// Send the store file with the given response headers
    File {
        path: PathBuf,
        headers: Vec<(String, String)>,
    },
    /// Redirect to the browsing tool
    Browse { viewer_url: String },
    /// Too large for the browsing tool; point at the download instead
    TooLarge { download_url: String },
}

pub struct BookService {
    config: ServiceConfig,
}

impl BookService {
    pub fn new(config: ServiceConfig) -> Self {
        Self { config }
    }

    pub fn store_path(&self, id: &str) -> PathBuf {
        self.config.cache_dir.join(format!("{id}.db"))
    }

    pub fn document_path(&self, id: &str) -> PathBuf {
        self.config.cache_dir.join(format!("{id}.json"))
    }

    /// Returns the path of a complete store for `id`, building it when needed.
    pub fn prepare(&self, id: &str) -> Result<PathBuf, RustyBookError> {
        let id = validate_id(id)?;
        let store = self.store_path(id);
        if store.exists() {
            info!(book = id, "store cache matched");
            return Ok(store);
        }

        let document = self.document_path(id);
        if !document.exists() {
            self.fetch(id, &document)?;
        }

        info!(book = id, "building store");
        self.build(&document, &store).with_prefix(id)?;
        Ok(store)
    }

    /// Downloads the book document into the cache.
    fn fetch(&self, id: &str, document: &Path) -> Result<(), RustyBookError> {
        let url = format!("{}/{id}.json", self.config.source_url.trim_end_matches('/'));
        info!(book = id, url = url.as_str(), "downloading book");
        let bytes = UnifiedReader::new(url.as_str())
            .and_then(UnifiedReader::into_bytes)
            .with_prefix(url.as_str())?;
        fs::write(document, bytes)?;
        Ok(())
    }

    /// Builds `store` from `document` through a partial file that is renamed only
    /// when the conversion succeeds.
    pub fn build(&self, document: &Path, store: &Path) -> Result<(), RustyBookError> {
        let partial = partial_path(store);
        if partial.exists() {
            warn!(path = %partial.display(), "removing stale partial store");
            remove_store_files(&partial)?;
        }
        let book = Book::open(document.to_string_lossy().as_ref())?;
        let result = Connection::open(&partial)
            .map_err(RustyBookError::from)
            .and_then(|connection| {
                convert_book(&book, &connection)?;
                connection.close().map_err(|(_, e)| e)?;
                Ok(())
            });
        match result {
            Ok(()) => {
                fs::rename(&partial, store)?;
                Ok(())
            }
            Err(e) => {
                if let Err(cleanup) = remove_store_files(&partial) {
                    warn!(path = %partial.display(), error = %cleanup, "failed to remove partial store");
                }
                Err(e)
            }
        }
    }

    /// Decides how the store of `id` is delivered. `wants_file` is set when the
    /// requester asked for the `.db` file itself.
    pub fn delivery(&self, id: &str, wants_file: bool) -> Result<Delivery, RustyBookError> {
        let id = validate_id(id)?;
        let store = self.store_path(id);
        if wants_file {
            return Ok(Delivery::File {
                path: store,
                headers: vec![("Access-Control-Allow-Origin".to_owned(), "*".to_owned())],
            });
        }
        let service_url = self
            .config
            .service_url
            .as_deref()
            .ok_or(ServiceError::MissingServiceUrl)?
            .trim_end_matches('/');
        let download_url = format!("{service_url}/book/{id}.db");
        let size = fs::metadata(&store)?.len();
        if size > self.config.browse_limit {
            Ok(Delivery::TooLarge { download_url })
        } else {
            let mut viewer = url::Url::parse(self.config.viewer_url.as_str())?;
            viewer.query_pairs_mut().append_pair("url", download_url.as_str());
            Ok(Delivery::Browse {
                viewer_url: viewer.to_string(),
            })
        }
    }
}

/// Sibling of `store` a build writes into before it is complete.
fn partial_path(store: &Path) -> PathBuf {
    store.with_extension("db.partial")
}

/// Book ids become file names, so only plain identifiers are accepted.
fn validate_id(id: &str) -> Result<&str, ServiceError> {
    let id = id.strip_suffix(".db").unwrap_or(id);
    if !id.is_empty() && id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_') {
        Ok(id)
    } else {
        Err(ServiceError::InvalidBookId(id.to_owned()))
    }
}

/// Removes a store file and the write-ahead log DuckDB may leave next to it.
fn remove_store_files(path: &Path) -> std::io::Result<()> {
    let wal = PathBuf::from(format!("{}.wal", path.display()));
    if wal.exists() {
        fs::remove_file(wal)?;
    }
    if path.exists() {
        fs::remove_file(path)?;
    }
    Ok(())
}
