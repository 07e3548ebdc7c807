use thiserror::Error;

/// Main error type for the Rusty Book converter.
/// Aggregates errors from various sources including standard library, dependencies, and internal modules.
#[derive(Error, Debug)]
pub enum RustyBookError {
    #[error("{0}")]
    WithContextError(String),

    // Standard library errors
    #[error("{0}")]
    IoError(#[from] std::io::Error),

    // Third-party library errors
    #[error("{0}")]
    DuckDBError(#[from] duckdb::Error),

    #[error("{0}")]
    JsonError(#[from] serde_json::Error),

    #[error("{0}")]
    UrlError(#[from] url::ParseError),

    // Helper module errors
    #[error("{0}")]
    UnifiedReaderError(#[from] crate::helpers::reader::UnifiedReaderError),

    // Book module errors
    #[error("{0}")]
    BookError(#[from] crate::book::BookError),

    // Conversion module errors
    #[error("{0}")]
    ConvertError(#[from] crate::convert::ConvertError),

    // Service module errors
    #[error("{0}")]
    ServiceError(#[from] crate::service::ServiceError),
}

pub trait ResultMessage {
    fn with_prefix(self, message: &str) -> Self;
}

impl<T> ResultMessage for Result<T, RustyBookError> {
    fn with_prefix(self, message: &str) -> Self {
        self.map_err(|e| RustyBookError::WithContextError(format!("{}: {}", message, e)))
    }
}
