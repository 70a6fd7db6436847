use std::error::Error;
use thiserror::Error;

/// Result alias for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Error raised by storage backends regardless of the underlying database.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The backend could not serve the request.
    #[error("storage unavailable: {message}")]
    Unavailable {
        /// Backend-specific description of the failure.
        message: String,
        /// Driver error behind the failure.
        #[source]
        source: Box<dyn Error + Send + Sync>,
    },
    /// The stored revision differs from the one the writer started from.
    #[error("{entity} `{id}` was modified concurrently")]
    Conflict {
        /// Kind of record, e.g. `match`.
        entity: &'static str,
        /// Identifier of the record.
        id: String,
    },
}

impl StorageError {
    /// Construct an unavailable error from any backend failure.
    pub fn unavailable(message: String, source: impl Error + Send + Sync + 'static) -> Self {
        StorageError::Unavailable {
            message,
            source: Box::new(source),
        }
    }

    /// Construct a version conflict for the given record.
    pub fn conflict(entity: &'static str, id: impl ToString) -> Self {
        StorageError::Conflict {
            entity,
            id: id.to_string(),
        }
    }
}
