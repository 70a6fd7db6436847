//! Failures of the CouchDB tournament store.

use reqwest::StatusCode;
use thiserror::Error;

/// Result alias for the CouchDB backend.
pub type CouchResult<T> = Result<T, CouchDaoError>;

/// Failures of the CouchDB tournament store.
#[derive(Debug, Error)]
pub enum CouchDaoError {
    /// Only one of `COUCH_USERNAME` / `COUCH_PASSWORD` is set.
    #[error("COUCH_USERNAME and COUCH_PASSWORD must be set together")]
    IncompleteCredentials,
    /// The HTTP client could not be built.
    #[error("failed to build CouchDB client")]
    ClientBuilder {
        /// Client error.
        #[source]
        source: reqwest::Error,
    },
    /// Probing the database failed before a response arrived.
    #[error("failed to query CouchDB database `{database}`")]
    DatabaseQuery {
        /// Database name.
        database: String,
        /// Transport error.
        #[source]
        source: reqwest::Error,
    },
    /// Creating the missing database failed before a response arrived.
    #[error("failed to create CouchDB database `{database}`")]
    DatabaseCreate {
        /// Database name.
        database: String,
        /// Transport error.
        #[source]
        source: reqwest::Error,
    },
    /// CouchDB returned an unexpected status code for a database operation.
    #[error("unexpected CouchDB database response status {status} for `{database}`")]
    DatabaseStatus {
        /// Database name.
        database: String,
        /// Status CouchDB answered with.
        status: StatusCode,
    },
    /// A request to a document endpoint could not be sent.
    #[error("failed to send CouchDB request to `{path}`")]
    RequestSend {
        /// Request path below the server root.
        path: String,
        /// Transport error.
        #[source]
        source: reqwest::Error,
    },
    /// CouchDB returned an unexpected status code for a document endpoint.
    #[error("unexpected CouchDB response status {status} for `{path}`")]
    RequestStatus {
        /// Request path below the server root.
        path: String,
        /// Status CouchDB answered with.
        status: StatusCode,
    },
    /// Response payload could not be parsed into JSON.
    #[error("failed to decode CouchDB response for `{path}`")]
    DecodeResponse {
        /// Request path below the server root.
        path: String,
        /// Decoding error.
        #[source]
        source: reqwest::Error,
    },
    /// Decoding a JSON value into the expected model failed.
    #[error("failed to deserialize CouchDB value for `{path}`")]
    DeserializeValue {
        /// Request path below the server root.
        path: String,
        /// Deserialization error.
        #[source]
        source: serde_json::Error,
    },
    /// The stored match is not at the version the caller loaded.
    #[error("{entity} `{id}` was modified concurrently")]
    VersionConflict {
        /// Kind of record.
        entity: &'static str,
        /// Identifier of the record.
        id: String,
    },
}
