use mongodb::error::Error as MongoError;
use thiserror::Error;

/// Result alias for the MongoDB backend.
pub type Result<T> = std::result::Result<T, MongoDaoError>;

/// Failures of the MongoDB tournament store.
#[derive(Debug, Error)]
pub enum MongoDaoError {
    /// `MONGO_URI` is not a valid connection string.
    #[error("failed to parse MongoDB connection URI `{uri}`")]
    InvalidUri {
        /// The rejected URI.
        uri: String,
        /// Parser error.
        #[source]
        source: MongoError,
    },
    /// Client options were parsed but the client could not be built.
    #[error("failed to build MongoDB client from options")]
    ClientConstruction {
        /// Driver error.
        #[source]
        source: MongoError,
    },
    /// The server never answered the startup ping.
    #[error("MongoDB ping failed during initial connection after {attempts} attempt(s)")]
    InitialPing {
        /// Pings sent before giving up.
        attempts: u32,
        /// Error of the last ping.
        #[source]
        source: MongoError,
    },
    /// A periodic health ping failed.
    #[error("MongoDB ping health check failed")]
    HealthPing {
        /// Driver error.
        #[source]
        source: MongoError,
    },
    /// An index could not be created.
    #[error("failed to ensure index `{index}` on collection `{collection}`")]
    EnsureIndex {
        /// Collection holding the index.
        collection: &'static str,
        /// Short name of the index.
        index: &'static str,
        /// Driver error.
        #[source]
        source: MongoError,
    },
    /// A document could not be written.
    #[error("failed to save {entity} `{id}`")]
    Save {
        /// Kind of record.
        entity: &'static str,
        /// Identifier of the record.
        id: String,
        /// Driver error.
        #[source]
        source: MongoError,
    },
    /// A document could not be read or decoded.
    #[error("failed to load {entity} `{id}`")]
    Load {
        /// Kind of record.
        entity: &'static str,
        /// Identifier of the record.
        id: String,
        /// Driver error.
        #[source]
        source: MongoError,
    },
    /// A document could not be removed.
    #[error("failed to delete {entity} `{id}`")]
    Delete {
        /// Kind of record.
        entity: &'static str,
        /// Identifier of the record.
        id: String,
        /// Driver error.
        #[source]
        source: MongoError,
    },
    /// A collection scan failed.
    #[error("failed to list {collection}")]
    List {
        /// Collection being scanned.
        collection: &'static str,
        /// Driver error.
        #[source]
        source: MongoError,
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
