mod error;
mod manager;
mod models;
mod store;

pub use error::MongoDaoError;
pub use manager::{MongoManager, connect, ensure_indexes};
pub use store::MongoTournamentStore;

use crate::dao::storage::StorageError;

impl From<MongoDaoError> for StorageError {
    fn from(err: MongoDaoError) -> Self {
        match err {
            MongoDaoError::VersionConflict { entity, id } => StorageError::conflict(entity, id),
            other => StorageError::unavailable(other.to_string(), other),
        }
    }
}
