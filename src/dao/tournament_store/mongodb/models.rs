use mongodb::bson::{Document, doc};
use serde::{Deserialize, Serialize};

/// Entity stored under a string `_id` so every collection shares one key scheme.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoDocument<T> {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(flatten)]
    pub body: T,
}

impl<T> MongoDocument<T> {
    pub fn new(id: impl ToString, body: T) -> Self {
        Self {
            id: id.to_string(),
            body,
        }
    }
}

pub fn doc_id(id: impl ToString) -> Document {
    doc! { "_id": id.to_string() }
}

/// Filter matching a match document only while it is still at `version`.
pub fn versioned_doc_id(id: impl ToString, version: u64) -> Document {
    // versions stay far below i64::MAX
    doc! { "_id": id.to_string(), "version": version as i64 }
}
