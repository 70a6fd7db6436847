use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

pub const TEAM_PREFIX: &str = "team::";
pub const MATCH_PREFIX: &str = "match::";
pub const COURT_PREFIX: &str = "court::";
pub const REFEREE_PREFIX: &str = "referee::";
pub const END_SUFFIX: &str = "\u{ffff}";

#[derive(Debug, Deserialize)]
pub struct AllDocsResponse {
    pub rows: Vec<AllDocsRow>,
}

#[derive(Debug, Deserialize)]
pub struct AllDocsRow {
    pub id: String,
    #[serde(default)]
    pub doc: Option<Value>,
}

/// Entity wrapped with the CouchDB bookkeeping fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CouchDocument<T> {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_rev", skip_serializing_if = "Option::is_none")]
    pub rev: Option<String>,
    #[serde(flatten)]
    pub body: T,
}

impl<T> CouchDocument<T> {
    pub fn new(id: String, rev: Option<String>, body: T) -> Self {
        Self { id, rev, body }
    }
}

pub fn team_doc_id(id: Uuid) -> String {
    format!("{}{}", TEAM_PREFIX, id)
}

pub fn match_doc_id(id: Uuid) -> String {
    format!("{}{}", MATCH_PREFIX, id)
}

pub fn court_doc_id(id: &str) -> String {
    format!("{}{}", COURT_PREFIX, id)
}

pub fn referee_doc_id(id: Uuid) -> String {
    format!("{}{}", REFEREE_PREFIX, id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_bookkeeping_fields_wrap_the_entity() {
        #[derive(Debug, Serialize, Deserialize, PartialEq)]
        struct Body {
            name: String,
        }

        let doc = CouchDocument::new(
            court_doc_id("court-2"),
            None,
            Body {
                name: "Court 2".into(),
            },
        );
        let json = serde_json::to_value(&doc).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"_id": "court::court-2", "name": "Court 2"})
        );

        let parsed: CouchDocument<Body> = serde_json::from_value(serde_json::json!({
            "_id": "court::court-2",
            "_rev": "1-abc",
            "name": "Court 2"
        }))
        .unwrap();
        assert_eq!(parsed.rev.as_deref(), Some("1-abc"));
        assert_eq!(parsed.body.name, "Court 2");
    }
}
