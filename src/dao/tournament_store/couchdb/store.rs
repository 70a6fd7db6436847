use std::sync::Arc;

use futures::future::BoxFuture;
use reqwest::{Client, Method, StatusCode};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::from_value;
use uuid::Uuid;

use crate::dao::{
    models::{CourtEntity, MatchEntity, RefereeEntity, TeamEntity},
    storage::StorageResult,
    tournament_store::TournamentStore,
};

use super::{
    config::CouchConfig,
    error::{CouchDaoError, CouchResult},
    models::{
        AllDocsResponse, COURT_PREFIX, CouchDocument, END_SUFFIX, MATCH_PREFIX, REFEREE_PREFIX,
        TEAM_PREFIX, court_doc_id, match_doc_id, referee_doc_id, team_doc_id,
    },
};

/// CouchDB-backed [`TournamentStore`] implementation.
#[derive(Clone)]
pub struct CouchTournamentStore {
    client: Client,
    base_url: Arc<str>,
    database: Arc<str>,
    auth: Option<(Arc<str>, Arc<str>)>,
}

impl CouchTournamentStore {
    /// Establish a connection to CouchDB and ensure the database exists.
    pub async fn connect(config: CouchConfig) -> CouchResult<Self> {
        let client = Client::builder()
            .build()
            .map_err(|source| CouchDaoError::ClientBuilder { source })?;

        let base_url = Arc::<str>::from(config.base_url.trim_end_matches('/'));
        let database = Arc::<str>::from(config.database);
        let auth = config
            .username
            .zip(config.password)
            .map(|(u, p)| (Arc::<str>::from(u), Arc::<str>::from(p)));

        let store = Self {
            client,
            base_url,
            database,
            auth,
        };

        store.ensure_database().await?;
        Ok(store)
    }

    fn with_auth(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        if let Some((ref user, ref pass)) = self.auth {
            builder.basic_auth(user.as_ref(), Some(pass.as_ref()))
        } else {
            builder
        }
    }

    fn request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}/{}/{}", self.base_url, self.database, path);
        self.with_auth(self.client.request(method, url))
    }

    async fn ensure_database(&self) -> CouchResult<()> {
        let database = self.database.to_string();
        let url = format!("{}/{}", self.base_url, self.database);

        let response = self
            .with_auth(self.client.get(&url))
            .send()
            .await
            .map_err(|source| CouchDaoError::DatabaseQuery {
                database: database.clone(),
                source,
            })?;

        match response.status() {
            StatusCode::OK => Ok(()),
            StatusCode::NOT_FOUND => {
                let create = self
                    .with_auth(self.client.put(&url))
                    .send()
                    .await
                    .map_err(|source| CouchDaoError::DatabaseCreate {
                        database: database.clone(),
                        source,
                    })?;
                if create.status().is_success() {
                    Ok(())
                } else {
                    Err(CouchDaoError::DatabaseStatus {
                        database,
                        status: create.status(),
                    })
                }
            }
            other => Err(CouchDaoError::DatabaseStatus {
                database,
                status: other,
            }),
        }
    }

    async fn get_document<T>(&self, doc_id: &str) -> CouchResult<Option<T>>
    where
        T: DeserializeOwned,
    {
        let response = self
            .request(Method::GET, doc_id)
            .send()
            .await
            .map_err(|source| CouchDaoError::RequestSend {
                path: doc_id.to_string(),
                source,
            })?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => {
                response.json::<T>().await.map(Some).map_err(|source| {
                    CouchDaoError::DecodeResponse {
                        path: doc_id.to_string(),
                        source,
                    }
                })
            }
            other => Err(CouchDaoError::RequestStatus {
                path: doc_id.to_string(),
                status: other,
            }),
        }
    }

    /// Write a document. CouchDB answers 409 when `_rev` is stale.
    async fn put_document<T>(&self, entity: &'static str, document: &CouchDocument<T>) -> CouchResult<()>
    where
        T: Serialize,
    {
        let doc_id = document.id.as_str();
        let response = self
            .request(Method::PUT, doc_id)
            .json(document)
            .send()
            .await
            .map_err(|source| CouchDaoError::RequestSend {
                path: doc_id.to_string(),
                source,
            })?;

        match response.status() {
            status if status.is_success() => Ok(()),
            StatusCode::CONFLICT => Err(CouchDaoError::VersionConflict {
                entity,
                id: doc_id.to_string(),
            }),
            other => Err(CouchDaoError::RequestStatus {
                path: doc_id.to_string(),
                status: other,
            }),
        }
    }

    /// Overwrite a document, carrying over the current revision when one exists.
    async fn upsert<T>(&self, entity: &'static str, doc_id: String, body: T) -> CouchResult<()>
    where
        T: Serialize + DeserializeOwned,
    {
        let rev = self
            .get_document::<CouchDocument<T>>(&doc_id)
            .await?
            .and_then(|existing| existing.rev);
        self.put_document(entity, &CouchDocument::new(doc_id, rev, body))
            .await
    }

    async fn find_body<T>(&self, doc_id: &str) -> CouchResult<Option<T>>
    where
        T: DeserializeOwned,
    {
        Ok(self
            .get_document::<CouchDocument<T>>(doc_id)
            .await?
            .map(|doc| doc.body))
    }

    async fn delete_document(&self, doc_id: &str) -> CouchResult<bool> {
        let Some(existing) = self
            .get_document::<CouchDocument<serde_json::Value>>(doc_id)
            .await?
        else {
            return Ok(false);
        };
        let rev = existing.rev.unwrap_or_default();

        let response = self
            .request(Method::DELETE, doc_id)
            .query(&[("rev", rev)])
            .send()
            .await
            .map_err(|source| CouchDaoError::RequestSend {
                path: doc_id.to_string(),
                source,
            })?;

        match response.status() {
            status if status.is_success() => Ok(true),
            StatusCode::NOT_FOUND => Ok(false),
            other => Err(CouchDaoError::RequestStatus {
                path: doc_id.to_string(),
                status: other,
            }),
        }
    }

    async fn list_documents<T>(&self, prefix: &str) -> CouchResult<Vec<T>>
    where
        T: DeserializeOwned,
    {
        const ALL_DOCS: &str = "_all_docs";
        let query = [
            ("include_docs", "true".to_string()),
            ("startkey", format!("\"{}\"", prefix)),
            ("endkey", format!("\"{}{}\"", prefix, END_SUFFIX)),
        ];

        let response = self
            .request(Method::GET, ALL_DOCS)
            .query(&query)
            .send()
            .await
            .map_err(|source| CouchDaoError::RequestSend {
                path: ALL_DOCS.to_string(),
                source,
            })?;

        if !response.status().is_success() {
            return Err(CouchDaoError::RequestStatus {
                path: ALL_DOCS.to_string(),
                status: response.status(),
            });
        }

        let payload = response.json::<AllDocsResponse>().await.map_err(|source| {
            CouchDaoError::DecodeResponse {
                path: ALL_DOCS.to_string(),
                source,
            }
        })?;

        let mut documents = Vec::new();
        for row in payload.rows {
            if let Some(doc) = row.doc {
                let parsed: CouchDocument<T> =
                    from_value(doc).map_err(|source| CouchDaoError::DeserializeValue {
                        path: row.id,
                        source,
                    })?;
                documents.push(parsed.body);
            }
        }

        Ok(documents)
    }

    async fn save_match_checked(
        &self,
        entity: MatchEntity,
        expected_version: Option<u64>,
    ) -> CouchResult<()> {
        let doc_id = match_doc_id(entity.id);
        let existing = self
            .get_document::<CouchDocument<MatchEntity>>(&doc_id)
            .await?;

        let rev = match (existing, expected_version) {
            (None, None) => None,
            (Some(doc), Some(version)) if doc.body.version == version => doc.rev,
            _ => {
                return Err(CouchDaoError::VersionConflict {
                    entity: "match",
                    id: entity.id.to_string(),
                });
            }
        };

        // a concurrent writer between the read and this put is caught by `_rev`
        self.put_document("match", &CouchDocument::new(doc_id, rev, entity))
            .await
    }
}

impl TournamentStore for CouchTournamentStore {
    fn save_team(&self, team: TeamEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            let doc_id = team_doc_id(team.id);
            store.upsert("team", doc_id, team).await.map_err(Into::into)
        })
    }

    fn find_team(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<TeamEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .find_body(&team_doc_id(id))
                .await
                .map_err(Into::into)
        })
    }

    fn list_teams(&self) -> BoxFuture<'static, StorageResult<Vec<TeamEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.list_documents(TEAM_PREFIX).await.map_err(Into::into) })
    }

    fn delete_team(&self, id: Uuid) -> BoxFuture<'static, StorageResult<bool>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .delete_document(&team_doc_id(id))
                .await
                .map_err(Into::into)
        })
    }

    fn save_match(
        &self,
        entity: MatchEntity,
        expected_version: Option<u64>,
    ) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .save_match_checked(entity, expected_version)
                .await
                .map_err(Into::into)
        })
    }

    fn find_match(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<MatchEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .find_body(&match_doc_id(id))
                .await
                .map_err(Into::into)
        })
    }

    fn list_matches(&self) -> BoxFuture<'static, StorageResult<Vec<MatchEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.list_documents(MATCH_PREFIX).await.map_err(Into::into) })
    }

    fn delete_match(&self, id: Uuid) -> BoxFuture<'static, StorageResult<bool>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .delete_document(&match_doc_id(id))
                .await
                .map_err(Into::into)
        })
    }

    fn save_court(&self, court: CourtEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            let doc_id = court_doc_id(&court.id);
            store.upsert("court", doc_id, court).await.map_err(Into::into)
        })
    }

    fn find_court(&self, id: String) -> BoxFuture<'static, StorageResult<Option<CourtEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .find_body(&court_doc_id(&id))
                .await
                .map_err(Into::into)
        })
    }

    fn list_courts(&self) -> BoxFuture<'static, StorageResult<Vec<CourtEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.list_documents(COURT_PREFIX).await.map_err(Into::into) })
    }

    fn save_referee(&self, referee: RefereeEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            let doc_id = referee_doc_id(referee.id);
            store
                .upsert("referee", doc_id, referee)
                .await
                .map_err(Into::into)
        })
    }

    fn find_referee(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<RefereeEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .find_body(&referee_doc_id(id))
                .await
                .map_err(Into::into)
        })
    }

    fn list_referees(&self) -> BoxFuture<'static, StorageResult<Vec<RefereeEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .list_documents(REFEREE_PREFIX)
                .await
                .map_err(Into::into)
        })
    }

    fn delete_referee(&self, id: Uuid) -> BoxFuture<'static, StorageResult<bool>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .delete_document(&referee_doc_id(id))
                .await
                .map_err(Into::into)
        })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.ensure_database().await.map_err(Into::into) })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.ensure_database().await.map_err(Into::into) })
    }
}
