use futures::{TryStreamExt, future::BoxFuture};
use mongodb::{
    Collection,
    bson::doc,
    error::{Error as MongoError, ErrorKind, WriteFailure},
};
use serde::{Serialize, de::DeserializeOwned};
use uuid::Uuid;

use crate::dao::{
    models::{CourtEntity, MatchEntity, RefereeEntity, TeamEntity},
    storage::StorageResult,
    tournament_store::TournamentStore,
};

use super::{
    MongoDaoError, MongoManager,
    manager::{COURT_COLLECTION, MATCH_COLLECTION, REFEREE_COLLECTION, TEAM_COLLECTION},
    models::{MongoDocument, doc_id, versioned_doc_id},
};

const DUPLICATE_KEY: i32 = 11000;

/// MongoDB-backed [`TournamentStore`] implementation.
#[derive(Clone)]
pub struct MongoTournamentStore {
    mongo: MongoManager,
}

impl MongoTournamentStore {
    pub fn new(mongo: MongoManager) -> Self {
        Self { mongo }
    }

    async fn collection<T>(&self, name: &str) -> Collection<MongoDocument<T>>
    where
        T: Send + Sync,
    {
        self.mongo.database().await.collection(name)
    }

    async fn upsert<T>(
        &self,
        collection: &'static str,
        entity: &'static str,
        id: String,
        body: T,
    ) -> Result<(), MongoDaoError>
    where
        T: Serialize + Send + Sync,
    {
        let document = MongoDocument::new(&id, body);
        self.collection::<T>(collection)
            .await
            .replace_one(doc_id(&id), &document)
            .upsert(true)
            .await
            .map_err(|source| MongoDaoError::Save { entity, id, source })?;
        Ok(())
    }

    async fn find<T>(
        &self,
        collection: &'static str,
        entity: &'static str,
        id: String,
    ) -> Result<Option<T>, MongoDaoError>
    where
        T: DeserializeOwned + Send + Sync,
    {
        let document = self
            .collection::<T>(collection)
            .await
            .find_one(doc_id(&id))
            .await
            .map_err(|source| MongoDaoError::Load { entity, id, source })?;
        Ok(document.map(|doc| doc.body))
    }

    async fn list<T>(&self, collection: &'static str) -> Result<Vec<T>, MongoDaoError>
    where
        T: DeserializeOwned + Send + Sync + Unpin,
    {
        let docs: Vec<MongoDocument<T>> = self
            .collection::<T>(collection)
            .await
            .find(doc! {})
            .await
            .map_err(|source| MongoDaoError::List { collection, source })?
            .try_collect()
            .await
            .map_err(|source| MongoDaoError::List { collection, source })?;
        Ok(docs.into_iter().map(|doc| doc.body).collect())
    }

    async fn delete(
        &self,
        collection: &'static str,
        entity: &'static str,
        id: String,
    ) -> Result<bool, MongoDaoError> {
        let result = self
            .collection::<mongodb::bson::Document>(collection)
            .await
            .delete_one(doc_id(&id))
            .await
            .map_err(|source| MongoDaoError::Delete { entity, id, source })?;
        Ok(result.deleted_count > 0)
    }

    async fn save_match_checked(
        &self,
        entity: MatchEntity,
        expected_version: Option<u64>,
    ) -> Result<(), MongoDaoError> {
        let id = entity.id.to_string();
        let conflict = || MongoDaoError::VersionConflict {
            entity: "match",
            id: id.clone(),
        };
        let document = MongoDocument::new(&id, entity);
        let collection = self.collection::<MatchEntity>(MATCH_COLLECTION).await;

        match expected_version {
            None => match collection.insert_one(&document).await {
                Ok(_) => Ok(()),
                Err(err) if is_duplicate_key(&err) => Err(conflict()),
                Err(source) => Err(MongoDaoError::Save {
                    entity: "match",
                    id: id.clone(),
                    source,
                }),
            },
            Some(version) => {
                let result = collection
                    .replace_one(versioned_doc_id(&id, version), &document)
                    .await
                    .map_err(|source| MongoDaoError::Save {
                        entity: "match",
                        id: id.clone(),
                        source,
                    })?;
                if result.matched_count == 0 {
                    Err(conflict())
                } else {
                    Ok(())
                }
            }
        }
    }
}

fn is_duplicate_key(err: &MongoError) -> bool {
    matches!(
        err.kind.as_ref(),
        ErrorKind::Write(WriteFailure::WriteError(write)) if write.code == DUPLICATE_KEY
    )
}

impl TournamentStore for MongoTournamentStore {
    fn save_team(&self, team: TeamEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            let id = team.id.to_string();
            store
                .upsert(TEAM_COLLECTION, "team", id, team)
                .await
                .map_err(Into::into)
        })
    }

    fn find_team(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<TeamEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .find(TEAM_COLLECTION, "team", id.to_string())
                .await
                .map_err(Into::into)
        })
    }

    fn list_teams(&self) -> BoxFuture<'static, StorageResult<Vec<TeamEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.list(TEAM_COLLECTION).await.map_err(Into::into) })
    }

    fn delete_team(&self, id: Uuid) -> BoxFuture<'static, StorageResult<bool>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .delete(TEAM_COLLECTION, "team", id.to_string())
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
                .find(MATCH_COLLECTION, "match", id.to_string())
                .await
                .map_err(Into::into)
        })
    }

    fn list_matches(&self) -> BoxFuture<'static, StorageResult<Vec<MatchEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.list(MATCH_COLLECTION).await.map_err(Into::into) })
    }

    fn delete_match(&self, id: Uuid) -> BoxFuture<'static, StorageResult<bool>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .delete(MATCH_COLLECTION, "match", id.to_string())
                .await
                .map_err(Into::into)
        })
    }

    fn save_court(&self, court: CourtEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            let id = court.id.clone();
            store
                .upsert(COURT_COLLECTION, "court", id, court)
                .await
                .map_err(Into::into)
        })
    }

    fn find_court(&self, id: String) -> BoxFuture<'static, StorageResult<Option<CourtEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .find(COURT_COLLECTION, "court", id)
                .await
                .map_err(Into::into)
        })
    }

    fn list_courts(&self) -> BoxFuture<'static, StorageResult<Vec<CourtEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.list(COURT_COLLECTION).await.map_err(Into::into) })
    }

    fn save_referee(&self, referee: RefereeEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            let id = referee.id.to_string();
            store
                .upsert(REFEREE_COLLECTION, "referee", id, referee)
                .await
                .map_err(Into::into)
        })
    }

    fn find_referee(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<RefereeEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .find(REFEREE_COLLECTION, "referee", id.to_string())
                .await
                .map_err(Into::into)
        })
    }

    fn list_referees(&self) -> BoxFuture<'static, StorageResult<Vec<RefereeEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.list(REFEREE_COLLECTION).await.map_err(Into::into) })
    }

    fn delete_referee(&self, id: Uuid) -> BoxFuture<'static, StorageResult<bool>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .delete(REFEREE_COLLECTION, "referee", id.to_string())
                .await
                .map_err(Into::into)
        })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        let mongo = self.mongo.clone();
        Box::pin(async move { mongo.ping().await.map_err(Into::into) })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        let mongo = self.mongo.clone();
        Box::pin(async move { mongo.reconnect().await.map_err(Into::into) })
    }
}
