//! Process-local store backed by concurrent maps. Data does not survive a restart.

use std::sync::Arc;

use dashmap::{DashMap, mapref::entry::Entry};
use futures::future::{BoxFuture, ready};
use uuid::Uuid;

use crate::dao::{
    models::{CourtEntity, MatchEntity, RefereeEntity, TeamEntity},
    storage::{StorageError, StorageResult},
    tournament_store::TournamentStore,
};

#[derive(Default)]
struct Collections {
    teams: DashMap<Uuid, TeamEntity>,
    matches: DashMap<Uuid, MatchEntity>,
    courts: DashMap<String, CourtEntity>,
    referees: DashMap<Uuid, RefereeEntity>,
}

/// In-memory [`TournamentStore`] implementation.
#[derive(Clone, Default)]
pub struct MemoryTournamentStore {
    inner: Arc<Collections>,
}

impl MemoryTournamentStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn put_match(&self, entity: MatchEntity, expected: Option<u64>) -> StorageResult<()> {
        match (self.inner.matches.entry(entity.id), expected) {
            (Entry::Vacant(slot), None) => {
                slot.insert(entity);
                Ok(())
            }
            (Entry::Occupied(mut slot), Some(version)) if slot.get().version == version => {
                slot.insert(entity);
                Ok(())
            }
            _ => Err(StorageError::conflict("match", entity.id)),
        }
    }
}

fn values<K, V>(map: &DashMap<K, V>) -> Vec<V>
where
    K: Eq + std::hash::Hash,
    V: Clone,
{
    map.iter().map(|entry| entry.value().clone()).collect()
}

impl TournamentStore for MemoryTournamentStore {
    fn save_team(&self, team: TeamEntity) -> BoxFuture<'static, StorageResult<()>> {
        self.inner.teams.insert(team.id, team);
        Box::pin(ready(Ok(())))
    }

    fn find_team(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<TeamEntity>>> {
        let team = self.inner.teams.get(&id).map(|entry| entry.clone());
        Box::pin(ready(Ok(team)))
    }

    fn list_teams(&self) -> BoxFuture<'static, StorageResult<Vec<TeamEntity>>> {
        Box::pin(ready(Ok(values(&self.inner.teams))))
    }

    fn delete_team(&self, id: Uuid) -> BoxFuture<'static, StorageResult<bool>> {
        let removed = self.inner.teams.remove(&id).is_some();
        Box::pin(ready(Ok(removed)))
    }

    fn save_match(
        &self,
        entity: MatchEntity,
        expected_version: Option<u64>,
    ) -> BoxFuture<'static, StorageResult<()>> {
        Box::pin(ready(self.put_match(entity, expected_version)))
    }

    fn find_match(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<MatchEntity>>> {
        let entity = self.inner.matches.get(&id).map(|entry| entry.clone());
        Box::pin(ready(Ok(entity)))
    }

    fn list_matches(&self) -> BoxFuture<'static, StorageResult<Vec<MatchEntity>>> {
        Box::pin(ready(Ok(values(&self.inner.matches))))
    }

    fn delete_match(&self, id: Uuid) -> BoxFuture<'static, StorageResult<bool>> {
        let removed = self.inner.matches.remove(&id).is_some();
        Box::pin(ready(Ok(removed)))
    }

    fn save_court(&self, court: CourtEntity) -> BoxFuture<'static, StorageResult<()>> {
        self.inner.courts.insert(court.id.clone(), court);
        Box::pin(ready(Ok(())))
    }

    fn find_court(&self, id: String) -> BoxFuture<'static, StorageResult<Option<CourtEntity>>> {
        let court = self.inner.courts.get(&id).map(|entry| entry.clone());
        Box::pin(ready(Ok(court)))
    }

    fn list_courts(&self) -> BoxFuture<'static, StorageResult<Vec<CourtEntity>>> {
        Box::pin(ready(Ok(values(&self.inner.courts))))
    }

    fn save_referee(&self, referee: RefereeEntity) -> BoxFuture<'static, StorageResult<()>> {
        self.inner.referees.insert(referee.id, referee);
        Box::pin(ready(Ok(())))
    }

    fn find_referee(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<RefereeEntity>>> {
        let referee = self.inner.referees.get(&id).map(|entry| entry.clone());
        Box::pin(ready(Ok(referee)))
    }

    fn list_referees(&self) -> BoxFuture<'static, StorageResult<Vec<RefereeEntity>>> {
        Box::pin(ready(Ok(values(&self.inner.referees))))
    }

    fn delete_referee(&self, id: Uuid) -> BoxFuture<'static, StorageResult<bool>> {
        let removed = self.inner.referees.remove(&id).is_some();
        Box::pin(ready(Ok(removed)))
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        Box::pin(ready(Ok(())))
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        Box::pin(ready(Ok(())))
    }
}
