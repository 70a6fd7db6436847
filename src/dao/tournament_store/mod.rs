#[cfg(feature = "couch-store")]
pub mod couchdb;
pub mod memory;
#[cfg(feature = "mongo-store")]
pub mod mongodb;

use crate::dao::models::{CourtEntity, MatchEntity, RefereeEntity, TeamEntity};
use crate::dao::storage::StorageResult;
use futures::future::BoxFuture;
use uuid::Uuid;

/// Abstraction over the persistence layer for teams, matches, courts and referees.
pub trait TournamentStore: Send + Sync {
    /// Insert or replace a team.
    fn save_team(&self, team: TeamEntity) -> BoxFuture<'static, StorageResult<()>>;
    /// Look a team up by id.
    fn find_team(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<TeamEntity>>>;
    /// Every registered team, in no particular order.
    fn list_teams(&self) -> BoxFuture<'static, StorageResult<Vec<TeamEntity>>>;
    /// Returns whether a team was removed.
    fn delete_team(&self, id: Uuid) -> BoxFuture<'static, StorageResult<bool>>;

    /// Persist a match.
    ///
    /// `expected_version` is the version the caller loaded: `None` inserts a new
    /// record, `Some(v)` only overwrites a record still at version `v`. Any other
    /// situation yields [`StorageError::Conflict`](crate::dao::storage::StorageError::Conflict).
    fn save_match(
        &self,
        entity: MatchEntity,
        expected_version: Option<u64>,
    ) -> BoxFuture<'static, StorageResult<()>>;
    /// Look a match up by id.
    fn find_match(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<MatchEntity>>>;
    /// Every stored match, in no particular order.
    fn list_matches(&self) -> BoxFuture<'static, StorageResult<Vec<MatchEntity>>>;
    /// Returns whether a match was removed.
    fn delete_match(&self, id: Uuid) -> BoxFuture<'static, StorageResult<bool>>;

    /// Insert or replace a court.
    fn save_court(&self, court: CourtEntity) -> BoxFuture<'static, StorageResult<()>>;
    /// Look a court up by its slug.
    fn find_court(&self, id: String) -> BoxFuture<'static, StorageResult<Option<CourtEntity>>>;
    /// Every registered court.
    fn list_courts(&self) -> BoxFuture<'static, StorageResult<Vec<CourtEntity>>>;

    /// Insert or replace a referee.
    fn save_referee(&self, referee: RefereeEntity) -> BoxFuture<'static, StorageResult<()>>;
    /// Look a referee up by id.
    fn find_referee(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<RefereeEntity>>>;
    /// Every registered referee.
    fn list_referees(&self) -> BoxFuture<'static, StorageResult<Vec<RefereeEntity>>>;
    /// Returns whether a referee was removed.
    fn delete_referee(&self, id: Uuid) -> BoxFuture<'static, StorageResult<bool>>;

    /// Cheap round trip proving the backend answers.
    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>>;
    /// Re-establish the backend connection after failed health checks.
    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>>;
}
