use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::dto::{courts::CourtSummary, matches::MatchSummary, teams::TeamSummary};

#[derive(Clone, Debug)]
/// Dispatched payload carried across the SSE channel.
pub struct ServerEvent {
    /// SSE event name; `None` sends an unnamed message.
    pub event: Option<String>,
    /// JSON payload.
    pub data: String,
}

impl ServerEvent {
    /// Convenience wrapper that serialises `payload` into the SSE data field.
    pub fn json<E, T>(event: E, payload: &T) -> serde_json::Result<Self>
    where
        E: Into<Option<String>>,
        T: Serialize,
    {
        Ok(Self {
            event: event.into(),
            data: serde_json::to_string(payload)?,
        })
    }
}

#[derive(Debug, Serialize, ToSchema)]
/// Initial metadata sent to an SSE client when it connects.
pub struct Handshake {
    /// Identifier of the SSE stream.
    pub stream: String,
    /// Human-readable message confirming the subscription.
    pub message: String,
    /// Whether the backend is running without a storage backend connection.
    pub degraded: bool,
}

#[derive(Debug, Serialize, ToSchema)]
/// Broadcast when the backend enters or leaves degraded mode.
pub struct SystemStatus {
    /// Whether the backend is degraded.
    pub degraded: bool,
}

#[derive(Debug, Serialize, ToSchema)]
/// Carries the full match after it was created or changed.
pub struct MatchEvent {
    /// New state of the match.
    #[serde(rename = "match")]
    pub match_: MatchSummary,
}

/// A match was deleted.
#[derive(Debug, Serialize, ToSchema)]
pub struct MatchDeletedEvent {
    /// Id of the deleted match.
    pub match_id: Uuid,
}

#[derive(Debug, Serialize, ToSchema)]
/// Carries a team after creation or a statistics update.
pub struct TeamEvent {
    /// The team.
    pub team: TeamSummary,
}

/// A team was deleted.
#[derive(Debug, Serialize, ToSchema)]
pub struct TeamDeletedEvent {
    /// Id of the deleted team.
    pub team_id: Uuid,
}

#[derive(Debug, Serialize, ToSchema)]
/// Every team after statistics were rebuilt.
pub struct TeamsRecalculatedEvent {
    /// Every team with rebuilt statistics.
    pub teams: Vec<TeamSummary>,
}

#[derive(Debug, Serialize, ToSchema)]
/// A court changed (referee assignment or registration).
pub struct CourtEvent {
    /// The changed court.
    pub court: CourtSummary,
}

#[derive(Debug, Serialize, ToSchema)]
/// Emitted after the tournament was reset.
pub struct TournamentResetEvent {
    /// Matches removed.
    pub deleted_matches: usize,
    /// Teams whose statistics were zeroed.
    pub teams_reset: usize,
}
