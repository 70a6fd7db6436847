use serde::Serialize;
use tracing::warn;
use uuid::Uuid;

use crate::{
    dto::{
        courts::CourtSummary,
        matches::MatchSummary,
        sse::{
            CourtEvent, MatchDeletedEvent, MatchEvent, ServerEvent, SystemStatus, TeamDeletedEvent,
            TeamEvent, TeamsRecalculatedEvent, TournamentResetEvent,
        },
        teams::TeamSummary,
        tournament::ResetResponse,
    },
    state::SharedState,
};

/// A match was scheduled.
pub const EVENT_MATCH_CREATED: &str = "match.created";
/// A match changed state.
pub const EVENT_MATCH_UPDATED: &str = "match.updated";
/// A match was deleted.
pub const EVENT_MATCH_DELETED: &str = "match.deleted";
/// A team registered.
pub const EVENT_TEAM_CREATED: &str = "team.created";
/// A team's statistics changed.
pub const EVENT_TEAM_UPDATED: &str = "team.updated";
/// A team was deleted.
pub const EVENT_TEAM_DELETED: &str = "team.deleted";
/// All team statistics were rebuilt.
pub const EVENT_TEAMS_RECALCULATED: &str = "teams.recalculated";
/// A court was registered or got a new referee.
pub const EVENT_COURT_UPDATED: &str = "court.updated";
/// The tournament was wiped.
pub const EVENT_TOURNAMENT_RESET: &str = "tournament.reset";
/// Degraded mode was entered or left.
pub const EVENT_SYSTEM_STATUS: &str = "system.status";

/// Broadcast a freshly scheduled match.
pub fn broadcast_match_created(state: &SharedState, match_: MatchSummary) {
    send_event(state, EVENT_MATCH_CREATED, &MatchEvent { match_ });
}

/// Broadcast the new state of a match after any accepted change.
pub fn broadcast_match_updated(state: &SharedState, match_: MatchSummary) {
    send_event(state, EVENT_MATCH_UPDATED, &MatchEvent { match_ });
}

/// Broadcast the id of a deleted match.
pub fn broadcast_match_deleted(state: &SharedState, match_id: Uuid) {
    send_event(state, EVENT_MATCH_DELETED, &MatchDeletedEvent { match_id });
}

/// Broadcast a newly registered team.
pub fn broadcast_team_created(state: &SharedState, team: TeamSummary) {
    send_event(state, EVENT_TEAM_CREATED, &TeamEvent { team });
}

/// Broadcast a team whose statistics changed.
pub fn broadcast_team_updated(state: &SharedState, team: TeamSummary) {
    send_event(state, EVENT_TEAM_UPDATED, &TeamEvent { team });
}

/// Broadcast the id of a deleted team.
pub fn broadcast_team_deleted(state: &SharedState, team_id: Uuid) {
    send_event(state, EVENT_TEAM_DELETED, &TeamDeletedEvent { team_id });
}

/// Broadcast every team after a recalculation.
pub fn broadcast_teams_recalculated(state: &SharedState, teams: Vec<TeamSummary>) {
    send_event(
        state,
        EVENT_TEAMS_RECALCULATED,
        &TeamsRecalculatedEvent { teams },
    );
}

/// Broadcast a changed court.
pub fn broadcast_court_updated(state: &SharedState, court: CourtSummary) {
    send_event(state, EVENT_COURT_UPDATED, &CourtEvent { court });
}

/// Broadcast the counts of a reset.
pub fn broadcast_tournament_reset(state: &SharedState, reset: &ResetResponse) {
    send_event(
        state,
        EVENT_TOURNAMENT_RESET,
        &TournamentResetEvent {
            deleted_matches: reset.deleted_matches,
            teams_reset: reset.teams_reset,
        },
    );
}

/// Broadcast a degraded-mode flip.
pub fn broadcast_system_status(state: &SharedState, degraded: bool) {
    send_event(state, EVENT_SYSTEM_STATUS, &SystemStatus { degraded });
}

fn send_event(state: &SharedState, event: &str, payload: &impl Serialize) {
    match ServerEvent::json(Some(event.to_string()), payload) {
        Ok(event) => state.sse().broadcast(event),
        Err(err) => warn!(event, error = %err, "failed to serialize SSE payload"),
    }
}
