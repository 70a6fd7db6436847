use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::{
    dto::teams::{PlayerSummary, TeamSummary},
    state::statistics::{Leaders, PlayerStanding, TournamentSummary},
};

/// Optional filter of the standings table.
#[derive(Debug, Deserialize, IntoParams)]
pub struct StandingsQuery {
    /// Restrict the standings to one zone.
    pub zone: Option<String>,
}

/// One line of the standings table.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct StandingEntry {
    /// 1-based position.
    pub rank: usize,
    /// The ranked team.
    pub team: TeamSummary,
}

/// Average rally points of one team.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AveragePointsResponse {
    /// Team id.
    pub team_id: Uuid,
    /// Zero when the team has no completed match.
    pub average_points_per_match: f64,
}

/// Player ranked by matches won.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PlayerStandingSummary {
    /// The player.
    pub player: PlayerSummary,
    /// Team of the player.
    pub team_id: Uuid,
    /// Name of that team.
    pub team_name: String,
    /// Matches won by that team.
    pub matches_won: u32,
}

impl From<PlayerStanding> for PlayerStandingSummary {
    fn from(value: PlayerStanding) -> Self {
        Self {
            player: (&value.player).into(),
            team_id: value.team_id,
            team_name: value.team_name,
            matches_won: value.matches_won,
        }
    }
}

/// Leading team and player of a zone or of the tournament.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LeadersSummary {
    /// `null` for the overall leaders.
    pub zone: Option<String>,
    /// Top of the standings.
    pub best_team: Option<TeamSummary>,
    /// Player with the most wins.
    pub best_player: Option<PlayerStandingSummary>,
}

impl From<Leaders> for LeadersSummary {
    fn from(value: Leaders) -> Self {
        Self {
            zone: value.zone,
            best_team: value.best_team.map(Into::into),
            best_player: value.best_player.map(Into::into),
        }
    }
}

/// Tournament overview.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TournamentSummaryResponse {
    /// Every scheduled match.
    pub total_matches: usize,
    /// Matches being played.
    pub live_matches: usize,
    /// Finished matches.
    pub completed_matches: usize,
    /// Leaders per configured zone.
    pub zones: Vec<LeadersSummary>,
    /// Leaders across zones.
    pub overall: LeadersSummary,
}

impl From<TournamentSummary> for TournamentSummaryResponse {
    fn from(value: TournamentSummary) -> Self {
        Self {
            total_matches: value.total_matches,
            live_matches: value.live_matches,
            completed_matches: value.completed_matches,
            zones: value.zones.into_iter().map(Into::into).collect(),
            overall: value.overall.into(),
        }
    }
}

/// Teams with their statistics rebuilt from completed matches.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RecalculateResponse {
    /// Every team, by name.
    pub teams: Vec<TeamSummary>,
}
