use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::validation::validate_not_blank,
    state::model::{Player, Team, TeamStats},
};

/// Payload registering a doubles pair.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CreateTeamRequest {
    /// Team name.
    #[validate(length(min = 1, max = 64), custom(function = "validate_not_blank"))]
    pub name: String,
    /// Exactly two players.
    #[validate(length(equal = 2), nested)]
    pub players: Vec<PlayerInput>,
    /// One of the configured zone identifiers.
    #[validate(length(min = 1))]
    pub zone: String,
}

/// Player supplied at registration.
#[derive(Debug, Serialize, Deserialize, ToSchema, Validate)]
pub struct PlayerInput {
    /// Player name.
    #[validate(length(min = 1, max = 64), custom(function = "validate_not_blank"))]
    pub name: String,
}

/// Optional filters for listing teams.
#[derive(Debug, Deserialize, IntoParams)]
pub struct TeamListQuery {
    /// Only return teams of this zone.
    pub zone: Option<String>,
}

/// Player as returned by the API.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PlayerSummary {
    /// Player id.
    pub id: Uuid,
    /// Display name.
    pub name: String,
}

impl From<&Player> for PlayerSummary {
    fn from(value: &Player) -> Self {
        Self {
            id: value.id,
            name: value.name.clone(),
        }
    }
}

/// Cumulative statistics of a team.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TeamStatsSummary {
    /// Completed matches won.
    pub matches_won: u32,
    /// Completed matches lost.
    pub matches_lost: u32,
    /// Standings points (win/loss reward).
    pub outcome_points: u32,
    /// Rally points won in completed matches.
    pub points_scored: u32,
}

impl From<TeamStats> for TeamStatsSummary {
    fn from(value: TeamStats) -> Self {
        Self {
            matches_won: value.matches_won,
            matches_lost: value.matches_lost,
            outcome_points: value.outcome_points,
            points_scored: value.points_scored,
        }
    }
}

/// Team as returned by the API.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TeamSummary {
    /// Team id.
    pub id: Uuid,
    /// Team name.
    pub name: String,
    /// The doubles pair.
    pub players: Vec<PlayerSummary>,
    /// Zone of the team.
    pub zone: String,
    /// Cumulative statistics.
    pub stats: TeamStatsSummary,
}

impl From<&Team> for TeamSummary {
    fn from(value: &Team) -> Self {
        Self {
            id: value.id,
            name: value.name.clone(),
            players: value.players.iter().map(Into::into).collect(),
            zone: value.zone.clone(),
            stats: value.stats.into(),
        }
    }
}

impl From<Team> for TeamSummary {
    fn from(value: Team) -> Self {
        (&value).into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(players: &[&str]) -> CreateTeamRequest {
        CreateTeamRequest {
            name: "Smashers".into(),
            players: players
                .iter()
                .map(|name| PlayerInput {
                    name: (*name).into(),
                })
                .collect(),
            zone: "zone-a".into(),
        }
    }

    #[test]
    fn team_needs_exactly_two_named_players() {
        assert!(request(&["Ann", "Bob"]).validate().is_ok());
        assert!(request(&["Ann"]).validate().is_err());
        assert!(request(&["Ann", "Bob", "Cid"]).validate().is_err());
        assert!(request(&["Ann", "  "]).validate().is_err());
    }

    #[test]
    fn rejected_player_count_is_reported_on_players() {
        let errors = request(&["Ann"]).validate().unwrap_err();
        assert!(errors.errors().contains_key("players"));
        assert!(!errors.errors().contains_key("name"));
    }
}
