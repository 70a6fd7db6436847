use serde::{Deserialize, Serialize};
use std::time::SystemTime;
use uuid::Uuid;

use crate::state::model::{
    ApprovalRequest, CourtPosition, Match, MatchStatus, MatchTeam, Player, ScoreEvent, Set, Side,
    SideScore, Team, TeamStats,
};

/// Player of a registered team.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlayerEntity {
    /// Stable identifier for the player.
    pub id: Uuid,
    /// Display name.
    pub name: String,
}

/// Cumulative statistics persisted alongside a team.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TeamStatsEntity {
    /// Completed matches won.
    pub matches_won: u32,
    /// Completed matches lost.
    pub matches_lost: u32,
    /// Standings currency (win/loss reward).
    pub outcome_points: u32,
    /// Rally points won across completed matches.
    pub points_scored: u32,
}

/// Representation of a team stored in persistence and shared across layers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TeamEntity {
    /// Stable identifier for the team.
    pub id: Uuid,
    /// Display name chosen for the team.
    pub name: String,
    /// The doubles pair.
    pub players: [PlayerEntity; 2],
    /// Zone the team is registered in.
    pub zone: String,
    /// Running statistics; absent in records written before they existed.
    #[serde(default)]
    pub stats: TeamStatsEntity,
    /// Last time this team was updated.
    pub updated_at: SystemTime,
}

/// Team snapshot embedded in a persisted match.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MatchTeamEntity {
    /// Id of the registered team.
    pub id: Uuid,
    /// Team name at scheduling time.
    pub name: String,
    /// The doubles pair.
    pub players: [PlayerEntity; 2],
    /// Zone shared by both teams of the match.
    pub zone: String,
}

/// Persisted lifecycle state of a match.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatusEntity {
    /// Scheduled, possibly queued on a court.
    Upcoming,
    /// Being played.
    Live,
    /// Terminal; a winner is recorded.
    Completed,
}

/// Persisted per-set score.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SetEntity {
    /// 1-based position within the match.
    pub set_number: u8,
    /// Points of team1.
    pub team1: u8,
    /// Points of team2.
    pub team2: u8,
    /// Set when the set was closed.
    pub winner: Option<Side>,
    /// A closed set never changes again.
    pub locked: bool,
}

/// Persisted undo log entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScoreEventEntity {
    /// Set the point was scored in.
    pub set_number: u8,
    /// Side that won the rally.
    pub team: Side,
    /// Server before the rally.
    pub serve_before: Side,
    /// Server after the rally, always the rally winner.
    pub serve_after: Side,
    /// When the rally was recorded.
    pub timestamp: SystemTime,
}

/// Aggregate match entity persisted by the storage layer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MatchEntity {
    /// Primary key of the match.
    pub id: Uuid,
    /// First side as scheduled.
    pub team1: MatchTeamEntity,
    /// Second side as scheduled.
    pub team2: MatchTeamEntity,
    /// Sets won by team1.
    pub team1_sets: u8,
    /// Sets won by team2.
    pub team2_sets: u8,
    /// Every opened set, oldest first.
    pub sets: Vec<SetEntity>,
    /// Number of the set being played.
    pub current_set: u8,
    /// Side holding the serve.
    pub serving: Side,
    /// Half of the court team1 plays on; both halves are stored so readers
    /// do not need to derive them.
    pub team1_position: CourtPosition,
    /// Half of the court team2 plays on.
    pub team2_position: CourtPosition,
    /// Lifecycle state.
    pub status: MatchStatusEntity,
    /// Winning side once decided.
    pub winner: Option<Side>,
    /// Court the match is queued or played on.
    pub court_id: Option<String>,
    /// Position in the court queue.
    pub queue_order: Option<u32>,
    /// Undo log of the rallies.
    pub history: Vec<ScoreEventEntity>,
    /// Referee name when an approval request is pending.
    pub approval_requested_by: Option<String>,
    /// When the pending approval request was made.
    pub approval_requested_at: Option<SystemTime>,
    /// Whether completion needs an administrator's approval.
    #[serde(default)]
    pub requires_approval: bool,
    /// Optimistic concurrency revision.
    pub version: u64,
    /// When the match was scheduled.
    pub created_at: SystemTime,
    /// Last write.
    pub updated_at: SystemTime,
}

/// A physical court and its assigned referee.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CourtEntity {
    /// Slug identifier (e.g. `court-1`).
    pub id: String,
    /// Display name.
    pub name: String,
    /// Referee in charge, if any.
    pub referee_id: Option<Uuid>,
}

/// Registered referee.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RefereeEntity {
    /// Stable identifier of the referee.
    pub id: Uuid,
    /// Display name.
    pub name: String,
}

impl From<PlayerEntity> for Player {
    fn from(value: PlayerEntity) -> Self {
        Self {
            id: value.id,
            name: value.name,
        }
    }
}

impl From<Player> for PlayerEntity {
    fn from(value: Player) -> Self {
        Self {
            id: value.id,
            name: value.name,
        }
    }
}

impl From<TeamStatsEntity> for TeamStats {
    fn from(value: TeamStatsEntity) -> Self {
        Self {
            matches_won: value.matches_won,
            matches_lost: value.matches_lost,
            outcome_points: value.outcome_points,
            points_scored: value.points_scored,
        }
    }
}

impl From<TeamStats> for TeamStatsEntity {
    fn from(value: TeamStats) -> Self {
        Self {
            matches_won: value.matches_won,
            matches_lost: value.matches_lost,
            outcome_points: value.outcome_points,
            points_scored: value.points_scored,
        }
    }
}

impl From<TeamEntity> for Team {
    fn from(value: TeamEntity) -> Self {
        Self {
            id: value.id,
            name: value.name,
            players: value.players.map(Into::into),
            zone: value.zone,
            stats: value.stats.into(),
        }
    }
}

impl From<Team> for TeamEntity {
    fn from(value: Team) -> Self {
        Self {
            id: value.id,
            name: value.name,
            players: value.players.map(Into::into),
            zone: value.zone,
            stats: value.stats.into(),
            updated_at: SystemTime::now(),
        }
    }
}

impl From<MatchTeamEntity> for MatchTeam {
    fn from(value: MatchTeamEntity) -> Self {
        Self {
            id: value.id,
            name: value.name,
            players: value.players.map(Into::into),
            zone: value.zone,
        }
    }
}

impl From<MatchTeam> for MatchTeamEntity {
    fn from(value: MatchTeam) -> Self {
        Self {
            id: value.id,
            name: value.name,
            players: value.players.map(Into::into),
            zone: value.zone,
        }
    }
}

impl From<MatchStatusEntity> for MatchStatus {
    fn from(value: MatchStatusEntity) -> Self {
        match value {
            MatchStatusEntity::Upcoming => MatchStatus::Upcoming,
            MatchStatusEntity::Live => MatchStatus::Live,
            MatchStatusEntity::Completed => MatchStatus::Completed,
        }
    }
}

impl From<MatchStatus> for MatchStatusEntity {
    fn from(value: MatchStatus) -> Self {
        match value {
            MatchStatus::Upcoming => MatchStatusEntity::Upcoming,
            MatchStatus::Live => MatchStatusEntity::Live,
            MatchStatus::Completed => MatchStatusEntity::Completed,
        }
    }
}

impl From<SetEntity> for Set {
    fn from(value: SetEntity) -> Self {
        Self {
            set_number: value.set_number,
            score: SideScore {
                team1: value.team1,
                team2: value.team2,
            },
            winner: value.winner,
            locked: value.locked,
        }
    }
}

impl From<Set> for SetEntity {
    fn from(value: Set) -> Self {
        Self {
            set_number: value.set_number,
            team1: value.score.team1,
            team2: value.score.team2,
            winner: value.winner,
            locked: value.locked,
        }
    }
}

impl From<ScoreEventEntity> for ScoreEvent {
    fn from(value: ScoreEventEntity) -> Self {
        Self {
            set_number: value.set_number,
            team: value.team,
            serve_before: value.serve_before,
            serve_after: value.serve_after,
            timestamp: value.timestamp,
        }
    }
}

impl From<ScoreEvent> for ScoreEventEntity {
    fn from(value: ScoreEvent) -> Self {
        Self {
            set_number: value.set_number,
            team: value.team,
            serve_before: value.serve_before,
            serve_after: value.serve_after,
            timestamp: value.timestamp,
        }
    }
}

impl From<MatchEntity> for Match {
    fn from(value: MatchEntity) -> Self {
        let approval = value
            .approval_requested_by
            .map(|requested_by| ApprovalRequest {
                requested_by,
                requested_at: value.approval_requested_at.unwrap_or(value.updated_at),
            });
        Self {
            id: value.id,
            team1: value.team1.into(),
            team2: value.team2.into(),
            sets_won: SideScore {
                team1: value.team1_sets,
                team2: value.team2_sets,
            },
            sets: value.sets.into_iter().map(Into::into).collect(),
            current_set_number: value.current_set,
            serving: value.serving,
            team1_position: value.team1_position,
            status: value.status.into(),
            winner: value.winner,
            court_id: value.court_id,
            queue_order: value.queue_order,
            history: value.history.into_iter().map(Into::into).collect(),
            approval,
            requires_approval: value.requires_approval,
            created_at: value.created_at,
            version: value.version,
        }
    }
}

impl From<Match> for MatchEntity {
    fn from(value: Match) -> Self {
        let team2_position = value.position(Side::Team2);
        let (approval_requested_by, approval_requested_at) = match value.approval {
            Some(request) => (Some(request.requested_by), Some(request.requested_at)),
            None => (None, None),
        };
        Self {
            id: value.id,
            team1: value.team1.into(),
            team2: value.team2.into(),
            team1_sets: value.sets_won.team1,
            team2_sets: value.sets_won.team2,
            sets: value.sets.into_iter().map(Into::into).collect(),
            current_set: value.current_set_number,
            serving: value.serving,
            team1_position: value.team1_position,
            team2_position,
            status: value.status.into(),
            winner: value.winner,
            court_id: value.court_id,
            queue_order: value.queue_order,
            history: value.history.into_iter().map(Into::into).collect(),
            approval_requested_by,
            approval_requested_at,
            requires_approval: value.requires_approval,
            version: value.version,
            created_at: value.created_at,
            updated_at: SystemTime::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn match_team(name: &str) -> MatchTeam {
        MatchTeam {
            id: Uuid::new_v4(),
            name: name.into(),
            players: [
                Player {
                    id: Uuid::new_v4(),
                    name: format!("{name} 1"),
                },
                Player {
                    id: Uuid::new_v4(),
                    name: format!("{name} 2"),
                },
            ],
            zone: "zone-a".into(),
        }
    }

    #[test]
    fn match_survives_persistence_mapping_mid_game() {
        let mut m = Match::new(Uuid::new_v4(), match_team("A"), match_team("B"), true).unwrap();
        m.start().unwrap();
        m.record_point(Side::Team2).unwrap();
        m.end_set(Side::Team2).unwrap();
        m.record_point(Side::Team1).unwrap();
        m.request_approval("Ref Jane").unwrap();
        m.version = 7;

        let entity = MatchEntity::from(m.clone());
        assert_eq!(entity.team1_position, CourtPosition::Right);
        assert_eq!(entity.team2_position, CourtPosition::Left);
        assert_eq!(entity.status, MatchStatusEntity::Live);

        assert_eq!(Match::from(entity), m);
    }
}
