use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::{
    dto::{
        format_system_time,
        teams::PlayerSummary,
        validation::{validate_court_id, validate_not_blank},
    },
    state::model::{
        CourtPosition, MAX_SETS, Match, MatchStatus, MatchTeam, ScoreEvent, Set, Side,
    },
};

/// Payload scheduling a match between two teams of the same zone.
#[derive(Debug, Deserialize, ToSchema, Validate)]
#[validate(schema(function = "validate_distinct_teams"))]
pub struct CreateMatchRequest {
    /// First side.
    pub team1_id: Uuid,
    /// Second side; must differ from the first.
    pub team2_id: Uuid,
    /// Overrides the configured approval gate for this match.
    #[serde(default)]
    pub requires_approval: Option<bool>,
}

fn validate_distinct_teams(request: &CreateMatchRequest) -> Result<(), ValidationError> {
    if request.team1_id == request.team2_id {
        let mut err = ValidationError::new("distinct_teams");
        err.message = Some("A match needs two different teams".into());
        return Err(err);
    }
    Ok(())
}

/// Queue a match on a court.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct AssignCourtRequest {
    /// Court slug.
    #[validate(custom(function = "validate_court_id"))]
    pub court_id: String,
}

/// Award the rally to a side.
#[derive(Debug, Deserialize, ToSchema)]
pub struct RecordPointRequest {
    /// Side that won the rally.
    pub team: Side,
}

/// Close the current set.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct EndSetRequest {
    /// Side that won the set.
    pub winner: Side,
    /// Set the referee believes is being played. Repeating a request for an
    /// already closed set is then rejected instead of closing the next one.
    #[serde(default)]
    #[validate(range(min = 1, max = MAX_SETS))]
    pub set_number: Option<u8>,
}

/// Referee asking an administrator to close the match.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct ApprovalRequestBody {
    /// Name of the requesting referee.
    #[validate(length(min = 1, max = 64), custom(function = "validate_not_blank"))]
    pub requested_by: String,
}

/// Status exposed to clients; a pending approval is surfaced as its own state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum VisibleMatchStatus {
    /// Scheduled, not started.
    Upcoming,
    /// Being played.
    Live,
    /// Live, waiting for an administrator.
    PendingApproval,
    /// Finished.
    Completed,
}

impl From<&Match> for VisibleMatchStatus {
    fn from(value: &Match) -> Self {
        match value.status {
            MatchStatus::Upcoming => VisibleMatchStatus::Upcoming,
            MatchStatus::Live if value.is_pending_approval() => {
                VisibleMatchStatus::PendingApproval
            }
            MatchStatus::Live => VisibleMatchStatus::Live,
            MatchStatus::Completed => VisibleMatchStatus::Completed,
        }
    }
}

/// Optional filters for listing matches.
#[derive(Debug, Deserialize, IntoParams)]
pub struct MatchListQuery {
    /// Only matches in this state.
    pub status: Option<VisibleMatchStatus>,
    /// Only matches on this court.
    pub court_id: Option<String>,
    /// Only matches of this zone.
    pub zone: Option<String>,
}

impl MatchListQuery {
    /// Whether `m` passes every filter that was supplied.
    pub fn accepts(&self, m: &Match) -> bool {
        self.status
            .is_none_or(|status| VisibleMatchStatus::from(m) == status)
            && self
                .court_id
                .as_deref()
                .is_none_or(|court| m.court_id.as_deref() == Some(court))
            && self.zone.as_deref().is_none_or(|zone| m.team1.zone == zone)
    }
}

/// Team as embedded in a match.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MatchTeamSummary {
    /// Team id.
    pub id: Uuid,
    /// Team name.
    pub name: String,
    /// The doubles pair.
    pub players: Vec<PlayerSummary>,
    /// Zone of the team.
    pub zone: String,
}

impl From<&MatchTeam> for MatchTeamSummary {
    fn from(value: &MatchTeam) -> Self {
        Self {
            id: value.id,
            name: value.name.clone(),
            players: value.players.iter().map(Into::into).collect(),
            zone: value.zone.clone(),
        }
    }
}

/// Pair of per-side values.
#[derive(Debug, Clone, Copy, Serialize, ToSchema)]
pub struct SidePair<T> {
    /// Value of team1.
    pub team1: T,
    /// Value of team2.
    pub team2: T,
}

/// Score of one set.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SetSummary {
    /// 1-based position.
    pub set_number: u8,
    /// Points of team1.
    pub team1: u8,
    /// Points of team2.
    pub team2: u8,
    /// Set winner once closed.
    pub winner: Option<Side>,
    /// Closed sets are frozen.
    pub locked: bool,
}

impl From<&Set> for SetSummary {
    fn from(value: &Set) -> Self {
        Self {
            set_number: value.set_number,
            team1: value.score.team1,
            team2: value.score.team2,
            winner: value.winner,
            locked: value.locked,
        }
    }
}

/// One recorded rally.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ScoreEventSummary {
    /// Set the rally belongs to.
    pub set_number: u8,
    /// Rally winner.
    pub team: Side,
    /// Server before the rally.
    pub serve_before: Side,
    /// Server after the rally.
    pub serve_after: Side,
    /// RFC 3339 timestamp.
    pub timestamp: String,
}

impl From<&ScoreEvent> for ScoreEventSummary {
    fn from(value: &ScoreEvent) -> Self {
        Self {
            set_number: value.set_number,
            team: value.team,
            serve_before: value.serve_before,
            serve_after: value.serve_after,
            timestamp: format_system_time(value.timestamp),
        }
    }
}

/// Outstanding approval request.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ApprovalSummary {
    /// Requesting referee.
    pub requested_by: String,
    /// RFC 3339 timestamp of the request.
    pub requested_at: String,
}

/// Full match state as returned by every match route.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MatchSummary {
    /// Match id.
    pub id: Uuid,
    /// First side.
    pub team1: MatchTeamSummary,
    /// Second side.
    pub team2: MatchTeamSummary,
    /// Visible lifecycle state.
    pub status: VisibleMatchStatus,
    /// Sets won per side.
    pub sets_won: SidePair<u8>,
    /// Every opened set, oldest first.
    pub sets: Vec<SetSummary>,
    /// Number of the set being played.
    pub current_set: u8,
    /// Side holding the serve.
    pub serving: Side,
    /// Court half of each side.
    pub positions: SidePair<CourtPosition>,
    /// Winner once decided.
    pub winner: Option<Side>,
    /// Court the match is queued or played on.
    pub court_id: Option<String>,
    /// Position in the court queue.
    pub queue_order: Option<u32>,
    /// Whether an undo would currently revert a point.
    pub can_undo: bool,
    /// Pending approval request.
    pub approval: Option<ApprovalSummary>,
    /// Whether completion needs approval.
    pub requires_approval: bool,
    /// Rallies of the match, oldest first.
    pub history: Vec<ScoreEventSummary>,
    /// Revision bumped on every change.
    pub version: u64,
    /// RFC 3339 scheduling timestamp.
    pub created_at: String,
}

impl From<&Match> for MatchSummary {
    fn from(value: &Match) -> Self {
        Self {
            id: value.id,
            team1: (&value.team1).into(),
            team2: (&value.team2).into(),
            status: value.into(),
            sets_won: SidePair {
                team1: value.sets_won.team1,
                team2: value.sets_won.team2,
            },
            sets: value.sets.iter().map(Into::into).collect(),
            current_set: value.current_set_number,
            serving: value.serving,
            positions: SidePair {
                team1: value.position(Side::Team1),
                team2: value.position(Side::Team2),
            },
            winner: value.winner,
            court_id: value.court_id.clone(),
            queue_order: value.queue_order,
            can_undo: value.can_undo(),
            approval: value.approval.as_ref().map(|request| ApprovalSummary {
                requested_by: request.requested_by.clone(),
                requested_at: format_system_time(request.requested_at),
            }),
            requires_approval: value.requires_approval,
            history: value.history.iter().map(Into::into).collect(),
            version: value.version,
            created_at: format_system_time(value.created_at),
        }
    }
}

impl From<Match> for MatchSummary {
    fn from(value: Match) -> Self {
        (&value).into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::model::Player;

    fn team(name: &str) -> MatchTeam {
        MatchTeam {
            id: Uuid::new_v4(),
            name: name.into(),
            players: [
                Player {
                    id: Uuid::new_v4(),
                    name: "p1".into(),
                },
                Player {
                    id: Uuid::new_v4(),
                    name: "p2".into(),
                },
            ],
            zone: "zone-a".into(),
        }
    }

    #[test]
    fn pending_approval_is_exposed_as_status() {
        let mut m = Match::new(Uuid::new_v4(), team("A"), team("B"), false).unwrap();
        assert_eq!(VisibleMatchStatus::from(&m), VisibleMatchStatus::Upcoming);
        m.start().unwrap();
        m.request_approval("Ref Jane").unwrap();

        let summary = MatchSummary::from(&m);
        assert_eq!(summary.status, VisibleMatchStatus::PendingApproval);
        assert_eq!(
            summary.approval.map(|a| a.requested_by).as_deref(),
            Some("Ref Jane")
        );
        assert!(!summary.can_undo);
    }

    #[test]
    fn summary_serializes_snake_case_sides() {
        let mut m = Match::new(Uuid::new_v4(), team("A"), team("B"), false).unwrap();
        m.start().unwrap();
        m.record_point(Side::Team2).unwrap();

        let json = serde_json::to_value(MatchSummary::from(&m)).unwrap();
        assert_eq!(json["serving"], "team2");
        assert_eq!(json["status"], "live");
        assert_eq!(json["positions"]["team1"], "left");
        assert_eq!(json["sets"][0]["team2"], 1);
        assert_eq!(json["can_undo"], true);
    }

    #[test]
    fn list_query_filters_on_status_and_court() {
        let mut m = Match::new(Uuid::new_v4(), team("A"), team("B"), false).unwrap();
        m.assign_court("court-1".into(), 0).unwrap();

        let query = MatchListQuery {
            status: Some(VisibleMatchStatus::Upcoming),
            court_id: Some("court-1".into()),
            zone: None,
        };
        assert!(query.accepts(&m));

        let other_court = MatchListQuery {
            court_id: Some("court-2".into()),
            ..query
        };
        assert!(!other_court.accepts(&m));
    }

    #[test]
    fn identical_teams_fail_validation() {
        let id = Uuid::new_v4();
        let request = CreateMatchRequest {
            team1_id: id,
            team2_id: id,
            requires_approval: None,
        };
        assert!(request.validate().is_err());
    }
}
