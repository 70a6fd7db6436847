use std::time::SystemTime;

use thiserror::Error;
use uuid::Uuid;

use crate::state::{
    model::{
        ApprovalRequest, CourtPosition, Match, MatchError, MatchOutcome, MatchStatus, MatchTeam,
        Set, Side, SideScore,
    },
    scoring::{SetEnd, UndoOutcome},
};

/// Commands a caller can apply to a match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchCommand {
    /// Queue an upcoming match at the given position of a court.
    AssignCourt {
        /// Court receiving the match.
        court_id: String,
        /// Position at the tail of that court's queue.
        queue_order: u32,
    },
    /// Referee opens play.
    Start,
    /// Award a rally to a side.
    RecordPoint(Side),
    /// Close the current set.
    EndSet {
        /// Side declared winner of the set.
        winner: Side,
        /// Set the caller believes is current; a locked set is rejected.
        set_number: Option<u8>,
    },
    /// Revert the last point of the current set.
    Undo,
    /// Referee asks an administrator to close the match.
    RequestApproval {
        /// Name of the requesting referee.
        requested_by: String,
    },
    /// Administrator confirms the pending request.
    Approve,
    /// Administrator turns down the pending request.
    Reject,
    /// Close a decided match without going through approval.
    Finish,
}

impl MatchCommand {
    /// Whether accepting the command can move the match to its terminal state.
    pub fn may_complete(&self) -> bool {
        matches!(
            self,
            MatchCommand::EndSet { .. } | MatchCommand::Approve | MatchCommand::Finish
        )
    }
}

/// Effect of a command on the match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Command accepted but nothing changed.
    Unchanged,
    /// Match state changed.
    Updated,
    /// Match reached its terminal state.
    Completed(MatchOutcome),
}

/// Error returned when a command targets a match in the wrong status.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid transition: {command:?} cannot be applied while match is {from:?}")]
pub struct InvalidTransition {
    /// Status the match was in.
    pub from: MatchStatus,
    /// Rejected command.
    pub command: MatchCommand,
}

impl From<InvalidTransition> for MatchError {
    fn from(err: InvalidTransition) -> Self {
        MatchError::InvalidState(err.to_string())
    }
}

impl Match {
    /// Schedule a new match between two teams of the same zone.
    ///
    /// The match starts upcoming with set 1 at 0-0, team1 serving from the left.
    pub fn new(
        id: Uuid,
        team1: MatchTeam,
        team2: MatchTeam,
        requires_approval: bool,
    ) -> Result<Self, MatchError> {
        if team1.id == team2.id {
            return Err(MatchError::Validation(
                "a team cannot play against itself".into(),
            ));
        }
        if team1.zone != team2.zone {
            return Err(MatchError::Validation(format!(
                "teams belong to different zones (`{}` vs `{}`)",
                team1.zone, team2.zone
            )));
        }

        Ok(Self {
            id,
            team1,
            team2,
            sets_won: SideScore::default(),
            sets: vec![Set::new(1)],
            current_set_number: 1,
            serving: Side::Team1,
            team1_position: CourtPosition::Left,
            status: MatchStatus::Upcoming,
            winner: None,
            court_id: None,
            queue_order: None,
            history: Vec::new(),
            approval: None,
            requires_approval,
            created_at: SystemTime::now(),
            version: 0,
        })
    }

    /// Apply a command, leaving the match untouched when it is rejected.
    pub fn apply(&mut self, command: MatchCommand) -> Result<Transition, MatchError> {
        match command {
            MatchCommand::AssignCourt {
                court_id,
                queue_order,
            } => self.assign_court(court_id, queue_order),
            MatchCommand::Start => self.start(),
            MatchCommand::RecordPoint(side) => {
                self.record_point(side)?;
                Ok(Transition::Updated)
            }
            MatchCommand::EndSet { winner, set_number } => {
                if let Some(expected) = set_number {
                    self.ensure_targets_current_set(expected)?;
                }
                Ok(match self.end_set(winner)? {
                    SetEnd::MatchCompleted(outcome) => Transition::Completed(outcome),
                    SetEnd::NextSet { .. } | SetEnd::AwaitingConfirmation { .. } => {
                        Transition::Updated
                    }
                })
            }
            MatchCommand::Undo => Ok(match self.undo_last_score()? {
                UndoOutcome::Reverted(_) => Transition::Updated,
                UndoOutcome::NothingToUndo => Transition::Unchanged,
            }),
            MatchCommand::RequestApproval { requested_by } => self.request_approval(&requested_by),
            MatchCommand::Approve => self.approve(),
            MatchCommand::Reject => self.reject(),
            MatchCommand::Finish => self.finish(),
        }
    }

    fn ensure_targets_current_set(&self, set_number: u8) -> Result<(), MatchError> {
        let set = self
            .sets
            .iter()
            .find(|set| set.set_number == set_number)
            .ok_or_else(|| MatchError::Validation(format!("set {set_number} does not exist")))?;
        if set.locked {
            return Err(MatchError::AlreadyLocked { set_number });
        }
        if set_number != self.current_set_number {
            return Err(MatchError::Validation(format!(
                "set {set_number} is not the current set ({})",
                self.current_set_number
            )));
        }
        Ok(())
    }

    fn invalid(&self, command: MatchCommand) -> MatchError {
        InvalidTransition {
            from: self.status,
            command,
        }
        .into()
    }

    /// Queue the match on a court. Only upcoming matches can be (re)assigned.
    pub fn assign_court(
        &mut self,
        court_id: String,
        queue_order: u32,
    ) -> Result<Transition, MatchError> {
        if self.status != MatchStatus::Upcoming {
            return Err(self.invalid(MatchCommand::AssignCourt {
                court_id,
                queue_order,
            }));
        }
        if self.court_id.as_deref() == Some(court_id.as_str()) {
            return Ok(Transition::Unchanged);
        }
        self.court_id = Some(court_id);
        self.queue_order = Some(queue_order);
        Ok(Transition::Updated)
    }

    /// upcoming → live. Starting a live match is a no-op.
    pub fn start(&mut self) -> Result<Transition, MatchError> {
        match self.status {
            MatchStatus::Upcoming => {
                self.status = MatchStatus::Live;
                Ok(Transition::Updated)
            }
            MatchStatus::Live => Ok(Transition::Unchanged),
            MatchStatus::Completed => Err(self.invalid(MatchCommand::Start)),
        }
    }

    /// Flag a live match as awaiting administrator confirmation.
    pub fn request_approval(&mut self, requested_by: &str) -> Result<Transition, MatchError> {
        let requested_by = requested_by.trim();
        if self.status != MatchStatus::Live {
            return Err(self.invalid(MatchCommand::RequestApproval {
                requested_by: requested_by.to_string(),
            }));
        }
        if self.is_pending_approval() {
            return Err(MatchError::InvalidState(
                "an approval request is already pending".into(),
            ));
        }
        if requested_by.is_empty() {
            return Err(MatchError::Validation(
                "requester name must not be empty".into(),
            ));
        }
        self.approval = Some(ApprovalRequest {
            requested_by: requested_by.to_string(),
            requested_at: SystemTime::now(),
        });
        Ok(Transition::Updated)
    }

    /// Confirm a pending request, completing the match.
    pub fn approve(&mut self) -> Result<Transition, MatchError> {
        if !self.is_pending_approval() {
            return Err(MatchError::InvalidState(
                "no approval request is pending".into(),
            ));
        }
        let winner = self.require_decided()?;
        Ok(Transition::Completed(self.complete(winner)))
    }

    /// Turn down a pending request; the referee keeps control of the match.
    pub fn reject(&mut self) -> Result<Transition, MatchError> {
        if !self.is_pending_approval() {
            return Err(MatchError::InvalidState(
                "no approval request is pending".into(),
            ));
        }
        self.approval = None;
        Ok(Transition::Updated)
    }

    /// Complete a decided live match directly.
    pub fn finish(&mut self) -> Result<Transition, MatchError> {
        if self.status != MatchStatus::Live {
            return Err(self.invalid(MatchCommand::Finish));
        }
        let winner = self.require_decided()?;
        Ok(Transition::Completed(self.complete(winner)))
    }

    fn require_decided(&self) -> Result<Side, MatchError> {
        self.decided_winner().ok_or_else(|| {
            MatchError::InvalidState(format!(
                "match is not decided yet ({}-{} in sets)",
                self.sets_won.team1, self.sets_won.team2
            ))
        })
    }

    pub(crate) fn complete(&mut self, winner: Side) -> MatchOutcome {
        self.status = MatchStatus::Completed;
        self.winner = Some(winner);
        self.court_id = None;
        self.queue_order = None;
        self.approval = None;
        MatchOutcome {
            winner,
            team1_points: self.points_scored(Side::Team1),
            team2_points: self.points_scored(Side::Team2),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::model::Player;

    fn team(name: &str, zone: &str) -> MatchTeam {
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
            zone: zone.into(),
        }
    }

    fn new_match() -> Match {
        Match::new(
            Uuid::new_v4(),
            team("Alpha", "zone-a"),
            team("Beta", "zone-a"),
            false,
        )
        .unwrap()
    }

    fn apply(m: &mut Match, command: MatchCommand) -> Transition {
        m.apply(command).unwrap()
    }

    #[test]
    fn only_closing_commands_may_complete() {
        let closing = [
            MatchCommand::EndSet {
                winner: Side::Team1,
                set_number: None,
            },
            MatchCommand::Approve,
            MatchCommand::Finish,
        ];
        assert!(closing.iter().all(MatchCommand::may_complete));

        let others = [
            MatchCommand::Start,
            MatchCommand::RecordPoint(Side::Team2),
            MatchCommand::Undo,
            MatchCommand::Reject,
            MatchCommand::RequestApproval {
                requested_by: "Ref Kim".into(),
            },
        ];
        assert!(!others.iter().any(MatchCommand::may_complete));
    }

    #[test]
    fn new_match_is_upcoming_with_first_set_open() {
        let m = new_match();
        assert_eq!(m.status, MatchStatus::Upcoming);
        assert_eq!(m.sets, vec![Set::new(1)]);
        assert_eq!(m.current_set_number, 1);
        assert_eq!(m.serving, Side::Team1);
        assert_eq!(m.position(Side::Team1), CourtPosition::Left);
        assert_eq!(m.position(Side::Team2), CourtPosition::Right);
        assert!(m.history.is_empty());
    }

    #[test]
    fn cross_zone_match_is_rejected() {
        let err = Match::new(
            Uuid::new_v4(),
            team("Alpha", "zone-a"),
            team("Gamma", "zone-b"),
            false,
        )
        .unwrap_err();
        assert!(matches!(err, MatchError::Validation(_)));
    }

    #[test]
    fn same_team_twice_is_rejected() {
        let alpha = team("Alpha", "zone-a");
        let err = Match::new(Uuid::new_v4(), alpha.clone(), alpha, false).unwrap_err();
        assert!(matches!(err, MatchError::Validation(_)));
    }

    #[test]
    fn full_happy_path_through_match() {
        let mut m = new_match();
        assert_eq!(
            apply(
                &mut m,
                MatchCommand::AssignCourt {
                    court_id: "court-1".into(),
                    queue_order: 0,
                }
            ),
            Transition::Updated
        );
        assert_eq!(m.status, MatchStatus::Upcoming);
        assert_eq!(apply(&mut m, MatchCommand::Start), Transition::Updated);
        assert_eq!(m.status, MatchStatus::Live);
        assert_eq!(m.court_id.as_deref(), Some("court-1"));

        apply(&mut m, MatchCommand::RecordPoint(Side::Team1));
        apply(
            &mut m,
            MatchCommand::EndSet {
                winner: Side::Team1,
                set_number: Some(1),
            },
        );
        apply(&mut m, MatchCommand::RecordPoint(Side::Team1));
        let last = apply(
            &mut m,
            MatchCommand::EndSet {
                winner: Side::Team1,
                set_number: Some(2),
            },
        );

        assert_eq!(
            last,
            Transition::Completed(MatchOutcome {
                winner: Side::Team1,
                team1_points: 2,
                team2_points: 0,
            })
        );
        assert_eq!(m.status, MatchStatus::Completed);
        assert_eq!(m.court_id, None);
    }

    #[test]
    fn start_is_idempotent_while_live() {
        let mut m = new_match();
        apply(&mut m, MatchCommand::Start);
        assert_eq!(apply(&mut m, MatchCommand::Start), Transition::Unchanged);
    }

    #[test]
    fn start_rejected_once_completed() {
        let mut m = new_match();
        apply(&mut m, MatchCommand::Start);
        m.end_set(Side::Team2).unwrap();
        m.end_set(Side::Team2).unwrap();
        assert!(matches!(
            m.apply(MatchCommand::Start),
            Err(MatchError::InvalidState(_))
        ));
    }

    #[test]
    fn assigning_live_match_is_rejected() {
        let mut m = new_match();
        apply(&mut m, MatchCommand::Start);
        let err = m
            .apply(MatchCommand::AssignCourt {
                court_id: "court-2".into(),
                queue_order: 3,
            })
            .unwrap_err();
        assert!(matches!(err, MatchError::InvalidState(_)));
    }

    #[test]
    fn ending_same_set_twice_is_rejected() {
        let mut m = new_match();
        apply(&mut m, MatchCommand::Start);
        let end_first = MatchCommand::EndSet {
            winner: Side::Team1,
            set_number: Some(1),
        };
        apply(&mut m, end_first.clone());
        let before = m.clone();

        assert_eq!(
            m.apply(end_first),
            Err(MatchError::AlreadyLocked { set_number: 1 })
        );
        assert_eq!(m, before);
    }

    #[test]
    fn approval_workflow_completes_decided_match() {
        let mut m = new_match();
        m.requires_approval = true;
        apply(&mut m, MatchCommand::Start);
        m.end_set(Side::Team1).unwrap();
        m.end_set(Side::Team2).unwrap();
        m.record_point(Side::Team1).unwrap();
        m.end_set(Side::Team1).unwrap();
        assert_eq!(m.status, MatchStatus::Live);

        apply(
            &mut m,
            MatchCommand::RequestApproval {
                requested_by: "Ref Jane".into(),
            },
        );
        assert!(m.is_pending_approval());

        let outcome = apply(&mut m, MatchCommand::Approve);
        assert!(matches!(
            outcome,
            Transition::Completed(MatchOutcome {
                winner: Side::Team1,
                ..
            })
        ));
        assert!(!m.is_pending_approval());
        assert_eq!(m.winner, Some(Side::Team1));
    }

    #[test]
    fn reject_returns_control_to_referee() {
        let mut m = new_match();
        apply(&mut m, MatchCommand::Start);
        apply(
            &mut m,
            MatchCommand::RequestApproval {
                requested_by: "Ref Jane".into(),
            },
        );
        apply(&mut m, MatchCommand::Reject);

        assert!(!m.is_pending_approval());
        assert_eq!(m.status, MatchStatus::Live);
        apply(&mut m, MatchCommand::RecordPoint(Side::Team2));
    }

    #[test]
    fn approve_rejects_undecided_match() {
        let mut m = new_match();
        apply(&mut m, MatchCommand::Start);
        m.end_set(Side::Team1).unwrap();
        apply(
            &mut m,
            MatchCommand::RequestApproval {
                requested_by: "Ref Jane".into(),
            },
        );
        let before = m.clone();

        assert!(matches!(
            m.apply(MatchCommand::Approve),
            Err(MatchError::InvalidState(_))
        ));
        assert_eq!(m, before);
    }

    #[test]
    fn finish_requires_best_of_three_completion() {
        let mut m = new_match();
        m.requires_approval = true;
        apply(&mut m, MatchCommand::Start);
        m.end_set(Side::Team2).unwrap();
        assert!(matches!(
            m.apply(MatchCommand::Finish),
            Err(MatchError::InvalidState(_))
        ));

        m.end_set(Side::Team2).unwrap();
        let outcome = apply(&mut m, MatchCommand::Finish);
        assert!(matches!(
            outcome,
            Transition::Completed(MatchOutcome {
                winner: Side::Team2,
                ..
            })
        ));
    }

    #[test]
    fn duplicate_approval_request_is_rejected() {
        let mut m = new_match();
        apply(&mut m, MatchCommand::Start);
        m.request_approval("Ref Jane").unwrap();
        assert!(matches!(
            m.request_approval("Ref John"),
            Err(MatchError::InvalidState(_))
        ));
        assert_eq!(
            m.approval.as_ref().map(|a| a.requested_by.as_str()),
            Some("Ref Jane")
        );
    }
}
