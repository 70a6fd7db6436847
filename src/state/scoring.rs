//! Rally-point scoring rules: point recording, set closing and single-step undo.

use std::time::SystemTime;

use crate::state::model::{
    MAX_SET_POINTS, MAX_SETS, Match, MatchError, MatchOutcome, MatchStatus, SETS_TO_WIN,
    ScoreEvent, Set, Side,
};

/// What an undo request ended up doing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UndoOutcome {
    /// The last event of the current set was reverted.
    Reverted(ScoreEvent),
    /// Nothing in the current set can be undone.
    NothingToUndo,
}

/// What closing a set led to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetEnd {
    /// A new set was opened at 0-0.
    NextSet {
        /// Number of the freshly opened set.
        set_number: u8,
    },
    /// One side reached the winning set count but the match awaits confirmation.
    AwaitingConfirmation {
        /// Side that reached the winning set count.
        winner: Side,
    },
    /// The match reached its terminal state.
    MatchCompleted(MatchOutcome),
}

impl Match {
    fn ensure_scorable(&self, action: &str) -> Result<(), MatchError> {
        if self.status != MatchStatus::Live {
            return Err(MatchError::InvalidState(format!(
                "cannot {action} while match is {:?}",
                self.status
            )));
        }
        if self.is_pending_approval() {
            return Err(MatchError::InvalidState(format!(
                "cannot {action} while approval is pending"
            )));
        }
        Ok(())
    }

    fn unlocked_current_set(&self) -> Result<&Set, MatchError> {
        let set = self
            .current_set()
            .ok_or_else(|| missing_set(self.current_set_number))?;
        ensure_unlocked(set)?;
        Ok(set)
    }

    fn unlocked_current_set_mut(&mut self) -> Result<&mut Set, MatchError> {
        let current = self.current_set_number;
        let set = self.current_set_mut().ok_or_else(|| missing_set(current))?;
        ensure_unlocked(set)?;
        Ok(set)
    }

    /// Award the rally to `team`: the winner of the point serves next.
    pub fn record_point(&mut self, team: Side) -> Result<(), MatchError> {
        self.ensure_scorable("record a point")?;
        let event = ScoreEvent {
            set_number: self.current_set_number,
            team,
            serve_before: self.serving,
            serve_after: team,
            timestamp: SystemTime::now(),
        };

        let set = self.unlocked_current_set_mut()?;
        if set.score.get(team) >= MAX_SET_POINTS {
            return Err(MatchError::InvariantViolation(format!(
                "set {} cannot exceed {MAX_SET_POINTS} points",
                set.set_number
            )));
        }
        *set.score.get_mut(team) += 1;
        self.serving = team;
        self.history.push(event);
        Ok(())
    }

    /// Close the current set in favour of `winner`.
    ///
    /// The next set starts at 0-0 with ends swapped and the set winner
    /// serving. Reaching the winning set count completes the match unless the
    /// match was scheduled behind an approval gate.
    pub fn end_set(&mut self, winner: Side) -> Result<SetEnd, MatchError> {
        let set_number = self.unlocked_current_set()?.set_number;
        self.ensure_scorable("end a set")?;

        let sets_after = self.sets_won.get(winner) + 1;
        let decisive = sets_after >= SETS_TO_WIN;
        if !decisive && set_number >= MAX_SETS {
            return Err(MatchError::InvariantViolation(format!(
                "set {set_number} is the last set of a best-of-{MAX_SETS} match"
            )));
        }

        let set = self.unlocked_current_set_mut()?;
        set.winner = Some(winner);
        set.locked = true;
        *self.sets_won.get_mut(winner) = sets_after;

        if decisive {
            if self.requires_approval {
                return Ok(SetEnd::AwaitingConfirmation { winner });
            }
            return Ok(SetEnd::MatchCompleted(self.complete(winner)));
        }

        let next = set_number + 1;
        self.team1_position = self.team1_position.opposite();
        self.sets.push(Set::new(next));
        self.current_set_number = next;
        self.serving = winner;
        Ok(SetEnd::NextSet { set_number: next })
    }

    /// Revert the most recent point of the current set.
    ///
    /// Events recorded in an earlier set are frozen; an empty log (or one
    /// whose tail belongs to another set) is a no-op.
    pub fn undo_last_score(&mut self) -> Result<UndoOutcome, MatchError> {
        self.ensure_scorable("undo a point")?;
        let current_set_number = self.current_set_number;
        let last = self.history.last().cloned();
        let set = self.unlocked_current_set_mut()?;

        let Some(event) = last.filter(|event| event.set_number == current_set_number) else {
            return Ok(UndoOutcome::NothingToUndo);
        };
        if set.score.get(event.team) == 0 {
            return Err(MatchError::InvariantViolation(format!(
                "undo would drive set {} below zero",
                set.set_number
            )));
        }
        *set.score.get_mut(event.team) -= 1;
        self.serving = event.serve_before;
        self.history.pop();
        Ok(UndoOutcome::Reverted(event))
    }
}

fn missing_set(set_number: u8) -> MatchError {
    MatchError::InvariantViolation(format!("current set {set_number} does not exist"))
}

fn ensure_unlocked(set: &Set) -> Result<(), MatchError> {
    if set.locked {
        return Err(MatchError::AlreadyLocked {
            set_number: set.set_number,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::model::{CourtPosition, MatchTeam, Player, SideScore};
    use uuid::Uuid;

    fn team(name: &str) -> MatchTeam {
        MatchTeam {
            id: Uuid::new_v4(),
            name: name.into(),
            players: [
                Player {
                    id: Uuid::new_v4(),
                    name: format!("{name} A"),
                },
                Player {
                    id: Uuid::new_v4(),
                    name: format!("{name} B"),
                },
            ],
            zone: "zone-a".into(),
        }
    }

    fn live_match() -> Match {
        let mut m = Match::new(Uuid::new_v4(), team("Alpha"), team("Beta"), false).unwrap();
        m.start().unwrap();
        m
    }

    fn score(m: &mut Match, side: Side, times: usize) {
        for _ in 0..times {
            m.record_point(side).unwrap();
        }
    }

    #[test]
    fn point_winner_serves_next() {
        let mut m = live_match();
        assert_eq!(m.serving, Side::Team1);
        m.record_point(Side::Team2).unwrap();
        assert_eq!(m.serving, Side::Team2);
        m.record_point(Side::Team2).unwrap();
        assert_eq!(m.serving, Side::Team2);
        m.record_point(Side::Team1).unwrap();
        assert_eq!(m.serving, Side::Team1);

        let last = m.history.last().unwrap();
        assert_eq!(last.serve_before, Side::Team2);
        assert_eq!(last.serve_after, Side::Team1);
        assert_eq!(m.current_set().unwrap().score, SideScore { team1: 1, team2: 2 });
    }

    #[test]
    fn missing_current_set_is_reported_not_skipped() {
        let mut m = live_match();
        score(&mut m, Side::Team2, 1);
        m.sets.clear();
        let before = m.clone();

        for result in [
            m.record_point(Side::Team1).map(|_| ()),
            m.end_set(Side::Team1).map(|_| ()),
            m.undo_last_score().map(|_| ()),
        ] {
            assert!(matches!(result, Err(MatchError::InvariantViolation(_))));
        }
        assert_eq!(m, before);
    }

    #[test]
    fn first_set_win_opens_next_set() {
        let mut m = live_match();
        score(&mut m, Side::Team1, 5);
        score(&mut m, Side::Team2, 3);

        let end = m.end_set(Side::Team1).unwrap();
        assert_eq!(end, SetEnd::NextSet { set_number: 2 });

        let first = &m.sets[0];
        assert_eq!(first.score, SideScore { team1: 5, team2: 3 });
        assert_eq!(first.winner, Some(Side::Team1));
        assert!(first.locked);

        assert_eq!(m.sets_won, SideScore { team1: 1, team2: 0 });
        assert_eq!(m.current_set_number, 2);
        assert_eq!(m.current_set().unwrap().score, SideScore::default());
        assert_eq!(m.serving, Side::Team1);
        assert_eq!(m.position(Side::Team1), CourtPosition::Right);
        assert_eq!(m.position(Side::Team2), CourtPosition::Left);
    }

    #[test]
    fn set_winner_serves_first_in_next_set() {
        let mut m = live_match();
        score(&mut m, Side::Team1, 3);
        m.end_set(Side::Team2).unwrap();
        assert_eq!(m.serving, Side::Team2);
    }

    #[test]
    fn undo_walks_back_within_current_set() {
        let mut m = live_match();
        score(&mut m, Side::Team1, 5);
        score(&mut m, Side::Team2, 3);
        m.end_set(Side::Team1).unwrap();

        score(&mut m, Side::Team2, 2);
        let history_len = m.history.len();
        let outcome = m.undo_last_score().unwrap();

        assert!(matches!(outcome, UndoOutcome::Reverted(ref e) if e.team == Side::Team2));
        assert_eq!(m.current_set().unwrap().score, SideScore { team1: 0, team2: 1 });
        assert_eq!(m.serving, Side::Team2);
        assert_eq!(m.history.len(), history_len - 1);

        m.undo_last_score().unwrap();
        assert_eq!(m.current_set().unwrap().score, SideScore::default());
        assert_eq!(m.serving, Side::Team1);
    }

    #[test]
    fn undo_is_exact_inverse_of_record_point() {
        let mut m = live_match();
        score(&mut m, Side::Team2, 4);
        for side in [Side::Team1, Side::Team2] {
            let before = m.clone();
            m.record_point(side).unwrap();
            m.undo_last_score().unwrap();
            assert_eq!(m, before);
        }
    }

    #[test]
    fn undo_does_not_cross_set_boundary() {
        let mut m = live_match();
        score(&mut m, Side::Team1, 2);
        m.end_set(Side::Team1).unwrap();

        let before = m.clone();
        assert_eq!(m.undo_last_score().unwrap(), UndoOutcome::NothingToUndo);
        assert_eq!(m, before);
        assert!(!m.can_undo());
    }

    #[test]
    fn undo_with_empty_history_is_noop() {
        let mut m = live_match();
        let before = m.clone();
        assert_eq!(m.undo_last_score().unwrap(), UndoOutcome::NothingToUndo);
        assert_eq!(m, before);
    }

    #[test]
    fn undo_below_zero_is_invariant_violation() {
        let mut m = live_match();
        m.record_point(Side::Team1).unwrap();
        m.sets[0].score.team1 = 0;
        let before = m.clone();
        assert!(matches!(
            m.undo_last_score(),
            Err(MatchError::InvariantViolation(_))
        ));
        assert_eq!(m, before);
    }

    #[test]
    fn deciding_set_completes_match() {
        let mut m = live_match();
        m.court_id = Some("court-1".into());
        m.queue_order = Some(0);
        score(&mut m, Side::Team1, 4);
        m.end_set(Side::Team1).unwrap();
        score(&mut m, Side::Team2, 6);
        m.end_set(Side::Team2).unwrap();
        assert_eq!(m.sets_won, SideScore { team1: 1, team2: 1 });

        score(&mut m, Side::Team2, 2);
        let end = m.end_set(Side::Team2).unwrap();

        assert_eq!(m.sets_won, SideScore { team1: 1, team2: 2 });
        assert_eq!(m.status, MatchStatus::Completed);
        assert_eq!(m.winner, Some(Side::Team2));
        assert_eq!(m.team(Side::Team2).name, "Beta");
        assert_eq!(m.court_id, None);
        assert_eq!(m.queue_order, None);
        assert_eq!(
            end,
            SetEnd::MatchCompleted(MatchOutcome {
                winner: Side::Team2,
                team1_points: 4,
                team2_points: 8,
            })
        );
    }

    #[test]
    fn deciding_set_waits_behind_approval_gate() {
        let mut m = live_match();
        m.requires_approval = true;
        m.end_set(Side::Team1).unwrap();
        let end = m.end_set(Side::Team1).unwrap();

        assert_eq!(end, SetEnd::AwaitingConfirmation { winner: Side::Team1 });
        assert_eq!(m.status, MatchStatus::Live);
        assert_eq!(m.decided_winner(), Some(Side::Team1));
        assert_eq!(m.sets.len(), 2);
        assert!(matches!(
            m.record_point(Side::Team2),
            Err(MatchError::AlreadyLocked { set_number: 2 })
        ));
    }

    #[test]
    fn scoring_rejected_on_non_live_match() {
        let mut m = Match::new(Uuid::new_v4(), team("Alpha"), team("Beta"), false).unwrap();
        let before = m.clone();
        assert!(matches!(
            m.record_point(Side::Team1),
            Err(MatchError::InvalidState(_))
        ));
        assert!(matches!(m.undo_last_score(), Err(MatchError::InvalidState(_))));
        assert_eq!(m, before);
    }

    #[test]
    fn scoring_rejected_on_completed_match() {
        let mut m = live_match();
        m.end_set(Side::Team1).unwrap();
        m.end_set(Side::Team1).unwrap();
        let before = m.clone();

        assert!(matches!(
            m.record_point(Side::Team1),
            Err(MatchError::InvalidState(_))
        ));
        assert_eq!(m, before);
    }

    #[test]
    fn ending_locked_set_is_rejected() {
        let mut m = live_match();
        m.end_set(Side::Team1).unwrap();
        m.end_set(Side::Team1).unwrap();
        let before = m.clone();

        assert_eq!(
            m.end_set(Side::Team2),
            Err(MatchError::AlreadyLocked { set_number: 2 })
        );
        assert_eq!(m, before);
    }

    #[test]
    fn set_score_is_capped() {
        let mut m = live_match();
        score(&mut m, Side::Team1, usize::from(MAX_SET_POINTS));
        let before = m.clone();
        assert!(matches!(
            m.record_point(Side::Team1),
            Err(MatchError::InvariantViolation(_))
        ));
        assert_eq!(m, before);
    }

    #[test]
    fn pending_approval_blocks_scoring() {
        let mut m = live_match();
        m.request_approval("Ref Jane").unwrap();
        assert!(matches!(
            m.record_point(Side::Team1),
            Err(MatchError::InvalidState(_))
        ));
        assert!(matches!(m.end_set(Side::Team1), Err(MatchError::InvalidState(_))));
    }
}
