//! Domain model of a badminton tournament: teams, matches, sets and the undo log.

use std::time::SystemTime;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;
use uuid::Uuid;

/// Sets a side must win to take the match (best-of-3).
pub const SETS_TO_WIN: u8 = 2;
/// Upper bound on the number of sets a match can open.
pub const MAX_SETS: u8 = 3;
/// Highest score a side can reach within a single set.
pub const MAX_SET_POINTS: u8 = 17;

/// One of the two sides of a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    /// First team listed on the match.
    Team1,
    /// Second team listed on the match.
    Team2,
}

impl Side {
    /// The other side of the net.
    pub fn opponent(self) -> Self {
        match self {
            Side::Team1 => Side::Team2,
            Side::Team2 => Side::Team1,
        }
    }
}

/// Half of the court a team currently occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum CourtPosition {
    /// Left half as seen from the umpire chair.
    Left,
    /// Right half as seen from the umpire chair.
    Right,
}

impl CourtPosition {
    /// The complementary half.
    pub fn opposite(self) -> Self {
        match self {
            CourtPosition::Left => CourtPosition::Right,
            CourtPosition::Right => CourtPosition::Left,
        }
    }
}

/// Pair of per-side counters, used both for set points and for sets won.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SideScore {
    /// Counter for [`Side::Team1`].
    pub team1: u8,
    /// Counter for [`Side::Team2`].
    pub team2: u8,
}

impl SideScore {
    /// Read the counter of `side`.
    pub fn get(&self, side: Side) -> u8 {
        match side {
            Side::Team1 => self.team1,
            Side::Team2 => self.team2,
        }
    }

    /// Mutable access to the counter of `side`.
    pub fn get_mut(&mut self, side: Side) -> &mut u8 {
        match side {
            Side::Team1 => &mut self.team1,
            Side::Team2 => &mut self.team2,
        }
    }
}

/// A single game within a match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Set {
    /// 1-based position of the set within the match.
    pub set_number: u8,
    /// Rally points scored by each side in this set.
    pub score: SideScore,
    /// Side declared winner when the set was ended.
    pub winner: Option<Side>,
    /// Once locked, the set score is frozen.
    pub locked: bool,
}

impl Set {
    /// A fresh set at 0-0.
    pub fn new(set_number: u8) -> Self {
        Self {
            set_number,
            score: SideScore::default(),
            winner: None,
            locked: false,
        }
    }
}

/// Undo log entry appended for every recorded point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreEvent {
    /// Set the point was scored in.
    pub set_number: u8,
    /// Side that won the rally.
    pub team: Side,
    /// Serving side before the rally.
    pub serve_before: Side,
    /// Serving side after the rally.
    pub serve_after: Side,
    /// When the point was recorded.
    pub timestamp: SystemTime,
}

/// Coarse lifecycle status of a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchStatus {
    /// Scheduled, possibly queued on a court, not yet started.
    Upcoming,
    /// Being played; scoring is allowed.
    Live,
    /// Terminal state.
    Completed,
}

/// Pending request from a referee asking an administrator to close the match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApprovalRequest {
    /// Name of the referee who asked for the approval.
    pub requested_by: String,
    /// When the request was filed.
    pub requested_at: SystemTime,
}

/// A registered player.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Player {
    /// Stable identifier of the player.
    pub id: Uuid,
    /// Display name.
    pub name: String,
}

/// Cumulative team statistics.
///
/// `outcome_points` is the standings currency awarded per result while
/// `points_scored` tallies the rally points the team won across all sets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TeamStats {
    /// Completed matches won.
    pub matches_won: u32,
    /// Completed matches lost.
    pub matches_lost: u32,
    /// Points awarded per match result.
    pub outcome_points: u32,
    /// Rally points scored in completed matches.
    pub points_scored: u32,
}

/// A doubles pair registered in a zone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Team {
    /// Stable identifier of the team.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// The two players of the pair, in registration order.
    pub players: [Player; 2],
    /// Zone the team competes in.
    pub zone: String,
    /// Cumulative statistics, only mutated when a match completes or on recalculation.
    pub stats: TeamStats,
}

/// Snapshot of a team embedded into a match (statistics excluded).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchTeam {
    /// Identifier of the underlying team.
    pub id: Uuid,
    /// Team name at scheduling time.
    pub name: String,
    /// Players at scheduling time.
    pub players: [Player; 2],
    /// Zone of the team.
    pub zone: String,
}

impl From<&Team> for MatchTeam {
    fn from(team: &Team) -> Self {
        Self {
            id: team.id,
            name: team.name.clone(),
            players: team.players.clone(),
            zone: team.zone.clone(),
        }
    }
}

/// Authoritative record of one contest's progress.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Match {
    /// Stable identifier of the match.
    pub id: Uuid,
    /// Team playing as [`Side::Team1`].
    pub team1: MatchTeam,
    /// Team playing as [`Side::Team2`].
    pub team2: MatchTeam,
    /// Sets won by each side.
    pub sets_won: SideScore,
    /// Sets opened so far, ordered by set number.
    pub sets: Vec<Set>,
    /// Number of the set currently being played (or the last one once locked).
    pub current_set_number: u8,
    /// Side that serves the next rally.
    pub serving: Side,
    /// Half occupied by team1; team2 always holds the opposite half.
    pub team1_position: CourtPosition,
    /// Lifecycle status.
    pub status: MatchStatus,
    /// Winning side once completed.
    pub winner: Option<Side>,
    /// Court the match is queued on.
    pub court_id: Option<String>,
    /// Position within the court queue.
    pub queue_order: Option<u32>,
    /// Append-only log of recorded points.
    pub history: Vec<ScoreEvent>,
    /// Outstanding referee request awaiting an administrator.
    pub approval: Option<ApprovalRequest>,
    /// When set, the decisive set does not complete the match on its own.
    pub requires_approval: bool,
    /// Creation timestamp.
    pub created_at: SystemTime,
    /// Persistence revision, bumped on every successful write.
    pub version: u64,
}

impl Match {
    /// Borrow the team snapshot playing as `side`.
    pub fn team(&self, side: Side) -> &MatchTeam {
        match side {
            Side::Team1 => &self.team1,
            Side::Team2 => &self.team2,
        }
    }

    /// Half occupied by `side`.
    pub fn position(&self, side: Side) -> CourtPosition {
        match side {
            Side::Team1 => self.team1_position,
            Side::Team2 => self.team1_position.opposite(),
        }
    }

    /// The set matching [`Match::current_set_number`].
    pub fn current_set(&self) -> Option<&Set> {
        self.sets
            .iter()
            .find(|set| set.set_number == self.current_set_number)
    }

    pub(crate) fn current_set_mut(&mut self) -> Option<&mut Set> {
        let current = self.current_set_number;
        self.sets.iter_mut().find(|set| set.set_number == current)
    }

    /// Whether an approval request is outstanding.
    pub fn is_pending_approval(&self) -> bool {
        self.approval.is_some()
    }

    /// Side that has reached [`SETS_TO_WIN`], if any.
    pub fn decided_winner(&self) -> Option<Side> {
        [Side::Team1, Side::Team2]
            .into_iter()
            .find(|side| self.sets_won.get(*side) >= SETS_TO_WIN)
    }

    /// Whether the most recent score event can be reverted right now.
    pub fn can_undo(&self) -> bool {
        self.status == MatchStatus::Live
            && !self.is_pending_approval()
            && self.current_set().is_some_and(|set| !set.locked)
            && self
                .history
                .last()
                .is_some_and(|event| event.set_number == self.current_set_number)
    }

    /// Rally points scored by `side` across every set of the match.
    pub fn points_scored(&self, side: Side) -> u32 {
        self.sets
            .iter()
            .map(|set| u32::from(set.score.get(side)))
            .sum()
    }

    /// Result of a completed match, `None` while it is still in progress.
    pub fn outcome(&self) -> Option<MatchOutcome> {
        if self.status != MatchStatus::Completed {
            return None;
        }
        let winner = self.winner?;
        Some(MatchOutcome {
            winner,
            team1_points: self.points_scored(Side::Team1),
            team2_points: self.points_scored(Side::Team2),
        })
    }
}

/// Result of a match, consumed by the statistics aggregator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchOutcome {
    /// Winning side.
    pub winner: Side,
    /// Rally points scored by team1 across all sets.
    pub team1_points: u32,
    /// Rally points scored by team2 across all sets.
    pub team2_points: u32,
}

impl MatchOutcome {
    /// Rally points scored by `side`.
    pub fn points(&self, side: Side) -> u32 {
        match side {
            Side::Team1 => self.team1_points,
            Side::Team2 => self.team2_points,
        }
    }
}

/// Reasons the engine refuses a transition.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MatchError {
    /// Operation is illegal for the current status.
    #[error("invalid state: {0}")]
    InvalidState(String),
    /// The targeted set is locked.
    #[error("set {set_number} is already locked")]
    AlreadyLocked {
        /// Number of the locked set.
        set_number: u8,
    },
    /// The transition would break a scoring invariant.
    #[error("invariant violation: {0}")]
    InvariantViolation(String),
    /// Caller supplied inconsistent input.
    #[error("validation failed: {0}")]
    Validation(String),
}
