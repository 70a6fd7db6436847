//! Standings, averages and full recomputation of team statistics.
//!
//! Everything in here is side-effect free: callers own the persistence of the
//! values returned.

use std::{cmp::Ordering, collections::HashMap};

use serde::Deserialize;
use uuid::Uuid;

use crate::state::model::{Match, MatchOutcome, MatchStatus, Player, Side, Team, TeamStats};

/// Standings currency awarded per match result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct OutcomePoints {
    /// Awarded to the winner.
    pub win: u32,
    /// Awarded to the loser for taking part.
    pub loss: u32,
}

impl Default for OutcomePoints {
    fn default() -> Self {
        Self { win: 3, loss: 1 }
    }
}

/// Fold one match result into a team's running statistics.
pub fn apply_outcome(
    stats: &mut TeamStats,
    side: Side,
    outcome: &MatchOutcome,
    scheme: OutcomePoints,
) {
    if outcome.winner == side {
        stats.matches_won += 1;
        stats.outcome_points += scheme.win;
    } else {
        stats.matches_lost += 1;
        stats.outcome_points += scheme.loss;
    }
    stats.points_scored += outcome.points(side);
}

/// Rebuild every team's statistics from the completed matches.
///
/// Running it twice over the same input yields the same output. Matches
/// referencing unknown teams only contribute to the teams that still exist.
pub fn recalculate(teams: &[Team], matches: &[Match], scheme: OutcomePoints) -> Vec<Team> {
    let mut stats: HashMap<Uuid, TeamStats> = teams
        .iter()
        .map(|team| (team.id, TeamStats::default()))
        .collect();

    for m in matches {
        let Some(outcome) = m.outcome() else {
            continue;
        };
        for side in [Side::Team1, Side::Team2] {
            if let Some(entry) = stats.get_mut(&m.team(side).id) {
                apply_outcome(entry, side, &outcome, scheme);
            }
        }
    }

    teams
        .iter()
        .map(|team| Team {
            stats: stats.get(&team.id).copied().unwrap_or_default(),
            ..team.clone()
        })
        .collect()
}

fn standings_order(a: &Team, b: &Team) -> Ordering {
    b.stats
        .matches_won
        .cmp(&a.stats.matches_won)
        .then_with(|| b.stats.points_scored.cmp(&a.stats.points_scored))
        .then_with(|| a.name.cmp(&b.name))
}

/// Teams ordered by matches won, then rally points scored, then name.
pub fn rank_teams(teams: &[Team], zone: Option<&str>) -> Vec<Team> {
    let mut ranked: Vec<Team> = teams
        .iter()
        .filter(|team| zone.is_none_or(|zone| team.zone == zone))
        .cloned()
        .collect();
    ranked.sort_by(standings_order);
    ranked
}

/// Average rally points per completed match, `0.0` without any.
pub fn average_points_per_match(team_id: Uuid, matches: &[Match]) -> f64 {
    let (total, played) = matches
        .iter()
        .filter(|m| m.status == MatchStatus::Completed)
        .filter_map(|m| {
            [Side::Team1, Side::Team2]
                .into_iter()
                .find(|side| m.team(*side).id == team_id)
                .map(|side| m.points_scored(side))
        })
        .fold((0u32, 0u32), |(total, played), points| {
            (total + points, played + 1)
        });

    if played == 0 {
        0.0
    } else {
        f64::from(total) / f64::from(played)
    }
}

/// A player ranked by the results of their team.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerStanding {
    /// The player.
    pub player: Player,
    /// Team the player belongs to.
    pub team_id: Uuid,
    /// Name of that team.
    pub team_name: String,
    /// Matches won by that team.
    pub matches_won: u32,
}

/// Player credited with the most wins, optionally within a zone.
pub fn best_player(teams: &[Team], zone: Option<&str>) -> Option<PlayerStanding> {
    let team = rank_teams(teams, zone).into_iter().next()?;
    let player = team
        .players
        .iter()
        .min_by(|a, b| a.name.cmp(&b.name))?
        .clone();
    Some(PlayerStanding {
        player,
        team_id: team.id,
        team_name: team.name,
        matches_won: team.stats.matches_won,
    })
}

/// Leaders of one zone (or of the whole tournament).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Leaders {
    /// Zone the leaders were computed for, `None` for the overall table.
    pub zone: Option<String>,
    /// First team of the standings.
    pub best_team: Option<Team>,
    /// Player credited with the most wins.
    pub best_player: Option<PlayerStanding>,
}

/// Tournament-wide figures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TournamentSummary {
    /// Every match ever scheduled.
    pub total_matches: usize,
    /// Matches currently being played.
    pub live_matches: usize,
    /// Matches in their terminal state.
    pub completed_matches: usize,
    /// Leaders per zone, in the order the zones were given.
    pub zones: Vec<Leaders>,
    /// Leaders across all zones.
    pub overall: Leaders,
}

fn leaders(teams: &[Team], zone: Option<&str>) -> Leaders {
    // a zone without a single result has no leader yet
    let best_team = rank_teams(teams, zone)
        .into_iter()
        .next()
        .filter(|team| team.stats.matches_won + team.stats.matches_lost > 0);
    Leaders {
        zone: zone.map(str::to_string),
        best_player: best_team.as_ref().and_then(|_| best_player(teams, zone)),
        best_team,
    }
}

/// Summarise the tournament for the given zones.
pub fn tournament_summary(teams: &[Team], matches: &[Match], zones: &[String]) -> TournamentSummary {
    let count = |status: MatchStatus| matches.iter().filter(|m| m.status == status).count();
    TournamentSummary {
        total_matches: matches.len(),
        live_matches: count(MatchStatus::Live),
        completed_matches: count(MatchStatus::Completed),
        zones: zones
            .iter()
            .map(|zone| leaders(teams, Some(zone.as_str())))
            .collect(),
        overall: leaders(teams, None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::model::MatchTeam;

    fn team(name: &str, zone: &str) -> Team {
        Team {
            id: Uuid::new_v4(),
            name: name.into(),
            players: [
                Player {
                    id: Uuid::new_v4(),
                    name: format!("{name} Zed"),
                },
                Player {
                    id: Uuid::new_v4(),
                    name: format!("{name} Amy"),
                },
            ],
            zone: zone.into(),
            stats: TeamStats::default(),
        }
    }

    /// Play a completed match where `winner` takes two sets, scoring `points` in each.
    fn played(team1: &Team, team2: &Team, winner: Side, points: u8) -> Match {
        let mut m = Match::new(
            Uuid::new_v4(),
            MatchTeam::from(team1),
            MatchTeam::from(team2),
            false,
        )
        .unwrap();
        m.start().unwrap();
        for _ in 0..2 {
            for _ in 0..points {
                m.record_point(winner).unwrap();
            }
            m.record_point(winner.opponent()).unwrap();
            m.end_set(winner).unwrap();
        }
        assert_eq!(m.status, MatchStatus::Completed);
        m
    }

    #[test]
    fn recalculate_rebuilds_both_point_schemes() {
        let alpha = team("Alpha", "zone-a");
        let beta = team("Beta", "zone-a");
        let matches = vec![played(&alpha, &beta, Side::Team1, 15)];

        let teams = recalculate(&[alpha.clone(), beta.clone()], &matches, OutcomePoints::default());

        assert_eq!(
            teams[0].stats,
            TeamStats {
                matches_won: 1,
                matches_lost: 0,
                outcome_points: 3,
                points_scored: 30,
            }
        );
        assert_eq!(
            teams[1].stats,
            TeamStats {
                matches_won: 0,
                matches_lost: 1,
                outcome_points: 1,
                points_scored: 2,
            }
        );
    }

    #[test]
    fn recalculate_is_idempotent_and_ignores_unfinished_matches() {
        let alpha = team("Alpha", "zone-a");
        let beta = team("Beta", "zone-a");
        let mut live = Match::new(
            Uuid::new_v4(),
            MatchTeam::from(&alpha),
            MatchTeam::from(&beta),
            false,
        )
        .unwrap();
        live.start().unwrap();
        live.record_point(Side::Team2).unwrap();
        let matches = vec![played(&beta, &alpha, Side::Team1, 3), live];

        let once = recalculate(&[alpha, beta], &matches, OutcomePoints::default());
        let twice = recalculate(&once, &matches, OutcomePoints::default());

        assert_eq!(once, twice);
        assert_eq!(once[1].stats.matches_won, 1);
        assert_eq!(once[0].stats.points_scored, 2);
    }

    #[test]
    fn recalculate_resets_drifted_counters() {
        let mut alpha = team("Alpha", "zone-a");
        alpha.stats.matches_won = 42;
        alpha.stats.outcome_points = 99;

        let teams = recalculate(&[alpha], &[], OutcomePoints::default());
        assert_eq!(teams[0].stats, TeamStats::default());
    }

    #[test]
    fn ranking_breaks_ties_on_points_scored_then_name() {
        let mut alpha = team("Alpha", "zone-a");
        let mut beta = team("Beta", "zone-a");
        let mut gamma = team("Gamma", "zone-a");
        let mut delta = team("Delta", "zone-b");
        alpha.stats.matches_won = 2;
        alpha.stats.points_scored = 10;
        beta.stats.matches_won = 2;
        beta.stats.points_scored = 30;
        gamma.stats.matches_won = 2;
        gamma.stats.points_scored = 10;
        delta.stats.matches_won = 5;
        let teams = vec![gamma, alpha, delta, beta];

        let names: Vec<_> = rank_teams(&teams, Some("zone-a"))
            .into_iter()
            .map(|team| team.name)
            .collect();
        assert_eq!(names, ["Beta", "Alpha", "Gamma"]);

        let overall = rank_teams(&teams, None);
        assert_eq!(overall[0].name, "Delta");
        assert_eq!(overall.len(), 4);
    }

    #[test]
    fn average_counts_only_completed_matches() {
        let alpha = team("Alpha", "zone-a");
        let beta = team("Beta", "zone-a");
        let matches = vec![
            played(&alpha, &beta, Side::Team1, 10),
            played(&beta, &alpha, Side::Team1, 4),
        ];

        // 20 in the win, 2 in the loss
        assert_eq!(average_points_per_match(alpha.id, &matches), 11.0);
        assert_eq!(average_points_per_match(Uuid::new_v4(), &matches), 0.0);
    }

    #[test]
    fn summary_reports_leaders_per_zone() {
        let alpha = team("Alpha", "zone-a");
        let beta = team("Beta", "zone-a");
        let gamma = team("Gamma", "zone-b");
        let matches = vec![played(&alpha, &beta, Side::Team2, 5)];
        let teams = recalculate(
            &[alpha, beta.clone(), gamma],
            &matches,
            OutcomePoints::default(),
        );

        let summary = tournament_summary(
            &teams,
            &matches,
            &["zone-a".to_string(), "zone-b".to_string()],
        );

        assert_eq!(summary.total_matches, 1);
        assert_eq!(summary.completed_matches, 1);
        assert_eq!(summary.live_matches, 0);
        assert_eq!(
            summary.zones[0].best_team.as_ref().map(|t| t.id),
            Some(beta.id)
        );
        let player = summary.zones[0].best_player.as_ref().unwrap();
        assert_eq!(player.player.name, "Beta Amy");
        assert_eq!(player.matches_won, 1);
        assert!(summary.zones[1].best_team.is_none());
        assert!(summary.zones[1].best_player.is_none());
        assert_eq!(
            summary.overall.best_team.as_ref().map(|t| t.id),
            Some(beta.id)
        );
    }
}
