use tracing::info;
use uuid::Uuid;

use crate::{
    dao::tournament_store::TournamentStore,
    dto::statistics::{
        AveragePointsResponse, RecalculateResponse, StandingEntry, TournamentSummaryResponse,
    },
    error::ServiceError,
    services::{match_service::load_team, sse_events},
    state::{
        GateKey, SharedState,
        model::{Match, Team},
        statistics,
    },
};

async fn load_all(store: &dyn TournamentStore) -> Result<(Vec<Team>, Vec<Match>), ServiceError> {
    let teams = store.list_teams().await?.into_iter().map(Into::into).collect();
    let matches = store
        .list_matches()
        .await?
        .into_iter()
        .map(Into::into)
        .collect();
    Ok((teams, matches))
}

/// Ranked teams, optionally restricted to one configured zone.
pub async fn standings(
    state: &SharedState,
    zone: Option<&str>,
) -> Result<Vec<StandingEntry>, ServiceError> {
    if let Some(zone) = zone.filter(|zone| !state.config().has_zone(zone)) {
        return Err(ServiceError::InvalidInput(format!("unknown zone `{zone}`")));
    }

    let store = state.require_store().await?;
    let teams: Vec<Team> = store.list_teams().await?.into_iter().map(Into::into).collect();
    Ok(statistics::rank_teams(&teams, zone)
        .into_iter()
        .enumerate()
        .map(|(index, team)| StandingEntry {
            rank: index + 1,
            team: team.into(),
        })
        .collect())
}

/// Average rally points per completed match of one team.
pub async fn average_points(
    state: &SharedState,
    team_id: Uuid,
) -> Result<AveragePointsResponse, ServiceError> {
    let store = state.require_store().await?;
    load_team(store.as_ref(), team_id).await?;
    let matches: Vec<Match> = store
        .list_matches()
        .await?
        .into_iter()
        .map(Into::into)
        .collect();
    Ok(AveragePointsResponse {
        team_id,
        average_points_per_match: statistics::average_points_per_match(team_id, &matches),
    })
}

/// Match counts and the leading team and player per zone and overall.
pub async fn summary(state: &SharedState) -> Result<TournamentSummaryResponse, ServiceError> {
    let store = state.require_store().await?;
    let (teams, matches) = load_all(store.as_ref()).await?;
    let zones = state.config().zone_ids();
    Ok(statistics::tournament_summary(&teams, &matches, &zones).into())
}

/// Rebuild every team's statistics from the completed matches and persist them.
pub async fn recalculate(state: &SharedState) -> Result<RecalculateResponse, ServiceError> {
    let store = state.require_store().await?;
    let scheme = state.config().outcome_points();

    let mut teams = state
        .run_gated(GateKey::TeamStats, || async {
            let (teams, matches) = load_all(store.as_ref()).await?;
            let rebuilt = statistics::recalculate(&teams, &matches, scheme);
            for (before, after) in teams.iter().zip(&rebuilt) {
                if before.stats != after.stats {
                    store.save_team(after.clone().into()).await?;
                }
            }
            Ok(rebuilt)
        })
        .await?;
    teams.sort_by(|a, b| a.name.cmp(&b.name));

    info!(teams = teams.len(), "team statistics recalculated");
    let summaries: Vec<_> = teams.into_iter().map(Into::into).collect();
    sse_events::broadcast_teams_recalculated(state, summaries.clone());
    Ok(RecalculateResponse { teams: summaries })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        dto::matches::CreateMatchRequest,
        services::{match_service, test_support::seeded_state},
        state::model::{Side, TeamStats},
    };

    async fn play_match(state: &SharedState, team1: &Team, team2: &Team, winner: Side) {
        let created = match_service::create_match(
            state,
            CreateMatchRequest {
                team1_id: team1.id,
                team2_id: team2.id,
                requires_approval: Some(false),
            },
        )
        .await
        .unwrap();
        match_service::start_match(state, created.id).await.unwrap();
        for _ in 0..4 {
            match_service::record_point(state, created.id, winner)
                .await
                .unwrap();
        }
        for _ in 0..2 {
            match_service::end_set(state, created.id, winner, None)
                .await
                .unwrap();
        }
    }

    #[tokio::test]
    async fn standings_follow_completed_matches() {
        let (state, team1, team2) = seeded_state().await;
        play_match(&state, &team1, &team2, Side::Team2).await;

        let table = standings(&state, Some("zone-a")).await.unwrap();
        assert_eq!(table[0].rank, 1);
        assert_eq!(table[0].team.id, team2.id);
        assert_eq!(table[0].team.stats.points_scored, 4);
        assert_eq!(table[1].team.stats.matches_lost, 1);

        assert!(matches!(
            standings(&state, Some("zone-x")).await,
            Err(ServiceError::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn average_is_zero_without_completed_matches() {
        let (state, team1, team2) = seeded_state().await;
        assert_eq!(
            average_points(&state, team1.id)
                .await
                .unwrap()
                .average_points_per_match,
            0.0
        );

        play_match(&state, &team1, &team2, Side::Team1).await;
        play_match(&state, &team2, &team1, Side::Team1).await;
        let average = average_points(&state, team1.id).await.unwrap();
        assert_eq!(average.average_points_per_match, 2.0);
    }

    #[tokio::test]
    async fn recalculation_repairs_drifted_stats() {
        let (state, team1, team2) = seeded_state().await;
        play_match(&state, &team1, &team2, Side::Team1).await;

        let store = state.require_store().await.unwrap();
        let mut drifted = team1.clone();
        drifted.stats = TeamStats {
            matches_won: 9,
            ..TeamStats::default()
        };
        store.save_team(drifted.into()).await.unwrap();

        let response = recalculate(&state).await.unwrap();
        let repaired = response
            .teams
            .iter()
            .find(|team| team.id == team1.id)
            .unwrap();
        assert_eq!(repaired.stats.matches_won, 1);
        assert_eq!(repaired.stats.outcome_points, 3);
        assert_eq!(repaired.stats.points_scored, 4);

        let again = recalculate(&state).await.unwrap();
        let again_team = again.teams.iter().find(|t| t.id == team1.id).unwrap();
        assert_eq!(again_team.stats.matches_won, 1);
    }

    #[tokio::test]
    async fn summary_names_zone_leaders() {
        let (state, team1, team2) = seeded_state().await;
        play_match(&state, &team1, &team2, Side::Team1).await;

        let overview = summary(&state).await.unwrap();
        assert_eq!(overview.total_matches, 1);
        assert_eq!(overview.completed_matches, 1);
        let zone_a = overview
            .zones
            .iter()
            .find(|leaders| leaders.zone.as_deref() == Some("zone-a"))
            .unwrap();
        assert_eq!(zone_a.best_team.as_ref().map(|t| t.id), Some(team1.id));
        let zone_b = overview
            .zones
            .iter()
            .find(|leaders| leaders.zone.as_deref() == Some("zone-b"))
            .unwrap();
        assert!(zone_b.best_team.is_none());
    }
}
