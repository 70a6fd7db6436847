//! Fixtures shared by the service tests: an in-memory store with seeded courts
//! and two teams registered in `zone-a`.

use std::sync::Arc;

use uuid::Uuid;

use crate::{
    config::AppConfig,
    dao::tournament_store::memory::MemoryTournamentStore,
    services::court_service,
    state::{
        AppState, SharedState,
        model::{Match, Player, Team, TeamStats},
    },
};

pub(crate) async fn seeded_state() -> (SharedState, Team, Team) {
    let state = AppState::new(AppConfig::default());
    let store = Arc::new(MemoryTournamentStore::new());
    court_service::seed_courts(&state, store.as_ref())
        .await
        .unwrap();
    state.set_store(store).await;

    let team1 = team_in_zone(&state, "Alpha Smash", "zone-a").await;
    let team2 = team_in_zone(&state, "Beta Drop", "zone-a").await;
    (state, team1, team2)
}

pub(crate) async fn team_in_zone(state: &SharedState, name: &str, zone: &str) -> Team {
    let team = Team {
        id: Uuid::new_v4(),
        name: name.to_string(),
        players: [
            Player {
                id: Uuid::new_v4(),
                name: format!("{name} Left"),
            },
            Player {
                id: Uuid::new_v4(),
                name: format!("{name} Right"),
            },
        ],
        zone: zone.to_string(),
        stats: TeamStats::default(),
    };
    let store = state.require_store().await.unwrap();
    store.save_team(team.clone().into()).await.unwrap();
    team
}

pub(crate) async fn scheduled_match(state: &SharedState, team1: &Team, team2: &Team) -> Uuid {
    let scheduled = Match::new(Uuid::new_v4(), team1.into(), team2.into(), false).unwrap();
    let store = state.require_store().await.unwrap();
    store
        .save_match(scheduled.clone().into(), None)
        .await
        .unwrap();
    scheduled.id
}
