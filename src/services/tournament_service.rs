use tracing::info;

use crate::{
    dto::tournament::ResetResponse,
    error::ServiceError,
    services::sse_events,
    state::{
        GateKey, SharedState,
        model::{Team, TeamStats},
    },
};

/// Delete every match and zero the statistics of every team.
pub async fn reset(state: &SharedState) -> Result<ResetResponse, ServiceError> {
    let store = state.require_store().await?;

    let response = state
        .run_gated(GateKey::TeamStats, || async {
            let mut deleted_matches = 0;
            for entity in store.list_matches().await? {
                let removed = state
                    .run_gated(GateKey::Match(entity.id), || async {
                        Ok(store.delete_match(entity.id).await?)
                    })
                    .await?;
                if removed {
                    deleted_matches += 1;
                }
            }

            let teams = store.list_teams().await?;
            let teams_reset = teams.len();
            for entity in teams {
                let mut team: Team = entity.into();
                team.stats = TeamStats::default();
                store.save_team(team.into()).await?;
            }

            Ok(ResetResponse {
                deleted_matches,
                teams_reset,
            })
        })
        .await?;
    state.prune_idle_gates();

    info!(
        deleted_matches = response.deleted_matches,
        teams_reset = response.teams_reset,
        "tournament reset"
    );
    sse_events::broadcast_tournament_reset(state, &response);
    Ok(response)
}
