use tracing::info;
use uuid::Uuid;

use crate::{
    dto::teams::{CreateTeamRequest, TeamListQuery, TeamSummary},
    error::ServiceError,
    services::{
        match_service::{has_open_matches, load_team},
        sse_events,
    },
    state::{
        SharedState,
        model::{Player, Team, TeamStats},
    },
};

/// Register a doubles pair in one of the configured zones.
pub async fn create_team(
    state: &SharedState,
    request: CreateTeamRequest,
) -> Result<TeamSummary, ServiceError> {
    let zone = request.zone.trim().to_string();
    if !state.config().has_zone(&zone) {
        return Err(ServiceError::InvalidInput(format!(
            "unknown zone `{zone}` (expected one of {:?})",
            state.config().zone_ids()
        )));
    }

    let players: [Player; 2] = request
        .players
        .into_iter()
        .map(|player| Player {
            id: Uuid::new_v4(),
            name: player.name.trim().to_string(),
        })
        .collect::<Vec<_>>()
        .try_into()
        .map_err(|_| ServiceError::InvalidInput("a team has exactly two players".into()))?;

    let team = Team {
        id: Uuid::new_v4(),
        name: request.name.trim().to_string(),
        players,
        zone,
        stats: TeamStats::default(),
    };

    let store = state.require_store().await?;
    store.save_team(team.clone().into()).await?;
    info!(team_id = %team.id, name = %team.name, zone = %team.zone, "team registered");

    let summary = TeamSummary::from(team);
    sse_events::broadcast_team_created(state, summary.clone());
    Ok(summary)
}

/// Registered teams sorted by name.
pub async fn list_teams(
    state: &SharedState,
    query: &TeamListQuery,
) -> Result<Vec<TeamSummary>, ServiceError> {
    let store = state.require_store().await?;
    let mut teams: Vec<Team> = store
        .list_teams()
        .await?
        .into_iter()
        .map(Into::into)
        .filter(|team: &Team| query.zone.as_deref().is_none_or(|zone| team.zone == zone))
        .collect();
    teams.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(teams.into_iter().map(Into::into).collect())
}

/// Fetch one team.
pub async fn get_team(state: &SharedState, id: Uuid) -> Result<TeamSummary, ServiceError> {
    let store = state.require_store().await?;
    Ok(load_team(store.as_ref(), id).await?.into())
}

/// Remove a team that has no upcoming or live match.
pub async fn delete_team(state: &SharedState, id: Uuid) -> Result<(), ServiceError> {
    let store = state.require_store().await?;
    load_team(store.as_ref(), id).await?;
    if has_open_matches(store.as_ref(), id).await? {
        return Err(ServiceError::InvalidState(format!(
            "team `{id}` still has matches to play"
        )));
    }

    store.delete_team(id).await?;
    info!(team_id = %id, "team deleted");
    sse_events::broadcast_team_deleted(state, id);
    Ok(())
}
