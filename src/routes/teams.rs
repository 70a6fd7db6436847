use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
};
use axum_valid::Valid;
use uuid::Uuid;

use crate::{
    dto::teams::{CreateTeamRequest, TeamListQuery, TeamSummary},
    error::AppError,
    services::team_service,
    state::SharedState,
};

/// Team registry routes.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/teams", get(list_teams).post(create_team))
        .route("/teams/{id}", get(get_team).delete(delete_team))
}

/// List teams, optionally filtered by zone.
#[utoipa::path(
    get,
    path = "/teams",
    tag = "teams",
    params(TeamListQuery),
    responses((status = 200, description = "Teams sorted by name", body = [TeamSummary]))
)]
pub async fn list_teams(
    State(state): State<SharedState>,
    Query(query): Query<TeamListQuery>,
) -> Result<Json<Vec<TeamSummary>>, AppError> {
    Ok(Json(team_service::list_teams(&state, &query).await?))
}

/// Register a doubles pair in a zone.
#[utoipa::path(
    post,
    path = "/teams",
    tag = "teams",
    request_body = CreateTeamRequest,
    responses(
        (status = 201, description = "Team registered", body = TeamSummary),
        (status = 400, description = "Invalid players or unknown zone")
    )
)]
pub async fn create_team(
    State(state): State<SharedState>,
    Valid(Json(payload)): Valid<Json<CreateTeamRequest>>,
) -> Result<(StatusCode, Json<TeamSummary>), AppError> {
    let team = team_service::create_team(&state, payload).await?;
    Ok((StatusCode::CREATED, Json(team)))
}

/// Fetch one team.
#[utoipa::path(
    get,
    path = "/teams/{id}",
    tag = "teams",
    params(("id" = Uuid, Path, description = "Team identifier")),
    responses(
        (status = 200, description = "Team with statistics", body = TeamSummary),
        (status = 404, description = "Unknown team")
    )
)]
pub async fn get_team(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<TeamSummary>, AppError> {
    Ok(Json(team_service::get_team(&state, id).await?))
}

/// Delete a team without open matches.
#[utoipa::path(
    delete,
    path = "/teams/{id}",
    tag = "teams",
    params(("id" = Uuid, Path, description = "Team identifier")),
    responses(
        (status = 204, description = "Team deleted"),
        (status = 409, description = "Team still has matches to play")
    )
)]
pub async fn delete_team(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    team_service::delete_team(&state, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
