use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, post},
};
use uuid::Uuid;

use crate::{
    dto::statistics::{
        AveragePointsResponse, RecalculateResponse, StandingEntry, StandingsQuery,
        TournamentSummaryResponse,
    },
    error::AppError,
    services::statistics_service,
    state::SharedState,
};

/// Standings and tournament-wide figures.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/statistics/standings", get(standings))
        .route("/statistics/teams/{id}/average", get(average_points))
        .route("/statistics/summary", get(summary))
        .route("/statistics/recalculate", post(recalculate))
}

/// Ranked standings, optionally for one zone.
#[utoipa::path(
    get,
    path = "/statistics/standings",
    tag = "statistics",
    params(StandingsQuery),
    responses(
        (status = 200, description = "Teams ranked by wins, then points scored", body = [StandingEntry]),
        (status = 400, description = "Unknown zone")
    )
)]
pub async fn standings(
    State(state): State<SharedState>,
    Query(query): Query<StandingsQuery>,
) -> Result<Json<Vec<StandingEntry>>, AppError> {
    Ok(Json(
        statistics_service::standings(&state, query.zone.as_deref()).await?,
    ))
}

/// Average rally points per completed match of a team.
#[utoipa::path(
    get,
    path = "/statistics/teams/{id}/average",
    tag = "statistics",
    params(("id" = Uuid, Path, description = "Team identifier")),
    responses(
        (status = 200, description = "Average rally points per completed match", body = AveragePointsResponse),
        (status = 404, description = "Unknown team")
    )
)]
pub async fn average_points(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<AveragePointsResponse>, AppError> {
    Ok(Json(statistics_service::average_points(&state, id).await?))
}

/// Match counts and leaders per zone and overall.
#[utoipa::path(
    get,
    path = "/statistics/summary",
    tag = "statistics",
    responses((status = 200, description = "Match counts and leaders", body = TournamentSummaryResponse))
)]
pub async fn summary(
    State(state): State<SharedState>,
) -> Result<Json<TournamentSummaryResponse>, AppError> {
    Ok(Json(statistics_service::summary(&state).await?))
}

/// Rebuild team statistics from completed matches.
#[utoipa::path(
    post,
    path = "/statistics/recalculate",
    tag = "statistics",
    responses((status = 200, description = "Corrected teams", body = RecalculateResponse))
)]
pub async fn recalculate(
    State(state): State<SharedState>,
) -> Result<Json<RecalculateResponse>, AppError> {
    Ok(Json(statistics_service::recalculate(&state).await?))
}
