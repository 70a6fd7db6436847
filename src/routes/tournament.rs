use axum::{Json, Router, extract::State, routing::post};

use crate::{
    dto::tournament::ResetResponse, error::AppError, services::tournament_service,
    state::SharedState,
};

/// Routes wiping tournament data.
pub fn router() -> Router<SharedState> {
    Router::new().route("/tournament/reset", post(reset))
}

/// Delete every match and zero team statistics. Teams, courts and referees are kept.
#[utoipa::path(
    post,
    path = "/tournament/reset",
    tag = "tournament",
    responses((status = 200, description = "Tournament reset", body = ResetResponse))
)]
pub async fn reset(State(state): State<SharedState>) -> Result<Json<ResetResponse>, AppError> {
    Ok(Json(tournament_service::reset(&state).await?))
}
