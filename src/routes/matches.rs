use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
};
use axum_valid::Valid;
use uuid::Uuid;

use crate::{
    dto::matches::{
        ApprovalRequestBody, AssignCourtRequest, CreateMatchRequest, EndSetRequest,
        MatchListQuery, MatchSummary, RecordPointRequest,
    },
    error::AppError,
    services::match_service,
    state::SharedState,
};

/// Match scheduling and the scoring/lifecycle commands.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/matches", get(list_matches).post(create_match))
        .route("/matches/{id}", get(get_match).delete(delete_match))
        .route("/matches/{id}/court", post(assign_court))
        .route("/matches/{id}/start", post(start_match))
        .route("/matches/{id}/points", post(record_point))
        .route("/matches/{id}/sets/end", post(end_set))
        .route("/matches/{id}/undo", post(undo_last_score))
        .route("/matches/{id}/approval", post(request_approval))
        .route("/matches/{id}/approve", post(approve))
        .route("/matches/{id}/reject", post(reject))
        .route("/matches/{id}/finish", post(finish_match))
}

/// List matches, oldest first.
#[utoipa::path(
    get,
    path = "/matches",
    tag = "matches",
    params(MatchListQuery),
    responses((status = 200, description = "Matches, oldest first", body = [MatchSummary]))
)]
pub async fn list_matches(
    State(state): State<SharedState>,
    Query(query): Query<MatchListQuery>,
) -> Result<Json<Vec<MatchSummary>>, AppError> {
    Ok(Json(match_service::list_matches(&state, &query).await?))
}

/// Schedule a match between two teams of the same zone.
#[utoipa::path(
    post,
    path = "/matches",
    tag = "matches",
    request_body = CreateMatchRequest,
    responses(
        (status = 201, description = "Match scheduled", body = MatchSummary),
        (status = 400, description = "Teams are identical or from different zones"),
        (status = 404, description = "Unknown team")
    )
)]
pub async fn create_match(
    State(state): State<SharedState>,
    Valid(Json(payload)): Valid<Json<CreateMatchRequest>>,
) -> Result<(StatusCode, Json<MatchSummary>), AppError> {
    let summary = match_service::create_match(&state, payload).await?;
    Ok((StatusCode::CREATED, Json(summary)))
}

/// Fetch one match.
#[utoipa::path(
    get,
    path = "/matches/{id}",
    tag = "matches",
    params(("id" = Uuid, Path, description = "Match identifier")),
    responses(
        (status = 200, description = "Match state", body = MatchSummary),
        (status = 404, description = "Unknown match")
    )
)]
pub async fn get_match(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<MatchSummary>, AppError> {
    Ok(Json(match_service::get_match(&state, id).await?))
}

/// Delete a match that is not being played.
#[utoipa::path(
    delete,
    path = "/matches/{id}",
    tag = "matches",
    params(("id" = Uuid, Path, description = "Match identifier")),
    responses(
        (status = 204, description = "Match deleted"),
        (status = 409, description = "Match is live")
    )
)]
pub async fn delete_match(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    match_service::delete_match(&state, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Queue an upcoming match at the tail of a court's queue.
#[utoipa::path(
    post,
    path = "/matches/{id}/court",
    tag = "matches",
    params(("id" = Uuid, Path, description = "Match identifier")),
    request_body = AssignCourtRequest,
    responses(
        (status = 200, description = "Match queued", body = MatchSummary),
        (status = 404, description = "Unknown match or court"),
        (status = 409, description = "Match already started")
    )
)]
pub async fn assign_court(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Valid(Json(payload)): Valid<Json<AssignCourtRequest>>,
) -> Result<Json<MatchSummary>, AppError> {
    Ok(Json(
        match_service::assign_court(&state, id, payload.court_id).await?,
    ))
}

/// Open play on a match.
#[utoipa::path(
    post,
    path = "/matches/{id}/start",
    tag = "matches",
    params(("id" = Uuid, Path, description = "Match identifier")),
    responses(
        (status = 200, description = "Match is live", body = MatchSummary),
        (status = 409, description = "Match already completed")
    )
)]
pub async fn start_match(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<MatchSummary>, AppError> {
    Ok(Json(match_service::start_match(&state, id).await?))
}

/// Award a rally; the winning side serves next.
#[utoipa::path(
    post,
    path = "/matches/{id}/points",
    tag = "matches",
    params(("id" = Uuid, Path, description = "Match identifier")),
    request_body = RecordPointRequest,
    responses(
        (status = 200, description = "Point recorded", body = MatchSummary),
        (status = 409, description = "Match not live, set locked or score cap reached")
    )
)]
pub async fn record_point(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<RecordPointRequest>,
) -> Result<Json<MatchSummary>, AppError> {
    Ok(Json(
        match_service::record_point(&state, id, payload.team).await?,
    ))
}

/// Lock the current set in favour of a side.
#[utoipa::path(
    post,
    path = "/matches/{id}/sets/end",
    tag = "matches",
    params(("id" = Uuid, Path, description = "Match identifier")),
    request_body = EndSetRequest,
    responses(
        (status = 200, description = "Set closed", body = MatchSummary),
        (status = 409, description = "Set already locked or match not live")
    )
)]
pub async fn end_set(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Valid(Json(payload)): Valid<Json<EndSetRequest>>,
) -> Result<Json<MatchSummary>, AppError> {
    Ok(Json(
        match_service::end_set(&state, id, payload.winner, payload.set_number).await?,
    ))
}

/// Revert the last point of the current set.
#[utoipa::path(
    post,
    path = "/matches/{id}/undo",
    tag = "matches",
    params(("id" = Uuid, Path, description = "Match identifier")),
    responses((status = 200, description = "Point reverted, or nothing to undo", body = MatchSummary))
)]
pub async fn undo_last_score(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<MatchSummary>, AppError> {
    Ok(Json(match_service::undo_last_score(&state, id).await?))
}

/// Ask an administrator to close the match.
#[utoipa::path(
    post,
    path = "/matches/{id}/approval",
    tag = "matches",
    params(("id" = Uuid, Path, description = "Match identifier")),
    request_body = ApprovalRequestBody,
    responses(
        (status = 200, description = "Approval pending", body = MatchSummary),
        (status = 409, description = "Match not live or already pending")
    )
)]
pub async fn request_approval(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Valid(Json(payload)): Valid<Json<ApprovalRequestBody>>,
) -> Result<Json<MatchSummary>, AppError> {
    Ok(Json(
        match_service::request_approval(&state, id, payload.requested_by).await?,
    ))
}

/// Confirm a pending approval request.
#[utoipa::path(
    post,
    path = "/matches/{id}/approve",
    tag = "matches",
    params(("id" = Uuid, Path, description = "Match identifier")),
    responses(
        (status = 200, description = "Match completed", body = MatchSummary),
        (status = 409, description = "Nothing pending or match undecided")
    )
)]
pub async fn approve(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<MatchSummary>, AppError> {
    Ok(Json(match_service::approve(&state, id).await?))
}

/// Turn down a pending approval request.
#[utoipa::path(
    post,
    path = "/matches/{id}/reject",
    tag = "matches",
    params(("id" = Uuid, Path, description = "Match identifier")),
    responses(
        (status = 200, description = "Request dismissed", body = MatchSummary),
        (status = 409, description = "Nothing pending")
    )
)]
pub async fn reject(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<MatchSummary>, AppError> {
    Ok(Json(match_service::reject(&state, id).await?))
}

/// Complete a decided match without going through approval.
#[utoipa::path(
    post,
    path = "/matches/{id}/finish",
    tag = "matches",
    params(("id" = Uuid, Path, description = "Match identifier")),
    responses(
        (status = 200, description = "Match completed", body = MatchSummary),
        (status = 409, description = "Match not live or undecided")
    )
)]
pub async fn finish_match(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<MatchSummary>, AppError> {
    Ok(Json(match_service::finish_match(&state, id).await?))
}
