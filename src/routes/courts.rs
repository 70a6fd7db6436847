use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, put},
};
use axum_valid::Valid;
use uuid::Uuid;

use crate::{
    dto::courts::{
        AssignRefereeRequest, CourtSummary, CourtView, CreateCourtRequest, CreateRefereeRequest,
        RefereeSummary, ZoneSummary,
    },
    error::AppError,
    services::court_service,
    state::SharedState,
};

/// Courts, referees and zones.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/courts", get(list_courts).post(create_court))
        .route("/courts/{id}", get(court_view))
        .route("/courts/{id}/referee", put(assign_referee))
        .route("/referees", get(list_referees).post(create_referee))
        .route("/referees/{id}", delete(delete_referee))
        .route("/zones", get(list_zones))
}

/// List courts with their referees.
#[utoipa::path(
    get,
    path = "/courts",
    tag = "courts",
    responses((status = 200, description = "Courts sorted by id", body = [CourtSummary]))
)]
pub async fn list_courts(
    State(state): State<SharedState>,
) -> Result<Json<Vec<CourtSummary>>, AppError> {
    Ok(Json(court_service::list_courts(&state).await?))
}

/// Register a court.
#[utoipa::path(
    post,
    path = "/courts",
    tag = "courts",
    request_body = CreateCourtRequest,
    responses(
        (status = 201, description = "Court registered", body = CourtSummary),
        (status = 409, description = "Court id already used")
    )
)]
pub async fn create_court(
    State(state): State<SharedState>,
    Valid(Json(payload)): Valid<Json<CreateCourtRequest>>,
) -> Result<(StatusCode, Json<CourtSummary>), AppError> {
    let court = court_service::create_court(&state, payload).await?;
    Ok((StatusCode::CREATED, Json(court)))
}

/// Live match and queue of a court.
#[utoipa::path(
    get,
    path = "/courts/{id}",
    tag = "courts",
    params(("id" = String, Path, description = "Court identifier")),
    responses(
        (status = 200, description = "Court view", body = CourtView),
        (status = 404, description = "Unknown court")
    )
)]
pub async fn court_view(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<CourtView>, AppError> {
    Ok(Json(court_service::court_view(&state, &id).await?))
}

/// Assign or unassign the referee of a court.
#[utoipa::path(
    put,
    path = "/courts/{id}/referee",
    tag = "courts",
    params(("id" = String, Path, description = "Court identifier")),
    request_body = AssignRefereeRequest,
    responses(
        (status = 200, description = "Referee assignment updated", body = CourtSummary),
        (status = 404, description = "Unknown court or referee"),
        (status = 409, description = "Referee officiates elsewhere")
    )
)]
pub async fn assign_referee(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    Json(payload): Json<AssignRefereeRequest>,
) -> Result<Json<CourtSummary>, AppError> {
    Ok(Json(
        court_service::assign_referee(&state, &id, payload).await?,
    ))
}

/// List referees with their courts.
#[utoipa::path(
    get,
    path = "/referees",
    tag = "courts",
    responses((status = 200, description = "Registered referees", body = [RefereeSummary]))
)]
pub async fn list_referees(
    State(state): State<SharedState>,
) -> Result<Json<Vec<RefereeSummary>>, AppError> {
    Ok(Json(court_service::list_referees(&state).await?))
}

/// Register a referee.
#[utoipa::path(
    post,
    path = "/referees",
    tag = "courts",
    request_body = CreateRefereeRequest,
    responses((status = 201, description = "Referee registered", body = RefereeSummary))
)]
pub async fn create_referee(
    State(state): State<SharedState>,
    Valid(Json(payload)): Valid<Json<CreateRefereeRequest>>,
) -> Result<(StatusCode, Json<RefereeSummary>), AppError> {
    let referee = court_service::create_referee(&state, payload).await?;
    Ok((StatusCode::CREATED, Json(referee)))
}

/// Remove a referee, unassigning its court.
#[utoipa::path(
    delete,
    path = "/referees/{id}",
    tag = "courts",
    params(("id" = Uuid, Path, description = "Referee identifier")),
    responses(
        (status = 204, description = "Referee removed"),
        (status = 404, description = "Unknown referee")
    )
)]
pub async fn delete_referee(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    court_service::delete_referee(&state, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// List the configured zones.
#[utoipa::path(
    get,
    path = "/zones",
    tag = "courts",
    responses((status = 200, description = "Configured zones", body = [ZoneSummary]))
)]
pub async fn list_zones(State(state): State<SharedState>) -> Json<Vec<ZoneSummary>> {
    Json(court_service::list_zones(&state))
}
