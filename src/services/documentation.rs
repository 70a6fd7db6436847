use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI specification for Shuttle Court Back.
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::sse::stream,
        crate::routes::teams::list_teams,
        crate::routes::teams::create_team,
        crate::routes::teams::get_team,
        crate::routes::teams::delete_team,
        crate::routes::matches::list_matches,
        crate::routes::matches::create_match,
        crate::routes::matches::get_match,
        crate::routes::matches::delete_match,
        crate::routes::matches::assign_court,
        crate::routes::matches::start_match,
        crate::routes::matches::record_point,
        crate::routes::matches::end_set,
        crate::routes::matches::undo_last_score,
        crate::routes::matches::request_approval,
        crate::routes::matches::approve,
        crate::routes::matches::reject,
        crate::routes::matches::finish_match,
        crate::routes::courts::list_courts,
        crate::routes::courts::create_court,
        crate::routes::courts::court_view,
        crate::routes::courts::assign_referee,
        crate::routes::courts::list_referees,
        crate::routes::courts::create_referee,
        crate::routes::courts::delete_referee,
        crate::routes::courts::list_zones,
        crate::routes::statistics::standings,
        crate::routes::statistics::average_points,
        crate::routes::statistics::summary,
        crate::routes::statistics::recalculate,
        crate::routes::tournament::reset,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::health::HealthStatus,
            crate::dto::sse::Handshake,
            crate::dto::sse::SystemStatus,
            crate::dto::sse::MatchEvent,
            crate::dto::sse::MatchDeletedEvent,
            crate::dto::sse::TeamEvent,
            crate::dto::sse::TeamDeletedEvent,
            crate::dto::sse::TeamsRecalculatedEvent,
            crate::dto::sse::CourtEvent,
            crate::dto::sse::TournamentResetEvent,
            crate::state::model::Side,
            crate::state::model::CourtPosition,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "sse", description = "Server-sent events stream"),
        (name = "teams", description = "Team registry"),
        (name = "matches", description = "Match scheduling, scoring and approval"),
        (name = "courts", description = "Courts, referees and zones"),
        (name = "statistics", description = "Standings and tournament summary"),
        (name = "tournament", description = "Tournament-wide administration"),
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_scoring_routes() {
        let doc = ApiDoc::openapi();
        for path in ["/matches/{id}/points", "/matches/{id}/sets/end", "/statistics/recalculate"] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
    }
}
