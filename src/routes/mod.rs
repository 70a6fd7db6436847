use axum::Router;

use crate::state::SharedState;

pub mod courts;
pub mod docs;
pub mod health;
pub mod matches;
pub mod sse;
pub mod statistics;
pub mod teams;
pub mod tournament;

/// Compose all route trees, wiring in shared state and documentation routes.
pub fn router(state: SharedState) -> Router<()> {
    let api_router = health::router()
        .merge(sse::router())
        .merge(teams::router())
        .merge(matches::router())
        .merge(courts::router())
        .merge(statistics::router())
        .merge(tournament::router());

    let docs_router = docs::router(state.clone());

    api_router.merge(docs_router).with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::{Body, to_bytes},
        http::{Request, StatusCode, header},
    };
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use super::*;
    use crate::{
        config::AppConfig,
        dao::tournament_store::memory::MemoryTournamentStore,
        services::court_service,
        state::AppState,
    };

    async fn app() -> Router<()> {
        let state = AppState::new(AppConfig::default());
        let store = Arc::new(MemoryTournamentStore::new());
        court_service::seed_courts(&state, store.as_ref())
            .await
            .unwrap();
        state.set_store(store).await;
        router(state)
    }

    async fn send(
        app: &Router<()>,
        method: &str,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(body.map_or_else(Body::empty, |body| Body::from(body.to_string())))
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    async fn register(app: &Router<()>, name: &str, zone: &str) -> String {
        let (status, team) = send(
            app,
            "POST",
            "/teams",
            Some(json!({
                "name": name,
                "players": [{ "name": "One" }, { "name": "Two" }],
                "zone": zone,
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        team["id"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn scoring_flow_over_http() {
        let app = app().await;
        let team1 = register(&app, "Alpha", "zone-a").await;
        let team2 = register(&app, "Beta", "zone-a").await;

        let (status, created) = send(
            &app,
            "POST",
            "/matches",
            Some(json!({ "team1_id": team1, "team2_id": team2 })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let id = created["id"].as_str().unwrap().to_string();

        let point = |team: &str| Some(json!({ "team": team }));
        let points = format!("/matches/{id}/points");
        let (status, _) = send(&app, "POST", &points, point("team1")).await;
        assert_eq!(status, StatusCode::CONFLICT);

        send(&app, "POST", &format!("/matches/{id}/start"), None).await;
        let (status, scored) = send(&app, "POST", &points, point("team2")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(scored["serving"], "team2");

        let (_, undone) = send(&app, "POST", &format!("/matches/{id}/undo"), None).await;
        assert_eq!(undone["sets"][0]["team2"], 0);
        assert_eq!(undone["serving"], "team1");
    }

    #[tokio::test]
    async fn invalid_payloads_are_bad_requests() {
        let app = app().await;
        let (status, _) = send(
            &app,
            "POST",
            "/teams",
            Some(json!({ "name": "Solo", "players": [{ "name": "One" }], "zone": "zone-a" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let team1 = register(&app, "Alpha", "zone-a").await;
        let team2 = register(&app, "Gamma", "zone-b").await;
        let (status, body) = send(
            &app,
            "POST",
            "/matches",
            Some(json!({ "team1_id": team1, "team2_id": team2 })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["message"].as_str().unwrap().contains("zones"));
    }

    #[tokio::test]
    async fn degraded_backend_answers_service_unavailable() {
        let app = router(AppState::new(AppConfig::default()));
        let (status, _) = send(&app, "GET", "/teams", None).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);

        let (status, health) = send(&app, "GET", "/healthcheck", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(health["status"], "degraded");
    }
}
