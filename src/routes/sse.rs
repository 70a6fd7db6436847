use std::convert::Infallible;

use axum::{
    Router,
    extract::State,
    response::sse::{Event, Sse},
    routing::get,
};
use futures::Stream;
use tracing::info;

use crate::{
    dto::sse::{Handshake, ServerEvent},
    services::sse_service,
    state::SharedState,
};

#[utoipa::path(
    get,
    path = "/sse",
    tag = "sse",
    responses((status = 200, description = "Tournament event stream", content_type = "text/event-stream", body = Handshake))
)]
/// Stream match, team and court changes to connected clients.
///
/// The first event (`handshake`) reports whether the backend is degraded.
pub async fn stream(
    State(state): State<SharedState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let receiver = sse_service::subscribe(&state);
    info!("New SSE connection");

    let handshake = Handshake {
        stream: "tournament".into(),
        message: "tournament stream connected".into(),
        degraded: state.is_degraded().await,
    };
    if let Ok(event) = ServerEvent::json(Some("handshake".to_string()), &handshake) {
        state.sse().broadcast(event);
    }
    sse_service::to_sse_stream(receiver)
}

/// Configure the SSE endpoint.
pub fn router() -> Router<SharedState> {
    Router::<SharedState>::new().route("/sse", get(stream))
}
