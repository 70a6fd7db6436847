use tracing::warn;

use crate::{dto::health::HealthResponse, state::SharedState};

/// Report whether the backend is serving requests, logging connectivity issues.
pub async fn health_status(state: &SharedState) -> HealthResponse {
    match state.store().await {
        Some(store) => {
            if let Err(err) = store.health_check().await {
                warn!(error = %err, "storage health check failed");
            }
        }
        None => warn!("storage unavailable (degraded mode)"),
    }

    if state.is_degraded().await {
        HealthResponse::degraded()
    } else {
        HealthResponse::ok()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{
        config::AppConfig, dao::tournament_store::memory::MemoryTournamentStore,
        dto::health::HealthStatus, state::AppState,
    };

    #[tokio::test]
    async fn reports_degraded_until_a_store_is_installed() {
        let state = AppState::new(AppConfig::default());
        assert_eq!(health_status(&state).await.status, HealthStatus::Degraded);

        state.set_store(Arc::new(MemoryTournamentStore::new())).await;
        assert_eq!(health_status(&state).await.status, HealthStatus::Ok);
    }
}
