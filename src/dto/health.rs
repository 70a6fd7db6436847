use serde::Serialize;
use utoipa::ToSchema;

/// Whether the backend currently has a working store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum HealthStatus {
    /// A store is installed and answering.
    Ok,
    /// No store, or the store is failing its health checks.
    Degraded,
}

/// Body of `GET /healthcheck`.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Current backend status.
    pub status: HealthStatus,
}

impl HealthResponse {
    /// Status with a working store.
    pub fn ok() -> Self {
        Self {
            status: HealthStatus::Ok,
        }
    }

    /// Status without a working store.
    pub fn degraded() -> Self {
        Self {
            status: HealthStatus::Degraded,
        }
    }
}
