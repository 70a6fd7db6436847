use serde::Serialize;
use utoipa::ToSchema;

/// Outcome of a tournament reset.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ResetResponse {
    /// Matches removed from the store.
    pub deleted_matches: usize,
    /// Teams whose statistics were zeroed.
    pub teams_reset: usize,
}
