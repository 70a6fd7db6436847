/// Court, referee and zone management.
pub mod court_service;
/// OpenAPI documentation generation.
pub mod documentation;
/// Health check service.
pub mod health_service;
/// Match scheduling and scoring commands.
pub mod match_service;
/// Server-Sent Events message generation.
pub mod sse_events;
/// Server-Sent Events broadcasting service.
pub mod sse_service;
/// Standings, averages and statistics recalculation.
pub mod statistics_service;
/// Storage connection supervisor toggling degraded mode.
pub mod storage_supervisor;
/// Team registry.
pub mod team_service;
/// Tournament reset.
pub mod tournament_service;

#[cfg(test)]
pub(crate) mod test_support;
