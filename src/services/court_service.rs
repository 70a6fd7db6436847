//! Courts, their queues and the referees assigned to them.

use std::collections::HashMap;

use tracing::info;
use uuid::Uuid;

use crate::{
    dao::{
        models::{CourtEntity, RefereeEntity},
        storage::StorageError,
        tournament_store::TournamentStore,
    },
    dto::{
        courts::{
            AssignRefereeRequest, CourtSummary, CourtView, CreateCourtRequest,
            CreateRefereeRequest, RefereeSummary, ZoneSummary,
        },
        matches::MatchSummary,
    },
    error::ServiceError,
    services::sse_events,
    state::{
        GateKey, SharedState,
        model::{Match, MatchStatus},
    },
};

/// Store the configured courts when the store has none. Returns how many were created.
pub async fn seed_courts(
    state: &SharedState,
    store: &dyn TournamentStore,
) -> Result<usize, StorageError> {
    if !store.list_courts().await?.is_empty() {
        return Ok(0);
    }
    let seeds = state.config().courts();
    for seed in seeds {
        store
            .save_court(CourtEntity {
                id: seed.id.clone(),
                name: seed.name.clone(),
                referee_id: None,
            })
            .await?;
    }
    info!(courts = seeds.len(), "seeded courts into empty store");
    Ok(seeds.len())
}

/// Zones from configuration, in declaration order.
pub fn list_zones(state: &SharedState) -> Vec<ZoneSummary> {
    state.config().zones().iter().map(Into::into).collect()
}

async fn referees_by_id(
    store: &dyn TournamentStore,
) -> Result<HashMap<Uuid, RefereeEntity>, ServiceError> {
    Ok(store
        .list_referees()
        .await?
        .into_iter()
        .map(|referee| (referee.id, referee))
        .collect())
}

async fn load_court(store: &dyn TournamentStore, id: &str) -> Result<CourtEntity, ServiceError> {
    store
        .find_court(id.to_string())
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("court `{id}` not found")))
}

async fn summarize(
    store: &dyn TournamentStore,
    court: CourtEntity,
) -> Result<CourtSummary, ServiceError> {
    let referee = match court.referee_id {
        Some(id) => store.find_referee(id).await?,
        None => None,
    };
    Ok(CourtSummary::new(court, referee.as_ref()))
}

/// Courts sorted by id.
pub async fn list_courts(state: &SharedState) -> Result<Vec<CourtSummary>, ServiceError> {
    let store = state.require_store().await?;
    let referees = referees_by_id(store.as_ref()).await?;
    let mut courts = store.list_courts().await?;
    courts.sort_by(|a, b| a.id.cmp(&b.id));
    Ok(courts
        .into_iter()
        .map(|court| {
            let referee = court.referee_id.and_then(|id| referees.get(&id));
            CourtSummary::new(court, referee)
        })
        .collect())
}

/// Register a court; its id must be unused.
pub async fn create_court(
    state: &SharedState,
    request: CreateCourtRequest,
) -> Result<CourtSummary, ServiceError> {
    let store = state.require_store().await?;
    let court = state
        .run_gated(GateKey::Court(request.id.clone()), || async {
            if store.find_court(request.id.clone()).await?.is_some() {
                return Err(ServiceError::Conflict(format!(
                    "court `{}` already exists",
                    request.id
                )));
            }
            let court = CourtEntity {
                id: request.id.clone(),
                name: request.name.trim().to_string(),
                referee_id: None,
            };
            store.save_court(court.clone()).await?;
            Ok(court)
        })
        .await?;

    info!(court_id = %court.id, "court registered");
    let summary = CourtSummary::new(court, None);
    sse_events::broadcast_court_updated(state, summary.clone());
    Ok(summary)
}

/// The live match of a court and its queue of upcoming matches.
pub async fn court_view(state: &SharedState, id: &str) -> Result<CourtView, ServiceError> {
    let store = state.require_store().await?;
    let court = load_court(store.as_ref(), id).await?;
    let court = summarize(store.as_ref(), court).await?;

    let on_court: Vec<Match> = store
        .list_matches()
        .await?
        .into_iter()
        .map(Into::into)
        .filter(|m: &Match| m.court_id.as_deref() == Some(id))
        .collect();

    let live_match = on_court
        .iter()
        .find(|m| m.status == MatchStatus::Live)
        .map(MatchSummary::from);
    let mut queue: Vec<&Match> = on_court
        .iter()
        .filter(|m| m.status == MatchStatus::Upcoming)
        .collect();
    queue.sort_by_key(|m| (m.queue_order, m.created_at));

    Ok(CourtView {
        court,
        live_match,
        queue: queue.into_iter().map(MatchSummary::from).collect(),
    })
}

/// Put a referee in charge of a court, or clear the assignment.
///
/// A referee officiates on a single court at a time.
pub async fn assign_referee(
    state: &SharedState,
    court_id: &str,
    request: AssignRefereeRequest,
) -> Result<CourtSummary, ServiceError> {
    let store = state.require_store().await?;
    let summary = state
        .run_gated(GateKey::Court(court_id.to_string()), || async {
            let mut court = load_court(store.as_ref(), court_id).await?;
            let referee = match request.referee_id {
                Some(referee_id) => {
                    let referee = store.find_referee(referee_id).await?.ok_or_else(|| {
                        ServiceError::NotFound(format!("referee `{referee_id}` not found"))
                    })?;
                    let elsewhere = store.list_courts().await?.into_iter().find(|other| {
                        other.id != court.id && other.referee_id == Some(referee_id)
                    });
                    if let Some(other) = elsewhere {
                        return Err(ServiceError::InvalidState(format!(
                            "referee `{referee_id}` is already assigned to court `{}`",
                            other.id
                        )));
                    }
                    Some(referee)
                }
                None => None,
            };

            court.referee_id = request.referee_id;
            store.save_court(court.clone()).await?;
            Ok(CourtSummary::new(court, referee.as_ref()))
        })
        .await?;

    info!(court_id, referee_id = ?summary.referee_id, "court referee updated");
    sse_events::broadcast_court_updated(state, summary.clone());
    Ok(summary)
}

/// Referees sorted by name, with the court each one is assigned to.
pub async fn list_referees(state: &SharedState) -> Result<Vec<RefereeSummary>, ServiceError> {
    let store = state.require_store().await?;
    let assignments: HashMap<Uuid, String> = store
        .list_courts()
        .await?
        .into_iter()
        .filter_map(|court| court.referee_id.map(|referee_id| (referee_id, court.id)))
        .collect();

    let mut referees = store.list_referees().await?;
    referees.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(referees
        .into_iter()
        .map(|referee| {
            let court_id = assignments.get(&referee.id).cloned();
            RefereeSummary::new(referee, court_id)
        })
        .collect())
}

/// Register a referee, initially without a court.
pub async fn create_referee(
    state: &SharedState,
    request: CreateRefereeRequest,
) -> Result<RefereeSummary, ServiceError> {
    let store = state.require_store().await?;
    let referee = RefereeEntity {
        id: Uuid::new_v4(),
        name: request.name.trim().to_string(),
    };
    store.save_referee(referee.clone()).await?;
    info!(referee_id = %referee.id, name = %referee.name, "referee registered");
    Ok(RefereeSummary::new(referee, None))
}

/// Remove a referee, releasing any court it was assigned to.
pub async fn delete_referee(state: &SharedState, id: Uuid) -> Result<(), ServiceError> {
    let store = state.require_store().await?;
    if !store.delete_referee(id).await? {
        return Err(ServiceError::NotFound(format!("referee `{id}` not found")));
    }

    let assigned = store
        .list_courts()
        .await?
        .into_iter()
        .filter(|court| court.referee_id == Some(id));
    for mut court in assigned {
        court.referee_id = None;
        store.save_court(court.clone()).await?;
        sse_events::broadcast_court_updated(state, CourtSummary::new(court, None));
    }
    info!(referee_id = %id, "referee deleted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        dto::matches::CreateMatchRequest,
        services::{match_service, test_support::seeded_state},
        state::model::Side,
    };

    #[tokio::test]
    async fn seeding_only_fills_an_empty_store() {
        let (state, _, _) = seeded_state().await;
        let store = state.require_store().await.unwrap();

        assert_eq!(seed_courts(&state, store.as_ref()).await.unwrap(), 0);
        let courts = list_courts(&state).await.unwrap();
        let ids: Vec<_> = courts.iter().map(|court| court.id.as_str()).collect();
        assert_eq!(ids, ["court-1", "court-2", "court-3"]);
    }

    #[tokio::test]
    async fn duplicate_court_is_a_conflict() {
        let (state, _, _) = seeded_state().await;
        let err = create_court(
            &state,
            CreateCourtRequest {
                id: "court-1".into(),
                name: "Again".into(),
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(_)));
    }

    #[tokio::test]
    async fn referee_is_assigned_to_a_single_court() {
        let (state, _, _) = seeded_state().await;
        let referee = create_referee(
            &state,
            CreateRefereeRequest {
                name: "Kim".into(),
            },
        )
        .await
        .unwrap();
        let assign = |referee_id| AssignRefereeRequest { referee_id };

        let court = assign_referee(&state, "court-1", assign(Some(referee.id)))
            .await
            .unwrap();
        assert_eq!(court.referee_name.as_deref(), Some("Kim"));

        let err = assign_referee(&state, "court-2", assign(Some(referee.id)))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidState(_)));

        let referees = list_referees(&state).await.unwrap();
        assert_eq!(referees[0].court_id.as_deref(), Some("court-1"));

        delete_referee(&state, referee.id).await.unwrap();
        let courts = list_courts(&state).await.unwrap();
        assert!(courts.iter().all(|court| court.referee_id.is_none()));
    }

    #[tokio::test]
    async fn court_view_splits_live_match_and_queue() {
        let (state, team1, team2) = seeded_state().await;
        let request = || CreateMatchRequest {
            team1_id: team1.id,
            team2_id: team2.id,
            requires_approval: None,
        };
        let mut ids = Vec::new();
        for _ in 0..3 {
            let created = match_service::create_match(&state, request()).await.unwrap();
            match_service::assign_court(&state, created.id, "court-2".into())
                .await
                .unwrap();
            ids.push(created.id);
        }
        match_service::start_match(&state, ids[0]).await.unwrap();
        match_service::record_point(&state, ids[0], Side::Team1)
            .await
            .unwrap();

        let view = court_view(&state, "court-2").await.unwrap();
        assert_eq!(view.live_match.map(|m| m.id), Some(ids[0]));
        let queued: Vec<_> = view.queue.iter().map(|m| m.id).collect();
        assert_eq!(queued, [ids[1], ids[2]]);
    }
}
