//! Match scheduling and every referee/administrator command on a match.
//!
//! Commands go through [`run_match_transition`], which serialises writers per
//! match and persists with an optimistic version check.

use tracing::info;
use uuid::Uuid;

use crate::{
    dao::{models::MatchStatusEntity, tournament_store::TournamentStore},
    dto::matches::{CreateMatchRequest, MatchListQuery, MatchSummary},
    error::ServiceError,
    services::sse_events,
    state::{
        GateKey, SharedState,
        lifecycle::MatchCommand,
        model::{Match, MatchStatus, Side, Team},
        transitions::run_match_transition,
    },
};

pub(crate) async fn load_match(
    store: &dyn TournamentStore,
    id: Uuid,
) -> Result<Match, ServiceError> {
    store
        .find_match(id)
        .await?
        .map(Into::into)
        .ok_or_else(|| ServiceError::NotFound(format!("match `{id}` not found")))
}

pub(crate) async fn load_team(store: &dyn TournamentStore, id: Uuid) -> Result<Team, ServiceError> {
    store
        .find_team(id)
        .await?
        .map(Into::into)
        .ok_or_else(|| ServiceError::NotFound(format!("team `{id}` not found")))
}

/// Schedule a match between two registered teams of the same zone.
pub async fn create_match(
    state: &SharedState,
    request: CreateMatchRequest,
) -> Result<MatchSummary, ServiceError> {
    let store = state.require_store().await?;
    let team1 = load_team(store.as_ref(), request.team1_id).await?;
    let team2 = load_team(store.as_ref(), request.team2_id).await?;
    let requires_approval = request
        .requires_approval
        .unwrap_or_else(|| state.config().approval_required());

    let created = Match::new(
        Uuid::new_v4(),
        (&team1).into(),
        (&team2).into(),
        requires_approval,
    )?;
    store.save_match(created.clone().into(), None).await?;
    info!(
        match_id = %created.id,
        team1 = %team1.name,
        team2 = %team2.name,
        zone = %team1.zone,
        "match scheduled"
    );

    let summary = MatchSummary::from(&created);
    sse_events::broadcast_match_created(state, summary.clone());
    Ok(summary)
}

/// Matches passing the query filters, oldest first.
pub async fn list_matches(
    state: &SharedState,
    query: &MatchListQuery,
) -> Result<Vec<MatchSummary>, ServiceError> {
    let store = state.require_store().await?;
    let mut matches: Vec<Match> = store
        .list_matches()
        .await?
        .into_iter()
        .map(Into::into)
        .filter(|m| query.accepts(m))
        .collect();
    matches.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
    Ok(matches.iter().map(Into::into).collect())
}

/// Fetch one match.
pub async fn get_match(state: &SharedState, id: Uuid) -> Result<MatchSummary, ServiceError> {
    let store = state.require_store().await?;
    Ok(load_match(store.as_ref(), id).await?.into())
}

/// Remove a match that is not being played.
pub async fn delete_match(state: &SharedState, id: Uuid) -> Result<(), ServiceError> {
    let store = state.require_store().await?;
    state
        .run_gated(GateKey::Match(id), || async {
            let existing = load_match(store.as_ref(), id).await?;
            if existing.status == MatchStatus::Live {
                return Err(ServiceError::InvalidState(format!(
                    "match `{id}` is live and cannot be deleted"
                )));
            }
            store.delete_match(id).await?;
            Ok(())
        })
        .await?;
    state.release_gate(&GateKey::Match(id));

    info!(match_id = %id, "match deleted");
    sse_events::broadcast_match_deleted(state, id);
    Ok(())
}

/// Queue an upcoming match at the tail of a court's queue.
pub async fn assign_court(
    state: &SharedState,
    id: Uuid,
    court_id: String,
) -> Result<MatchSummary, ServiceError> {
    let store = state.require_store().await?;
    if store.find_court(court_id.clone()).await?.is_none() {
        return Err(ServiceError::NotFound(format!(
            "court `{court_id}` not found"
        )));
    }

    let updated = state
        .run_gated(GateKey::Court(court_id.clone()), || async {
            let queue_order = next_queue_order(store.as_ref(), &court_id, id).await?;
            run_match_transition(
                state,
                id,
                MatchCommand::AssignCourt {
                    court_id: court_id.clone(),
                    queue_order,
                },
            )
            .await
        })
        .await?;
    Ok(updated.into())
}

async fn next_queue_order(
    store: &dyn TournamentStore,
    court_id: &str,
    exclude: Uuid,
) -> Result<u32, ServiceError> {
    let tail = store
        .list_matches()
        .await?
        .into_iter()
        .filter(|m| m.id != exclude && m.court_id.as_deref() == Some(court_id))
        .filter_map(|m| m.queue_order)
        .max();
    Ok(tail.map_or(1, |order| order + 1))
}

/// Open play on an upcoming match.
pub async fn start_match(state: &SharedState, id: Uuid) -> Result<MatchSummary, ServiceError> {
    command(state, id, MatchCommand::Start).await
}

/// Award a rally to `team`.
pub async fn record_point(
    state: &SharedState,
    id: Uuid,
    team: Side,
) -> Result<MatchSummary, ServiceError> {
    command(state, id, MatchCommand::RecordPoint(team)).await
}

/// Close the current set in favour of `winner`.
///
/// With `set_number`, a repeated request for an already closed set is
/// rejected instead of closing the next one.
pub async fn end_set(
    state: &SharedState,
    id: Uuid,
    winner: Side,
    set_number: Option<u8>,
) -> Result<MatchSummary, ServiceError> {
    command(state, id, MatchCommand::EndSet { winner, set_number }).await
}

/// Revert the last point of the current set; a no-op when there is none.
pub async fn undo_last_score(state: &SharedState, id: Uuid) -> Result<MatchSummary, ServiceError> {
    command(state, id, MatchCommand::Undo).await
}

/// Ask an administrator to close a decided match.
pub async fn request_approval(
    state: &SharedState,
    id: Uuid,
    requested_by: String,
) -> Result<MatchSummary, ServiceError> {
    command(state, id, MatchCommand::RequestApproval { requested_by }).await
}

/// Confirm the pending request and complete the match.
pub async fn approve(state: &SharedState, id: Uuid) -> Result<MatchSummary, ServiceError> {
    command(state, id, MatchCommand::Approve).await
}

/// Turn down the pending request.
pub async fn reject(state: &SharedState, id: Uuid) -> Result<MatchSummary, ServiceError> {
    command(state, id, MatchCommand::Reject).await
}

/// Complete a decided match without the approval round.
pub async fn finish_match(state: &SharedState, id: Uuid) -> Result<MatchSummary, ServiceError> {
    command(state, id, MatchCommand::Finish).await
}

async fn command(
    state: &SharedState,
    id: Uuid,
    command: MatchCommand,
) -> Result<MatchSummary, ServiceError> {
    run_match_transition(state, id, command)
        .await
        .map(MatchSummary::from)
}

/// Whether `team_id` still has a match that is not completed.
pub(crate) async fn has_open_matches(
    store: &dyn TournamentStore,
    team_id: Uuid,
) -> Result<bool, ServiceError> {
    Ok(store.list_matches().await?.into_iter().any(|m| {
        m.status != MatchStatusEntity::Completed
            && (m.team1.id == team_id || m.team2.id == team_id)
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        dto::matches::VisibleMatchStatus,
        services::test_support::{seeded_state, team_in_zone},
        state::model::MatchError,
    };

    fn request(team1: &Team, team2: &Team) -> CreateMatchRequest {
        CreateMatchRequest {
            team1_id: team1.id,
            team2_id: team2.id,
            requires_approval: None,
        }
    }

    #[tokio::test]
    async fn cross_zone_match_is_rejected() {
        let (state, team1, _) = seeded_state().await;
        let outsider = team_in_zone(&state, "Drop Shots", "zone-b").await;

        let err = create_match(&state, request(&team1, &outsider))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Match(MatchError::Validation(_))));
    }

    #[tokio::test]
    async fn unknown_team_is_not_found() {
        let (state, team1, _) = seeded_state().await;
        let err = create_match(
            &state,
            CreateMatchRequest {
                team1_id: team1.id,
                team2_id: Uuid::new_v4(),
                requires_approval: None,
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[tokio::test]
    async fn court_assignment_appends_to_queue_tail() {
        let (state, team1, team2) = seeded_state().await;
        let first = create_match(&state, request(&team1, &team2)).await.unwrap();
        let second = create_match(&state, request(&team2, &team1)).await.unwrap();

        let first = assign_court(&state, first.id, "court-1".into()).await.unwrap();
        let second = assign_court(&state, second.id, "court-1".into())
            .await
            .unwrap();
        assert_eq!(first.queue_order, Some(1));
        assert_eq!(second.queue_order, Some(2));
        assert_eq!(second.status, VisibleMatchStatus::Upcoming);

        let err = assign_court(&state, first.id, "court-9".into())
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[tokio::test]
    async fn full_match_with_approval_gate() {
        let (state, team1, team2) = seeded_state().await;
        let created = create_match(
            &state,
            CreateMatchRequest {
                requires_approval: Some(true),
                ..request(&team1, &team2)
            },
        )
        .await
        .unwrap();
        let id = created.id;

        start_match(&state, id).await.unwrap();
        record_point(&state, id, Side::Team2).await.unwrap();
        end_set(&state, id, Side::Team2, Some(1)).await.unwrap();
        let repeated = end_set(&state, id, Side::Team2, Some(1)).await.unwrap_err();
        assert!(matches!(
            repeated,
            ServiceError::Match(MatchError::AlreadyLocked { set_number: 1 })
        ));

        let decided = end_set(&state, id, Side::Team2, Some(2)).await.unwrap();
        assert_eq!(decided.status, VisibleMatchStatus::Live);
        assert_eq!(decided.sets_won.team2, 2);

        let pending = request_approval(&state, id, "Ref Kim".into()).await.unwrap();
        assert_eq!(pending.status, VisibleMatchStatus::PendingApproval);
        let blocked = undo_last_score(&state, id).await.unwrap_err();
        assert!(matches!(blocked, ServiceError::Match(MatchError::InvalidState(_))));

        let completed = approve(&state, id).await.unwrap();
        assert_eq!(completed.status, VisibleMatchStatus::Completed);
        assert_eq!(completed.winner, Some(Side::Team2));
        assert_eq!(completed.court_id, None);
    }

    #[tokio::test]
    async fn live_match_cannot_be_deleted() {
        let (state, team1, team2) = seeded_state().await;
        let created = create_match(&state, request(&team1, &team2)).await.unwrap();
        start_match(&state, created.id).await.unwrap();

        let err = delete_match(&state, created.id).await.unwrap_err();
        assert!(matches!(err, ServiceError::InvalidState(_)));

        let upcoming = create_match(&state, request(&team1, &team2)).await.unwrap();
        delete_match(&state, upcoming.id).await.unwrap();
        // only the live match keeps its gate
        assert_eq!(state.gate_count(), 1);
        assert!(matches!(
            get_match(&state, upcoming.id).await,
            Err(ServiceError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn undo_without_history_returns_match_unchanged() {
        let (state, team1, team2) = seeded_state().await;
        let created = create_match(&state, request(&team1, &team2)).await.unwrap();
        start_match(&state, created.id).await.unwrap();

        let undone = undo_last_score(&state, created.id).await.unwrap();
        assert_eq!(undone.version, 1);
        assert!(!undone.can_undo);
    }
}
