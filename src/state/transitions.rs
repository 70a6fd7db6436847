//! Persisted match transitions: load, apply a command, store with a version
//! check and broadcast, one caller per match at a time.

use std::sync::Arc;

use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{
    dao::tournament_store::TournamentStore,
    error::ServiceError,
    services::sse_events,
    state::{
        GateKey, SharedState,
        lifecycle::{MatchCommand, Transition},
        model::{Match, MatchOutcome, Side, Team},
        statistics::{OutcomePoints, apply_outcome},
    },
};

/// Apply `command` to the stored match and return its new state.
///
/// Rejected commands leave the stored record untouched. Commands able to
/// complete the match run under the statistics gate as well, so the completing
/// save and the credit to both teams are never split by a recalculation or a
/// reset. Lock order is statistics first, then the match.
pub async fn run_match_transition(
    state: &SharedState,
    match_id: Uuid,
    command: MatchCommand,
) -> Result<Match, ServiceError> {
    let store = state.require_store().await?;

    let (updated, transition, credited) = if command.may_complete() {
        let scheme = state.config().outcome_points();
        state
            .run_gated(GateKey::TeamStats, || async move {
                let (updated, transition) = state
                    .run_gated(GateKey::Match(match_id), || {
                        apply_and_save(store.clone(), match_id, command)
                    })
                    .await?;
                let credited = match transition {
                    Transition::Completed(outcome) => {
                        credit_teams(store.as_ref(), &updated, &outcome, scheme).await?
                    }
                    _ => Vec::new(),
                };
                Ok((updated, transition, credited))
            })
            .await?
    } else {
        let (updated, transition) = state
            .run_gated(GateKey::Match(match_id), || {
                apply_and_save(store.clone(), match_id, command)
            })
            .await?;
        (updated, transition, Vec::new())
    };

    if transition == Transition::Unchanged {
        return Ok(updated);
    }

    sse_events::broadcast_match_updated(state, (&updated).into());
    if let Transition::Completed(outcome) = transition {
        info!(match_id = %match_id, winner = ?outcome.winner, "match completed");
    }
    for team in credited {
        sse_events::broadcast_team_updated(state, team.into());
    }
    Ok(updated)
}

async fn apply_and_save(
    store: Arc<dyn TournamentStore>,
    match_id: Uuid,
    command: MatchCommand,
) -> Result<(Match, Transition), ServiceError> {
    let current: Match = store
        .find_match(match_id)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("match `{match_id}` not found")))?
        .into();

    let mut next = current.clone();
    let transition = match next.apply(command.clone()) {
        Ok(transition) => transition,
        Err(err) => {
            warn!(match_id = %match_id, ?command, error = %err, "match command rejected");
            return Err(err.into());
        }
    };
    if transition == Transition::Unchanged {
        debug!(match_id = %match_id, ?command, "match command had no effect");
        return Ok((current, transition));
    }

    next.version = current.version + 1;
    store
        .save_match(next.clone().into(), Some(current.version))
        .await?;
    Ok((next, transition))
}

/// Credit a completed match to both teams. Callers hold the statistics gate.
async fn credit_teams(
    store: &dyn TournamentStore,
    completed: &Match,
    outcome: &MatchOutcome,
    scheme: OutcomePoints,
) -> Result<Vec<Team>, ServiceError> {
    let mut updated = Vec::with_capacity(2);
    for side in [Side::Team1, Side::Team2] {
        let team_id = completed.team(side).id;
        let Some(entity) = store.find_team(team_id).await? else {
            warn!(team_id = %team_id, "completed match references a deleted team");
            continue;
        };
        let mut team: Team = entity.into();
        apply_outcome(&mut team.stats, side, outcome, scheme);
        store.save_team(team.clone().into()).await?;
        updated.push(team);
    }
    Ok(updated)
}
