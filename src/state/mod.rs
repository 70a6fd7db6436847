pub mod lifecycle;
pub mod model;
pub mod scoring;
mod sse;
pub mod statistics;
pub mod transitions;

use std::{future::Future, sync::Arc, time::Duration};

use dashmap::DashMap;
use tokio::sync::{Mutex, RwLock, watch};
use tokio::time::timeout;
use tracing::warn;
use uuid::Uuid;

use crate::{config::AppConfig, dao::tournament_store::TournamentStore, error::ServiceError};

pub use self::sse::SseHub;

/// State handle shared by every handler and background task.
pub type SharedState = Arc<AppState>;
/// Upper bound for work run under a gate.
pub const DEFAULT_TRANSITION_TIMEOUT: Duration = Duration::from_secs(5);

/// Resource whose mutations must not interleave.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum GateKey {
    /// A single match record.
    Match(Uuid),
    /// The queue of a court.
    Court(String),
    /// Statistics of every team, written on completion, recalculation and reset.
    TeamStats,
}

/// Central application state storing the store handle, broadcast hub and mutation gates.
pub struct AppState {
    store: RwLock<Option<Arc<dyn TournamentStore>>>,
    config: Arc<AppConfig>,
    sse: SseHub,
    gates: DashMap<GateKey, Arc<Mutex<()>>>,
    degraded: watch::Sender<bool>,
    transition_timeout: Option<Duration>,
}

impl AppState {
    /// Construct a new [`AppState`] wrapped in an [`Arc`] so it can be cloned cheaply.
    ///
    /// The application starts in degraded mode until a storage backend is installed.
    pub fn new(config: AppConfig) -> SharedState {
        let (degraded_tx, _rx) = watch::channel(true);
        Arc::new(Self {
            store: RwLock::new(None),
            config: Arc::new(config),
            sse: SseHub::new(64),
            gates: DashMap::new(),
            degraded: degraded_tx,
            transition_timeout: Some(DEFAULT_TRANSITION_TIMEOUT),
        })
    }

    /// Obtain a handle to the current store, if one is installed.
    pub async fn store(&self) -> Option<Arc<dyn TournamentStore>> {
        let guard = self.store.read().await;
        guard.as_ref().cloned()
    }

    /// Obtain the current store or fail with [`ServiceError::Degraded`].
    ///
    /// A store that is installed but failing its health checks is refused too.
    pub async fn require_store(&self) -> Result<Arc<dyn TournamentStore>, ServiceError> {
        if self.is_degraded().await {
            return Err(ServiceError::Degraded);
        }
        self.store().await.ok_or(ServiceError::Degraded)
    }

    /// Install a new store implementation and leave degraded mode.
    pub async fn set_store(&self, store: Arc<dyn TournamentStore>) {
        {
            let mut guard = self.store.write().await;
            *guard = Some(store);
        }
        self.update_degraded(false).await;
    }

    /// Remove the current store and enter degraded mode.
    pub async fn clear_store(&self) {
        {
            let mut guard = self.store.write().await;
            guard.take();
        }
        self.update_degraded(true).await;
    }

    /// Current degraded flag.
    pub async fn is_degraded(&self) -> bool {
        *self.degraded.borrow()
    }

    /// Subscribe to degraded mode updates.
    pub fn degraded_watcher(&self) -> watch::Receiver<bool> {
        self.degraded.subscribe()
    }

    /// Update and broadcast the degraded flag when the value changes.
    pub async fn update_degraded(&self, value: bool) {
        self.degraded.send_if_modified(|current| {
            if *current == value {
                false
            } else {
                *current = value;
                true
            }
        });
    }

    /// Broadcast hub used for the SSE stream.
    pub fn sse(&self) -> &SseHub {
        &self.sse
    }

    /// Runtime configuration.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    fn gate(&self, key: &GateKey) -> Arc<Mutex<()>> {
        self.gates
            .entry(key.clone())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Forget the gate of `key` once no caller holds or awaits it.
    ///
    /// The map shard lock is held while counting, so no caller can pick the
    /// gate up between the check and the removal.
    pub fn release_gate(&self, key: &GateKey) {
        self.gates
            .remove_if(key, |_, gate| Arc::strong_count(gate) == 1);
    }

    /// Forget every gate nobody holds or awaits.
    pub fn prune_idle_gates(&self) {
        self.gates.retain(|_, gate| Arc::strong_count(gate) > 1);
    }

    #[cfg(test)]
    pub(crate) fn gate_count(&self) -> usize {
        self.gates.len()
    }

    /// Run `work` while holding the gate of `key`, bounded by the transition timeout.
    pub async fn run_gated<F, Fut, T>(&self, key: GateKey, work: F) -> Result<T, ServiceError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, ServiceError>>,
    {
        let gate = self.gate(&key);
        let _guard = gate.lock().await;

        let work_future = work();
        match self.transition_timeout {
            Some(limit) => match timeout(limit, work_future).await {
                Ok(result) => result,
                Err(_) => {
                    warn!(gate = ?key, "gated operation timed out");
                    Err(ServiceError::Timeout)
                }
            },
            None => work_future.await,
        }
    }
}
