//! Shuttle Court Back binary entrypoint wiring REST, SSE and the storage backends.

use std::{env, net::SocketAddr, sync::Arc};

use anyhow::{Context, bail};
use axum::Router;
use futures::future::BoxFuture;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use shuttle_court_back::{
    config::AppConfig,
    dao::{
        storage::StorageError,
        tournament_store::{TournamentStore, memory::MemoryTournamentStore},
    },
    routes,
    services::{sse_events, storage_supervisor},
    state::{AppState, SharedState},
};

type ConnectFuture = BoxFuture<'static, Result<Arc<dyn TournamentStore>, StorageError>>;
type Connector = Box<dyn FnMut() -> ConnectFuture + Send + 'static>;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let app_state = AppState::new(AppConfig::load());
    let connector = storage_connector()?;

    tokio::spawn(storage_supervisor::run(app_state.clone(), connector));
    tokio::spawn(broadcast_degraded_changes(app_state.clone()));
    // Build the HTTP router once the shared state is ready.
    let app = build_router(app_state);

    let port = env::var("PORT")
        .or_else(|_| env::var("SERVER_PORT"))
        .ok()
        .and_then(|value| value.parse::<u16>().ok())
        .unwrap_or(8080);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!(%addr, "starting server");

    let listener = TcpListener::bind(addr).await.context("binding server")?;
    let service = app.into_make_service();
    axum::serve(listener, service)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving axum")?;

    Ok(())
}

/// Pick the storage backend from `STORAGE_BACKEND` (`memory`, `mongo` or `couch`).
fn storage_connector() -> anyhow::Result<Connector> {
    let backend = env::var("STORAGE_BACKEND").unwrap_or_else(|_| "memory".into());
    info!(backend = %backend, "selecting storage backend");

    match backend.as_str() {
        "memory" => {
            let store = MemoryTournamentStore::new();
            Ok(Box::new(move || -> ConnectFuture {
                let store: Arc<dyn TournamentStore> = Arc::new(store.clone());
                Box::pin(async move { Ok(store) })
            }))
        }
        #[cfg(feature = "mongo-store")]
        "mongo" => {
            use shuttle_court_back::dao::tournament_store::mongodb::{
                MongoTournamentStore, connect, ensure_indexes,
            };

            let uri = env::var("MONGO_URI").unwrap_or_else(|_| "mongodb://localhost:27017".into());
            let db_name = env::var("MONGO_DB").ok();
            Ok(Box::new(move || -> ConnectFuture {
                let uri = uri.clone();
                let db_name = db_name.clone();
                Box::pin(async move {
                    let manager = connect(&uri, db_name.as_deref()).await?;
                    ensure_indexes(&manager.database().await).await?;
                    let store: Arc<dyn TournamentStore> =
                        Arc::new(MongoTournamentStore::new(manager));
                    Ok(store)
                })
            }))
        }
        #[cfg(feature = "couch-store")]
        "couch" => {
            use shuttle_court_back::dao::tournament_store::couchdb::{
                CouchConfig, CouchTournamentStore,
            };

            let config = CouchConfig::from_env().context("reading CouchDB configuration")?;
            Ok(Box::new(move || -> ConnectFuture {
                let config = config.clone();
                Box::pin(async move {
                    let store: Arc<dyn TournamentStore> =
                        Arc::new(CouchTournamentStore::connect(config).await?);
                    Ok(store)
                })
            }))
        }
        other => bail!("unsupported storage backend `{other}`"),
    }
}

/// Forward degraded-mode flips to SSE subscribers.
async fn broadcast_degraded_changes(state: SharedState) {
    let mut watcher = state.degraded_watcher();
    while watcher.changed().await.is_ok() {
        let degraded = *watcher.borrow_and_update();
        info!(degraded, "storage status changed");
        sse_events::broadcast_system_status(&state, degraded);
    }
}

/// Build the top-level router and attach cross-cutting middleware layers.
fn build_router(state: SharedState) -> Router<()> {
    routes::router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Configure tracing subscribers so logs include spans by default.
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,tower_http=debug".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Wait for Ctrl+C or SIGTERM and shut the server down gracefully.
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {},
                    _ = term.recv() => {},
                }
            }
            Err(err) => {
                tracing::warn!(error = %err, "failed to install SIGTERM handler");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
