use std::{sync::Arc, time::Duration};

use mongodb::{
    Client, Database, IndexModel,
    bson::{Document, doc},
    options::{ClientOptions, IndexOptions},
};
use tokio::{sync::RwLock, time::sleep};
use tracing::{info, warn};

use super::error::{MongoDaoError, Result};

const DEFAULT_DB: &str = "shuttle_court";
const MAX_CONNECT_ATTEMPTS: u32 = 10;
const BASE_RETRY_DELAY_MS: u64 = 250;

pub(super) const TEAM_COLLECTION: &str = "teams";
pub(super) const MATCH_COLLECTION: &str = "matches";
pub(super) const COURT_COLLECTION: &str = "courts";
pub(super) const REFEREE_COLLECTION: &str = "referees";

/// Shared MongoDB handle that can swap its connection after a failure.
#[derive(Clone)]
pub struct MongoManager {
    inner: Arc<MongoManagerInner>,
}

struct MongoManagerInner {
    state: RwLock<MongoState>,
    options: ClientOptions,
    database_name: String,
}

struct MongoState {
    client: Client,
    database: Database,
}

/// Connect to MongoDB, retrying the initial ping with backoff.
pub async fn connect(uri: &str, db_name: Option<&str>) -> Result<MongoManager> {
    let database_name = db_name.unwrap_or(DEFAULT_DB).to_owned();
    let options = ClientOptions::parse(uri)
        .await
        .map_err(|source| MongoDaoError::InvalidUri {
            uri: uri.to_owned(),
            source,
        })?;

    let (client, database) = establish_connection(&options, &database_name).await?;

    Ok(MongoManager {
        inner: Arc::new(MongoManagerInner {
            state: RwLock::new(MongoState { client, database }),
            options,
            database_name,
        }),
    })
}

/// Create the lookup indexes used by queue and zone queries.
///
/// Court queues are read by `(court_id, queue_order)`, teams by zone and
/// courts by their assigned referee.
pub async fn ensure_indexes(database: &Database) -> Result<()> {
    let indexes = [
        (
            MATCH_COLLECTION,
            "court_queue",
            doc! { "court_id": 1, "queue_order": 1 },
        ),
        (TEAM_COLLECTION, "zone", doc! { "zone": 1 }),
        (COURT_COLLECTION, "referee", doc! { "referee_id": 1 }),
    ];

    for (collection, index, keys) in indexes {
        let model = IndexModel::builder()
            .keys(keys)
            .options(
                IndexOptions::builder()
                    .name(Some(format!("{collection}_{index}_idx")))
                    .build(),
            )
            .build();
        database
            .collection::<Document>(collection)
            .create_index(model)
            .await
            .map_err(|source| MongoDaoError::EnsureIndex {
                collection,
                index,
                source,
            })?;
    }
    Ok(())
}

impl MongoManager {
    /// Clone the current database handle.
    pub async fn database(&self) -> Database {
        let guard = self.inner.state.read().await;
        guard.database.clone()
    }

    /// Issue a ping against the current MongoDB connection.
    pub async fn ping(&self) -> Result<()> {
        self.database()
            .await
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|source| MongoDaoError::HealthPing { source })?;
        Ok(())
    }

    /// Replace the current client with a freshly established one.
    pub async fn reconnect(&self) -> Result<()> {
        match establish_connection(&self.inner.options, &self.inner.database_name).await {
            Ok((client, database)) => {
                let mut guard = self.inner.state.write().await;
                guard.client = client;
                guard.database = database;
                info!("MongoDB connection re-established");
                Ok(())
            }
            Err(err) => {
                warn!(error = %err, "failed to re-establish MongoDB connection");
                Err(err)
            }
        }
    }
}

async fn establish_connection(
    options: &ClientOptions,
    database_name: &str,
) -> Result<(Client, Database)> {
    let client = Client::with_options(options.clone())
        .map_err(|source| MongoDaoError::ClientConstruction { source })?;
    let database = client.database(database_name);

    let mut attempts = 0;
    let mut interval = Duration::from_millis(BASE_RETRY_DELAY_MS);

    loop {
        match database.run_command(doc! { "ping": 1 }).await {
            Ok(_) => break,
            Err(err) => {
                attempts += 1;
                if attempts >= MAX_CONNECT_ATTEMPTS {
                    return Err(MongoDaoError::InitialPing {
                        attempts,
                        source: err,
                    });
                }
                sleep(interval).await;
                interval = (interval * 2).min(Duration::from_secs(5));
            }
        }
    }

    Ok((client, database))
}
