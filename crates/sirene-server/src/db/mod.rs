//! Document store client
//!
//! One [`StoreHandle`] is built by the composition root and cloned into every
//! request. The driver's `Client` is internally reference-counted and pools
//! its connections, so clones share the same pool.

use mongodb::{
    bson::{doc, Document},
    options::ClientOptions,
    Client, Collection, Database,
};
use std::time::Duration;
use thiserror::Error;

use crate::config::MongoConfig;

/// Application name reported to the server in the connection handshake
const APP_NAME: &str = "sirene-server";

/// Failure to establish the store connection at startup
#[derive(Error, Debug)]
pub enum ConnectionError {
    /// The connection string could not be parsed
    #[error("Invalid MongoDB connection string: {0}")]
    InvalidConnectionString(#[source] mongodb::error::Error),

    /// The client could not be built from the parsed options
    #[error("Failed to create MongoDB client: {0}")]
    Client(#[source] mongodb::error::Error),

    /// The initial ping against the database did not succeed
    #[error("MongoDB database '{database}' is unreachable: {source}")]
    Unreachable {
        database: String,
        #[source]
        source: mongodb::error::Error,
    },
}

/// Shared, read-only handle to the establishment collection's database
#[derive(Clone, Debug)]
pub struct StoreHandle {
    client: Client,
    database: Database,
    collection: String,
}

impl StoreHandle {
    /// Connect and verify reachability with a `ping`
    ///
    /// Fails loudly so the caller can abort startup instead of serving
    /// requests against an unusable store.
    pub async fn connect(config: &MongoConfig) -> Result<Self, ConnectionError> {
        let mut options = ClientOptions::parse(&config.connection_string)
            .await
            .map_err(ConnectionError::InvalidConnectionString)?;

        options.app_name = Some(APP_NAME.to_string());
        options.connect_timeout = Some(Duration::from_secs(config.connect_timeout_secs));
        options.server_selection_timeout =
            Some(Duration::from_secs(config.server_selection_timeout_secs));

        let client = Client::with_options(options).map_err(ConnectionError::Client)?;
        let database = client.database(&config.database_name);

        let handle = Self {
            client,
            database,
            collection: config.collection.clone(),
        };

        handle.ping().await.map_err(|source| ConnectionError::Unreachable {
            database: config.database_name.clone(),
            source,
        })?;

        tracing::info!(
            database = %config.database_name,
            collection = %config.collection,
            "Connected to MongoDB"
        );

        Ok(handle)
    }

    /// Round-trip to the server; used at startup and by the readiness probe
    pub async fn ping(&self) -> Result<(), mongodb::error::Error> {
        self.database.run_command(doc! { "ping": 1 }).await?;
        Ok(())
    }

    /// Raw document view of the establishment collection
    ///
    /// Documents are decoded by the repository so that a single malformed
    /// record does not poison a whole cursor.
    pub fn etablissements(&self) -> Collection<Document> {
        self.database.collection::<Document>(&self.collection)
    }

    pub fn database_name(&self) -> &str {
        self.database.name()
    }

    /// Close pooled connections; called once during graceful shutdown
    pub async fn shutdown(self) {
        self.client.shutdown().await;
    }
}
