//! Sirene Server - Main entry point

use anyhow::Result;
use sirene_common::logging::{init_logging, LogConfig};
use tracing::{error, info};

use sirene_server::{app, config::Config, db::StoreHandle, features::FeatureState};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Environment variables take precedence over these defaults
    let log_config = LogConfig::builder()
        .log_file_prefix("sirene-server")
        .filter_directives("sirene_server=debug,tower_http=debug,mongodb=info")
        .build()
        .merge_env()?;

    let _log_guard = init_logging(&log_config)?;

    info!("Starting Sirene Server");

    let config = Config::load()?;
    info!(
        "Configuration loaded - server will bind to {}:{}",
        config.server.host, config.server.port
    );

    let store = match StoreHandle::connect(&config.mongodb).await {
        Ok(store) => store,
        Err(e) => {
            error!(error = %e, "ConnectionError: cannot reach the document store, aborting startup");
            return Err(e.into());
        },
    };

    let router = app::build_router(FeatureState::new(store.clone()), &config);

    let result = app::serve(router, &config).await;

    store.shutdown().await;
    info!("Document store connections closed");

    result
}
