//! Feature modules implementing the Sirene API
//!
//! Each feature is a vertical slice with its own model, data access, service
//! and routes. The only feature today is **etablissements**, the read-only
//! view over the register's establishments.

pub mod etablissements;
pub mod shared;

use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;

use crate::db::StoreHandle;
use etablissements::{EtablissementRepository, MongoEtablissementRepository, RepositoryError};

/// Source of per-request repositories
///
/// Implemented by the store handle in production and by in-memory fakes in
/// tests.
#[async_trait]
pub trait DataSource: Send + Sync {
    fn etablissements(&self) -> Arc<dyn EtablissementRepository>;

    /// Check the backing store is reachable
    async fn ping(&self) -> Result<(), RepositoryError>;
}

#[async_trait]
impl DataSource for StoreHandle {
    fn etablissements(&self) -> Arc<dyn EtablissementRepository> {
        Arc::new(MongoEtablissementRepository::new(self.clone()))
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        StoreHandle::ping(self).await?;
        Ok(())
    }
}

/// Shared state for all feature routes
#[derive(Clone)]
pub struct FeatureState {
    pub data: Arc<dyn DataSource>,
}

impl FeatureState {
    pub fn new(data: impl DataSource + 'static) -> Self {
        Self {
            data: Arc::new(data),
        }
    }
}

/// Creates the API router with all feature routes mounted
///
/// - `/etablissements` - Establishment lookup, listing and search
pub fn router() -> Router<FeatureState> {
    Router::new().nest("/etablissements", etablissements::etablissements_routes())
}
