//! Sirene Server Library
//!
//! Read-only HTTP API over the Sirene register of French businesses, backed
//! by a MongoDB collection of establishment documents.
//!
//! # Overview
//!
//! - **API Endpoints**: lookup by SIRET, paged listing, criteria search
//! - **Document Store**: MongoDB driver with a single pooled client
//! - **Configuration**: Environment-based configuration management
//! - **Middleware**: CORS, request tracing, timeouts, compression, panic recovery
//! - **Documentation**: generated OpenAPI document and Swagger UI
//!
//! # Architecture
//!
//! The composition root (`main`) connects one [`db::StoreHandle`] and shares it
//! through [`features::FeatureState`]. Each request builds its own repository
//! and service from that state; handlers only ever see the service.
//!
//! # Example
//!
//! ```no_run
//! use sirene_server::{app, config::Config, db::StoreHandle, features::FeatureState};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load()?;
//!     let store = StoreHandle::connect(&config.mongodb).await?;
//!     let router = app::build_router(FeatureState::new(store), &config);
//!     app::serve(router, &config).await
//! }
//! ```

pub mod api;
pub mod app;
pub mod config;
pub mod db;
pub mod error;
pub mod features;
pub mod middleware;
pub mod openapi;

// Re-export commonly used types
pub use error::AppError;
