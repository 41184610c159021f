//! Establishments of the Sirene register
//!
//! - `model` - Entity decoded from the store
//! - `filter` - Search criteria and their store query
//! - `repository` - Store access behind a trait
//! - `service` - Per-request facade used by the handlers
//! - `routes` - HTTP handlers

pub mod filter;
pub mod model;
pub mod repository;
pub mod routes;
pub mod service;

pub use filter::EtablissementFilter;
pub use model::{
    AdresseEtablissement, Etablissement, EtatAdministratif, PeriodeEtablissement, UniteLegale,
};
pub use repository::{
    EtablissementRepository, EtablissementStream, MongoEtablissementRepository, RepositoryError,
};
pub use routes::etablissements_routes;
pub use service::EtablissementService;
