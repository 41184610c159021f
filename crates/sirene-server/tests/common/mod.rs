//! Common test utilities for Sirene server integration tests using testcontainers
//!
//! Spins up a throwaway MongoDB and seeds it with establishment documents.
//! Docker must be available; tests using this module are `#[ignore]`d by
//! default and run with:
//!
//! ```bash
//! cargo test -p sirene-server --test mongo_repository_tests -- --ignored
//! ```

use anyhow::{Context, Result};
use mongodb::bson::{doc, Document};
use sirene_server::{config::MongoConfig, db::StoreHandle};
use testcontainers::{core::IntoContainerPort, runners::AsyncRunner, ContainerAsync, ImageExt};
use testcontainers_modules::mongo::Mongo;

/// Database created inside the container for each test
pub const TEST_DATABASE: &str = "sirene_test";

/// MongoDB test container wrapper
///
/// The container is stopped when the value is dropped.
pub struct TestMongo {
    _container: ContainerAsync<Mongo>,
    connection_string: String,
}

impl TestMongo {
    /// Start a new MongoDB container
    pub async fn start() -> Result<Self> {
        let container = Mongo::default()
            .with_tag("7")
            .start()
            .await
            .context("Failed to start MongoDB container")?;

        let host = container
            .get_host()
            .await
            .context("Failed to get container host")?;
        let port = container
            .get_host_port_ipv4(27017.tcp())
            .await
            .context("Failed to get container port")?;

        Ok(Self {
            _container: container,
            connection_string: format!("mongodb://{}:{}", host, port),
        })
    }

    pub fn config(&self) -> MongoConfig {
        MongoConfig::new(&self.connection_string, TEST_DATABASE)
    }

    /// Connect a store handle to the test database
    pub async fn store(&self) -> Result<StoreHandle> {
        StoreHandle::connect(&self.config())
            .await
            .context("Failed to connect to test MongoDB")
    }

    /// Insert raw documents into the establishment collection
    pub async fn seed(&self, documents: Vec<Document>) -> Result<()> {
        let store = self.store().await?;
        store
            .etablissements()
            .insert_many(documents)
            .await
            .context("Failed to seed establishments")?;
        Ok(())
    }
}

/// Well-formed establishment document as stored by the register import
pub fn etablissement_document(siret: &str) -> Document {
    doc! {
        "siret": siret,
        "siren": &siret[..9],
        "nic": &siret[9..],
        "dateCreationEtablissement": "2001-03-15",
        "etablissementSiege": siret.ends_with("00001"),
        "uniteLegale": { "denominationUniteLegale": "SOCIETE TEST" },
        "adresseEtablissement": {
            "codePostalEtablissement": "75008",
            "libelleCommuneEtablissement": "PARIS 8"
        },
        "periodesEtablissement": [
            {
                "dateDebut": "2001-03-15",
                "etatAdministratifEtablissement": "A",
                "activitePrincipaleEtablissement": "62.01Z"
            }
        ]
    }
}

/// `count` documents for legal unit `siren`, NICs 00001 upwards
pub fn etablissement_documents(siren: &str, count: usize) -> Vec<Document> {
    (1..=count)
        .map(|nic| etablissement_document(&format!("{}{:05}", siren, nic)))
        .collect()
}
