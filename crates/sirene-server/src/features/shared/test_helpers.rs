//! In-memory data source and fixtures for router tests

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use chrono::NaiveDate;
use futures::{stream, StreamExt};
use mongodb::bson::{self, doc};
use sirene_common::types::Siret;

use crate::features::{
    etablissements::{
        AdresseEtablissement, Etablissement, EtablissementFilter, EtablissementRepository,
        EtablissementStream, EtatAdministratif, PeriodeEtablissement, RepositoryError,
        UniteLegale,
    },
    shared::pagination::{Page, PageRequest},
    DataSource, FeatureState,
};

/// Establishment with the given SIRET, active, in Paris 8
pub fn etablissement(siret: &str) -> Etablissement {
    let siret: Siret = siret.parse().unwrap();
    Etablissement {
        siren: siret.siren(),
        nic: siret.nic().to_string(),
        siret,
        statut_diffusion_etablissement: Some("O".to_string()),
        date_creation_etablissement: NaiveDate::from_ymd_opt(2001, 3, 15),
        tranche_effectifs_etablissement: None,
        date_dernier_traitement_etablissement: None,
        etablissement_siege: false,
        unite_legale: Some(UniteLegale {
            denomination_unite_legale: Some("SOCIETE TEST".to_string()),
            ..Default::default()
        }),
        adresse_etablissement: Some(AdresseEtablissement {
            code_postal_etablissement: Some("75008".to_string()),
            libelle_commune_etablissement: Some("PARIS 8".to_string()),
            ..Default::default()
        }),
        periodes_etablissement: vec![PeriodeEtablissement {
            date_debut: NaiveDate::from_ymd_opt(2001, 3, 15),
            etat_administratif_etablissement: Some(EtatAdministratif::Actif),
            activite_principale_etablissement: Some("62.01Z".to_string()),
            ..Default::default()
        }],
    }
}

/// `count` establishments of legal unit `siren`, NICs 00001 upwards
pub fn etablissements_of(siren: &str, count: usize) -> Vec<Etablissement> {
    (1..=count)
        .map(|nic| etablissement(&format!("{}{:05}", siren, nic)))
        .collect()
}

fn store_down() -> RepositoryError {
    let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "connection refused");
    RepositoryError::StoreUnavailable(mongodb::error::Error::from(io))
}

fn malformed(siret: &Siret) -> RepositoryError {
    let source = match bson::from_document::<Etablissement>(doc! { "nic": 1 }) {
        Err(e) => e,
        Ok(_) => unreachable!("document without siret decoded"),
    };
    RepositoryError::MalformedDocument {
        context: format!("siret={}", siret),
        source,
    }
}

#[derive(Debug, Default)]
pub struct InMemoryEtablissementRepository {
    records: Vec<Etablissement>,
    malformed: Vec<Siret>,
    unavailable: bool,
    lookup_delay: Option<Duration>,
}

impl InMemoryEtablissementRepository {
    pub fn new(mut records: Vec<Etablissement>) -> Self {
        records.sort_by(|a, b| a.siret.cmp(&b.siret));
        Self {
            records,
            ..Default::default()
        }
    }

    /// Every call fails as if the store were unreachable
    pub fn unavailable() -> Self {
        Self {
            unavailable: true,
            ..Default::default()
        }
    }

    /// Lookups of `siret` fail to decode
    pub fn with_malformed(mut self, siret: &str) -> Self {
        self.malformed.push(siret.parse().unwrap());
        self
    }

    /// Single lookups wait `delay` before answering
    pub fn with_lookup_delay(mut self, delay: Duration) -> Self {
        self.lookup_delay = Some(delay);
        self
    }
}

#[async_trait]
impl EtablissementRepository for InMemoryEtablissementRepository {
    async fn find_by_id(&self, siret: &Siret) -> Result<Option<Etablissement>, RepositoryError> {
        if let Some(delay) = self.lookup_delay {
            tokio::time::sleep(delay).await;
        }
        if self.unavailable {
            return Err(store_down());
        }
        if self.malformed.contains(siret) {
            return Err(malformed(siret));
        }
        Ok(self.records.iter().find(|e| &e.siret == siret).cloned())
    }

    async fn find_by_criteria(
        &self,
        filter: &EtablissementFilter,
    ) -> Result<EtablissementStream, RepositoryError> {
        if self.unavailable {
            return Err(store_down());
        }
        let matching: Vec<_> = self
            .records
            .iter()
            .filter(|e| filter.matches(e))
            .cloned()
            .map(Ok)
            .collect();
        Ok(stream::iter(matching).boxed())
    }

    async fn list_all(
        &self,
        request: &PageRequest,
    ) -> Result<Page<Etablissement>, RepositoryError> {
        if self.unavailable {
            return Err(store_down());
        }
        let items = self
            .records
            .iter()
            .skip(request.offset() as usize)
            .take(request.size() as usize)
            .cloned()
            .collect();
        Ok(Page::counted(items, request, self.records.len() as u64))
    }
}

pub struct InMemoryDataSource {
    repository: Arc<InMemoryEtablissementRepository>,
}

#[async_trait]
impl DataSource for InMemoryDataSource {
    fn etablissements(&self) -> Arc<dyn EtablissementRepository> {
        self.repository.clone()
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        if self.repository.unavailable {
            return Err(store_down());
        }
        Ok(())
    }
}

pub fn state_with(repository: InMemoryEtablissementRepository) -> FeatureState {
    FeatureState::new(InMemoryDataSource {
        repository: Arc::new(repository),
    })
}

pub fn state_of(records: Vec<Etablissement>) -> FeatureState {
    state_with(InMemoryEtablissementRepository::new(records))
}
