//! Establishment service
//!
//! Handlers talk to the service, never to the repository. A fresh service is
//! built for every request from the shared [`FeatureState`].

use std::{convert::Infallible, sync::Arc};

use axum::{extract::FromRequestParts, http::request::Parts};
use sirene_common::types::Siret;

use super::{
    filter::EtablissementFilter,
    model::Etablissement,
    repository::{EtablissementRepository, EtablissementStream, RepositoryError},
};
use crate::features::{
    shared::pagination::{Page, PageRequest},
    FeatureState,
};

#[derive(Clone)]
pub struct EtablissementService {
    repository: Arc<dyn EtablissementRepository>,
}

impl EtablissementService {
    pub fn new(repository: Arc<dyn EtablissementRepository>) -> Self {
        Self { repository }
    }

    pub async fn get(&self, siret: &Siret) -> Result<Option<Etablissement>, RepositoryError> {
        self.repository.find_by_id(siret).await
    }

    pub async fn search(
        &self,
        filter: &EtablissementFilter,
    ) -> Result<EtablissementStream, RepositoryError> {
        self.repository.find_by_criteria(filter).await
    }

    /// One page of matching establishments, without a total
    pub async fn search_page(
        &self,
        filter: &EtablissementFilter,
        request: &PageRequest,
    ) -> Result<Page<Etablissement>, RepositoryError> {
        self.repository.search_page(filter, request).await
    }

    pub async fn list(&self, request: &PageRequest) -> Result<Page<Etablissement>, RepositoryError> {
        self.repository.list_all(request).await
    }
}

#[axum::async_trait]
impl FromRequestParts<FeatureState> for EtablissementService {
    type Rejection = Infallible;

    async fn from_request_parts(
        _parts: &mut Parts,
        state: &FeatureState,
    ) -> Result<Self, Self::Rejection> {
        Ok(Self::new(state.data.etablissements()))
    }
}
