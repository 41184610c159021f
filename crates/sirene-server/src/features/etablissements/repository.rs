//! Establishment data access
//!
//! [`EtablissementRepository`] is the seam between the service and the store.
//! The MongoDB implementation decodes raw documents itself so that decoding
//! failures can be told apart from driver failures:
//!
//! - in single lookups a malformed document is an error
//! - in pages and streams it is logged and skipped

use async_trait::async_trait;
use futures::{stream::BoxStream, StreamExt, TryStreamExt};
use mongodb::{
    bson::{self, doc, Document},
    error::ErrorKind,
};
use sirene_common::types::Siret;
use thiserror::Error;

use super::{filter::EtablissementFilter, model::Etablissement};
use crate::{
    db::StoreHandle,
    features::shared::pagination::{Page, PageRequest, PaginationMetadata},
};

/// Lazy sequence of establishments, in `siret` order
pub type EtablissementStream = BoxStream<'static, Result<Etablissement, RepositoryError>>;

#[derive(Error, Debug)]
pub enum RepositoryError {
    /// The store could not be reached or the connection dropped mid-query
    #[error("Document store unavailable: {0}")]
    StoreUnavailable(#[source] mongodb::error::Error),

    /// The store was reached but rejected or could not encode the query
    #[error("Document store query failed: {0}")]
    Query(#[source] mongodb::error::Error),

    /// A stored document does not map onto [`Etablissement`]
    #[error("Malformed document {context}: {source}")]
    MalformedDocument {
        context: String,
        #[source]
        source: bson::de::Error,
    },
}

impl From<mongodb::error::Error> for RepositoryError {
    fn from(err: mongodb::error::Error) -> Self {
        let transport = matches!(
            *err.kind,
            ErrorKind::ServerSelection { .. }
                | ErrorKind::Io(_)
                | ErrorKind::ConnectionPoolCleared { .. }
                | ErrorKind::DnsResolve { .. }
        );
        if transport {
            Self::StoreUnavailable(err)
        } else {
            Self::Query(err)
        }
    }
}

#[async_trait]
pub trait EtablissementRepository: Send + Sync {
    /// Single establishment by SIRET; `None` when absent
    async fn find_by_id(&self, siret: &Siret) -> Result<Option<Etablissement>, RepositoryError>;

    /// Every establishment matching the criteria, streamed from the store
    ///
    /// Calling again restarts the sequence from the beginning.
    async fn find_by_criteria(
        &self,
        filter: &EtablissementFilter,
    ) -> Result<EtablissementStream, RepositoryError>;

    /// One uncounted page of the establishments matching the criteria
    ///
    /// The default cuts the page out of [`find_by_criteria`]; store-backed
    /// implementations push the window down to the query.
    ///
    /// [`find_by_criteria`]: EtablissementRepository::find_by_criteria
    async fn search_page(
        &self,
        filter: &EtablissementFilter,
        request: &PageRequest,
    ) -> Result<Page<Etablissement>, RepositoryError> {
        Page::from_stream(self.find_by_criteria(filter).await?, request).await
    }

    /// One counted page of the whole collection
    async fn list_all(&self, request: &PageRequest)
        -> Result<Page<Etablissement>, RepositoryError>;
}

/// MongoDB-backed repository; cheap to build per request
#[derive(Clone, Debug)]
pub struct MongoEtablissementRepository {
    store: StoreHandle,
}

impl MongoEtablissementRepository {
    pub fn new(store: StoreHandle) -> Self {
        Self { store }
    }
}

fn sort_order() -> Document {
    doc! { "siret": 1 }
}

/// Decode a raw document, naming it by SIRET (or `_id`) on failure
fn decode(document: Document) -> Result<Etablissement, RepositoryError> {
    let context = match (document.get_str("siret"), document.get("_id")) {
        (Ok(siret), _) => format!("siret={}", siret),
        (Err(_), Some(id)) => format!("_id={}", id),
        (Err(_), None) => "without identifier".to_string(),
    };

    bson::from_document(document)
        .map_err(|source| RepositoryError::MalformedDocument { context, source })
}

/// Decode for list contexts: malformed documents are dropped with a warning
fn decode_or_skip(document: Document) -> Option<Etablissement> {
    match decode(document) {
        Ok(etablissement) => Some(etablissement),
        Err(e) => {
            tracing::warn!(error = %e, "Skipping malformed establishment document");
            None
        },
    }
}

#[async_trait]
impl EtablissementRepository for MongoEtablissementRepository {
    #[tracing::instrument(skip(self, siret), fields(siret = %siret))]
    async fn find_by_id(&self, siret: &Siret) -> Result<Option<Etablissement>, RepositoryError> {
        let document = self
            .store
            .etablissements()
            .find_one(doc! { "siret": siret.as_str() })
            .await?;

        document.map(decode).transpose()
    }

    #[tracing::instrument(skip(self, filter))]
    async fn find_by_criteria(
        &self,
        filter: &EtablissementFilter,
    ) -> Result<EtablissementStream, RepositoryError> {
        let query = filter.to_document();
        tracing::debug!(query = %query, "Searching establishments");

        let cursor = self
            .store
            .etablissements()
            .find(query)
            .sort(sort_order())
            .await?;

        let stream = cursor
            .map_err(RepositoryError::from)
            .try_filter_map(|document| futures::future::ready(Ok(decode_or_skip(document))));

        Ok(stream.boxed())
    }

    #[tracing::instrument(skip(self, filter, request), fields(page = request.page(), size = request.size()))]
    async fn search_page(
        &self,
        filter: &EtablissementFilter,
        request: &PageRequest,
    ) -> Result<Page<Etablissement>, RepositoryError> {
        let query = filter.to_document();
        tracing::debug!(query = %query, "Searching establishments");

        // One extra document decides has_next
        let limit = i64::try_from(request.size() + 1).unwrap_or(i64::MAX);
        let documents: Vec<Document> = self
            .store
            .etablissements()
            .find(query)
            .sort(sort_order())
            .skip(request.offset())
            .limit(limit)
            .await?
            .try_collect()
            .await?;

        let has_next = documents.len() as u64 > request.size();
        let items: Vec<Etablissement> = documents
            .into_iter()
            .take(request.size() as usize)
            .filter_map(decode_or_skip)
            .collect();

        Ok(Page {
            items,
            pagination: PaginationMetadata::windowed(request, has_next),
        })
    }

    #[tracing::instrument(skip(self, request), fields(page = request.page(), size = request.size()))]
    async fn list_all(
        &self,
        request: &PageRequest,
    ) -> Result<Page<Etablissement>, RepositoryError> {
        let collection = self.store.etablissements();

        let total = collection.estimated_document_count().await?;

        let limit = i64::try_from(request.size()).unwrap_or(i64::MAX);
        let documents: Vec<Document> = collection
            .find(doc! {})
            .sort(sort_order())
            .skip(request.offset())
            .limit(limit)
            .await?
            .try_collect()
            .await?;

        let items: Vec<Etablissement> = documents.into_iter().filter_map(decode_or_skip).collect();

        tracing::debug!(count = items.len(), total, "Listed establishments");

        Ok(Page::counted(items, request, total))
    }
}
