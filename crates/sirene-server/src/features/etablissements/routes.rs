//! Establishment API routes
//!
//! # Route Structure
//!
//! - `GET /api/v1/etablissements` - Page through all establishments, or search
//!   when any criterion is given
//! - `GET /api/v1/etablissements/siren/:siren` - Establishments of one legal unit
//! - `GET /api/v1/etablissements/:siret` - Single establishment by SIRET

use axum::{
    extract::{
        rejection::{PathRejection, QueryRejection},
        Path, Query,
    },
    routing::get,
    Router,
};
use sirene_common::types::{Siren, Siret};

use super::{filter::EtablissementFilter, model::Etablissement, service::EtablissementService};
use crate::{
    api::response::{ApiResponse, ErrorResponse},
    error::AppError,
    features::{
        shared::pagination::PageRequest,
        FeatureState,
    },
};

// ============================================================================
// Router Configuration
// ============================================================================

pub fn etablissements_routes() -> Router<FeatureState> {
    Router::new()
        .route("/", get(list_etablissements))
        .route("/siren/:siren", get(list_by_siren))
        .route("/:siret", get(get_etablissement))
}

// ============================================================================
// Query Handlers
// ============================================================================

/// Get a single establishment by SIRET
///
/// # Response
///
/// - `200 OK` - Establishment found
/// - `400 Bad Request` - Not a 14-digit SIRET
/// - `404 Not Found` - No establishment with this SIRET
/// - `503 Service Unavailable` - Store unreachable
#[utoipa::path(
    get,
    path = "/api/v1/etablissements/{siret}",
    tag = "etablissements",
    params(
        ("siret" = String, Path, description = "Establishment identifier (14 digits)", example = "55208131766522")
    ),
    responses(
        (status = 200, description = "Establishment found", body = ApiResponse<Etablissement>),
        (status = 400, description = "Invalid SIRET", body = ErrorResponse),
        (status = 404, description = "Establishment not found", body = ErrorResponse),
        (status = 500, description = "Stored record could not be read", body = ErrorResponse),
        (status = 503, description = "Data store unavailable", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(service, path))]
pub async fn get_etablissement(
    service: EtablissementService,
    path: Result<Path<String>, PathRejection>,
) -> Result<ApiResponse<Etablissement>, AppError> {
    let Path(raw) = path?;
    let siret: Siret = raw.parse()?;

    let etablissement = service
        .get(&siret)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Etablissement {} not found", siret)))?;

    tracing::debug!(siret = %siret, "Establishment retrieved via API");

    Ok(ApiResponse::success(etablissement))
}

/// List or search establishments
///
/// Without criteria the whole collection is paged and counted. With any
/// criterion the matching establishments are streamed and windowed; the
/// total is then omitted.
#[utoipa::path(
    get,
    path = "/api/v1/etablissements",
    tag = "etablissements",
    params(PageRequest, EtablissementFilter),
    responses(
        (status = 200, description = "One page of establishments", body = ApiResponse<Vec<Etablissement>>),
        (status = 400, description = "Invalid query parameters", body = ErrorResponse),
        (status = 503, description = "Data store unavailable", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip_all)]
pub async fn list_etablissements(
    service: EtablissementService,
    pagination: Result<Query<PageRequest>, QueryRejection>,
    filter: Result<Query<EtablissementFilter>, QueryRejection>,
) -> Result<ApiResponse<Vec<Etablissement>>, AppError> {
    let Query(request) = pagination?;
    let Query(filter) = filter?;
    request.validate()?;

    let page = if filter.is_empty() {
        service.list(&request).await?
    } else {
        service.search_page(&filter, &request).await?
    };

    tracing::debug!(
        count = page.items.len(),
        total = ?page.pagination.total,
        has_next = page.pagination.has_next,
        "Establishments listed via API"
    );

    Ok(ApiResponse::page(page))
}

/// List the establishments of a legal unit
#[utoipa::path(
    get,
    path = "/api/v1/etablissements/siren/{siren}",
    tag = "etablissements",
    params(
        ("siren" = String, Path, description = "Legal unit identifier (9 digits)", example = "552081317"),
        PageRequest
    ),
    responses(
        (status = 200, description = "One page of establishments", body = ApiResponse<Vec<Etablissement>>),
        (status = 400, description = "Invalid SIREN or pagination", body = ErrorResponse),
        (status = 503, description = "Data store unavailable", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip_all)]
pub async fn list_by_siren(
    service: EtablissementService,
    path: Result<Path<String>, PathRejection>,
    pagination: Result<Query<PageRequest>, QueryRejection>,
) -> Result<ApiResponse<Vec<Etablissement>>, AppError> {
    let Path(raw) = path?;
    let siren: Siren = raw.parse()?;
    let Query(request) = pagination?;
    request.validate()?;

    let filter = EtablissementFilter {
        siren: Some(siren),
        ..Default::default()
    };
    let page = service.search_page(&filter, &request).await?;

    Ok(ApiResponse::page(page))
}

