//! Server-specific error types
//!
//! [`AppError`] is the single place where failures become HTTP responses.

use axum::{
    extract::rejection::{PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use sirene_common::types::IdentifierError;
use thiserror::Error;

use crate::{
    api::response::ErrorResponse,
    features::{
        etablissements::repository::RepositoryError, shared::pagination::PaginationError,
    },
};

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Repository(RepositoryError::StoreUnavailable(_)) => {
                StatusCode::SERVICE_UNAVAILABLE
            },
            AppError::Repository(
                RepositoryError::Query(_) | RepositoryError::MalformedDocument { .. },
            ) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let error = match self {
            AppError::NotFound(message) => ErrorResponse::new("NOT_FOUND", message),
            AppError::BadRequest(message) => ErrorResponse::new("BAD_REQUEST", message),
            AppError::Repository(ref e @ RepositoryError::StoreUnavailable(_)) => {
                tracing::error!(error = ?e, "Document store unavailable");
                ErrorResponse::new("SERVICE_UNAVAILABLE", "The data store is unavailable")
            },
            AppError::Repository(ref e @ RepositoryError::Query(_)) => {
                tracing::error!(error = ?e, "Document store query failed");
                ErrorResponse::new("INTERNAL_ERROR", "The query could not be completed")
            },
            AppError::Repository(ref e @ RepositoryError::MalformedDocument { .. }) => {
                tracing::error!(error = %e, "Stored establishment could not be decoded");
                ErrorResponse::new("INTERNAL_ERROR", "A stored record could not be read")
            },
        };

        (status, Json(error)).into_response()
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<IdentifierError> for AppError {
    fn from(err: IdentifierError) -> Self {
        AppError::BadRequest(err.to_string())
    }
}

impl From<PaginationError> for AppError {
    fn from(err: PaginationError) -> Self {
        AppError::BadRequest(err.to_string())
    }
}
