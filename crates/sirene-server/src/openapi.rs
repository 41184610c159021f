//! # OpenAPI Specification Assembly
//!
//! Assembles the utoipa-documented routes into one OpenAPI document, served
//! at `/swagger/v1/swagger.json` and rendered by Swagger UI at `/swagger-ui`.
//! The site root redirects to the UI.

use axum::{response::Redirect, routing::get, Router};
use utoipa::OpenApi;
use utoipa_swagger_ui::{Config as SwaggerConfig, SwaggerUi};

/// Path of the generated document
pub const OPENAPI_JSON_PATH: &str = "/swagger/v1/swagger.json";

/// Mount point of the interactive documentation
pub const SWAGGER_UI_PATH: &str = "/swagger-ui";

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Sirene - V3",
        version = "1.0.0",
        description = "Read-only access to the Sirene register of French businesses.\n\nEstablishments (identified by a 14-digit SIRET) can be fetched individually, listed page by page, or searched by legal unit (SIREN), name, postal code, commune, main activity, administrative state and head-office flag."
    ),
    paths(
        crate::features::etablissements::routes::get_etablissement,
        crate::features::etablissements::routes::list_etablissements,
        crate::features::etablissements::routes::list_by_siren,
    ),
    components(
        schemas(
            crate::features::etablissements::model::Etablissement,
            crate::features::etablissements::model::UniteLegale,
            crate::features::etablissements::model::AdresseEtablissement,
            crate::features::etablissements::model::PeriodeEtablissement,
            crate::features::etablissements::model::EtatAdministratif,
            crate::features::shared::pagination::PaginationMetadata,
            crate::api::response::ResponseMeta,
            crate::api::response::ErrorResponse,
            crate::api::response::ErrorDetail,
        )
    ),
    tags(
        (name = "etablissements", description = "Establishments of the Sirene register"),
    )
)]
pub struct ApiDoc;

/// Build the documentation router.
pub fn router<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    let ui_config = SwaggerConfig::from(OPENAPI_JSON_PATH)
        .deep_linking(true)
        .display_request_duration(true)
        .filter(true)
        .show_extensions(true)
        .doc_expansion("list")
        .default_models_expand_depth(-1)
        .supported_submit_methods(["get"]);

    Router::new()
        .route("/", get(|| async { Redirect::temporary("/swagger-ui/") }))
        .merge(
            SwaggerUi::new(SWAGGER_UI_PATH)
                .url(OPENAPI_JSON_PATH, ApiDoc::openapi())
                .config(ui_config),
        )
}
