//! Router assembly and server lifecycle

use std::{net::SocketAddr, time::Duration};

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::json;
use tokio::signal;
use tower_http::{
    catch_panic::CatchPanicLayer, compression::CompressionLayer, timeout::TimeoutLayer,
};
use tracing::info;

use crate::{
    api::response::ErrorResponse,
    config::Config,
    features::{self, FeatureState},
    middleware, openapi,
};

/// Create the application router with all routes and middleware
pub fn build_router(state: FeatureState, config: &Config) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/health/ready", get(readiness_check))
        .nest("/api/v1", features::router())
        .with_state(state)
        .merge(openapi::router())
        // Apply layers from innermost to outermost
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            config.server.request_timeout(),
        ))
        .layer(middleware::tracing_layer())
        .layer(middleware::cors_layer(&config.cors))
        .layer(CatchPanicLayer::custom(middleware::panic_response))
}

/// Bind and serve until Ctrl+C or SIGTERM
pub async fn serve(app: Router, config: &Config) -> anyhow::Result<()> {
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(config.server.shutdown_timeout_secs))
        .await?;

    info!("Server shut down gracefully");

    Ok(())
}

/// Liveness probe
async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}

/// Readiness probe; pings the store
async fn readiness_check(State(state): State<FeatureState>) -> Response {
    match state.data.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "status": "ready",
                "database": "connected"
            })),
        )
            .into_response(),
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed");
            let error = ErrorResponse::new("SERVICE_UNAVAILABLE", "The data store is unavailable");
            (StatusCode::SERVICE_UNAVAILABLE, Json(error)).into_response()
        },
    }
}

/// Graceful shutdown signal handler
async fn shutdown_signal(timeout_secs: u64) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            },
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
            },
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, starting graceful shutdown");
        },
        _ = terminate => {
            info!("Received terminate signal, starting graceful shutdown");
        },
    }

    info!("Waiting up to {} seconds for connections to close", timeout_secs);
    tokio::time::sleep(Duration::from_secs(timeout_secs.min(5))).await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::{
            CorsConfig, MongoConfig, ServerConfig, DEFAULT_CORS_ALLOWED_ORIGIN,
            DEFAULT_REQUEST_TIMEOUT_SECS,
        },
        features::shared::test_helpers::{
            etablissement, etablissements_of, state_of, state_with,
            InMemoryEtablissementRepository,
        },
    };
    use axum::{
        body::Body,
        http::{header, Request},
    };
    use serde_json::Value;
    use tower::ServiceExt;

    fn test_config() -> Config {
        Config {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
                shutdown_timeout_secs: 1,
                request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            },
            mongodb: MongoConfig::new("mongodb://localhost:27017", "sirene"),
            cors: CorsConfig {
                allowed_origin: DEFAULT_CORS_ALLOWED_ORIGIN.to_string(),
            },
        }
    }

    fn app(state: FeatureState) -> Router {
        build_router(state, &test_config())
    }

    async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    #[tokio::test]
    async fn test_get_existing_etablissement() {
        let state = state_of(vec![etablissement("55208131766522")]);

        let (status, body) = get(app(state), "/api/v1/etablissements/55208131766522").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["siret"], "55208131766522");
        assert_eq!(body["data"]["siren"], "552081317");
    }

    #[tokio::test]
    async fn test_get_absent_etablissement_is_not_found() {
        let state = state_of(vec![etablissement("55208131766522")]);

        let (status, body) = get(app(state), "/api/v1/etablissements/99999999999999").await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["success"], false);
        assert_eq!(body["error"]["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_get_invalid_siret_is_bad_request() {
        for uri in [
            "/api/v1/etablissements/123",
            "/api/v1/etablissements/5520813176652A",
        ] {
            let (status, body) = get(app(state_of(vec![])), uri).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{}", uri);
            assert_eq!(body["error"]["code"], "BAD_REQUEST");
        }
    }

    #[tokio::test]
    async fn test_get_malformed_document_is_internal_error() {
        let repository = InMemoryEtablissementRepository::new(vec![])
            .with_malformed("55208131766522");

        let (status, body) = get(
            app(state_with(repository)),
            "/api/v1/etablissements/55208131766522",
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"]["code"], "INTERNAL_ERROR");
    }

    #[tokio::test]
    async fn test_list_first_page() {
        let state = state_of(etablissements_of("552081317", 25));

        let (status, body) = get(app(state), "/api/v1/etablissements?page=1&size=10").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"].as_array().unwrap().len(), 10);
        assert_eq!(body["data"][0]["siret"], "55208131700001");
        let pagination = &body["meta"]["pagination"];
        assert_eq!(pagination["total"], 25);
        assert_eq!(pagination["pages"], 3);
        assert_eq!(pagination["has_next"], true);
        assert_eq!(pagination["has_prev"], false);
    }

    #[tokio::test]
    async fn test_list_defaults() {
        let state = state_of(etablissements_of("552081317", 25));

        let (status, body) = get(app(state), "/api/v1/etablissements").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"].as_array().unwrap().len(), 20);
        assert_eq!(body["meta"]["pagination"]["size"], 20);
    }

    #[tokio::test]
    async fn test_page_beyond_store_range_is_bad_request() {
        let state = state_of(etablissements_of("552081317", 3));

        for uri in [
            "/api/v1/etablissements?page=18446744073709551615",
            "/api/v1/etablissements?page=184467440737095516&size=100",
            "/api/v1/etablissements?siege=false&page=18446744073709551615",
            "/api/v1/etablissements/siren/552081317?page=18446744073709551615",
        ] {
            let (status, body) = get(app(state.clone()), uri).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{}", uri);
            assert_eq!(body["error"]["code"], "BAD_REQUEST");
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_lookup_times_out() {
        let repository = InMemoryEtablissementRepository::new(vec![etablissement("55208131766522")])
            .with_lookup_delay(Duration::from_secs(5));
        let mut config = test_config();
        config.server.request_timeout_secs = 1;
        let app = build_router(state_with(repository), &config);

        let (status, _) = get(app, "/api/v1/etablissements/55208131766522").await;

        assert_eq!(status, StatusCode::REQUEST_TIMEOUT);
    }

    #[tokio::test(start_paused = true)]
    async fn test_lookup_within_deadline_succeeds() {
        let repository = InMemoryEtablissementRepository::new(vec![etablissement("55208131766522")])
            .with_lookup_delay(Duration::from_millis(500));
        let mut config = test_config();
        config.server.request_timeout_secs = 1;
        let app = build_router(state_with(repository), &config);

        let (status, body) = get(app, "/api/v1/etablissements/55208131766522").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["siret"], "55208131766522");
    }

    #[tokio::test]
    async fn test_list_rejects_bad_pagination() {
        for uri in [
            "/api/v1/etablissements?page=0",
            "/api/v1/etablissements?size=0",
            "/api/v1/etablissements?size=101",
            "/api/v1/etablissements?page=abc",
            "/api/v1/etablissements?page=-1",
        ] {
            let (status, body) = get(app(state_of(vec![])), uri).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{}", uri);
            assert_eq!(body["success"], false);
        }
    }

    #[tokio::test]
    async fn test_search_by_criteria() {
        let mut records = etablissements_of("552081317", 3);
        records[1].etablissement_siege = true;
        records.extend(etablissements_of("443061841", 2));

        let (status, body) = get(
            app(state_of(records)),
            "/api/v1/etablissements?siren=552081317&siege=true",
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        let data = body["data"].as_array().unwrap();
        assert_eq!(data.len(), 1);
        assert_eq!(data[0]["siret"], "55208131700002");
        assert!(body["meta"]["pagination"].get("total").is_none());
    }

    #[tokio::test]
    async fn test_search_windows_results() {
        let state = state_of(etablissements_of("552081317", 25));

        let (status, body) = get(
            app(state),
            "/api/v1/etablissements?denomination=societe&page=3&size=10",
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"].as_array().unwrap().len(), 5);
        assert_eq!(body["meta"]["pagination"]["has_next"], false);
        assert_eq!(body["meta"]["pagination"]["has_prev"], true);
    }

    #[tokio::test]
    async fn test_search_rejects_unknown_state() {
        let (status, _) = get(
            app(state_of(vec![])),
            "/api/v1/etablissements?etat_administratif=X",
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_list_by_siren() {
        let mut records = etablissements_of("552081317", 12);
        records.extend(etablissements_of("443061841", 4));

        let (status, body) = get(
            app(state_of(records)),
            "/api/v1/etablissements/siren/552081317?size=10",
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        let data = body["data"].as_array().unwrap();
        assert_eq!(data.len(), 10);
        assert!(data.iter().all(|e| e["siren"] == "552081317"));
        assert_eq!(body["meta"]["pagination"]["has_next"], true);
    }

    #[tokio::test]
    async fn test_list_by_invalid_siren() {
        let (status, _) = get(app(state_of(vec![])), "/api/v1/etablissements/siren/12345").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_store_unavailable_is_service_unavailable() {
        for uri in [
            "/api/v1/etablissements/55208131766522",
            "/api/v1/etablissements",
            "/api/v1/etablissements?commune=paris",
        ] {
            let state = state_with(InMemoryEtablissementRepository::unavailable());
            let (status, body) = get(app(state), uri).await;
            assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE, "{}", uri);
            assert_eq!(body["error"]["code"], "SERVICE_UNAVAILABLE");
        }
    }

    #[tokio::test]
    async fn test_cors_allows_configured_origin() {
        let response = app(state_of(vec![]))
            .oneshot(
                Request::builder()
                    .uri("/api/v1/etablissements")
                    .header(header::ORIGIN, DEFAULT_CORS_ALLOWED_ORIGIN)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(
            response
                .headers()
                .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
                .unwrap(),
            DEFAULT_CORS_ALLOWED_ORIGIN
        );
    }

    #[tokio::test]
    async fn test_cors_ignores_other_origins() {
        let response = app(state_of(vec![]))
            .oneshot(
                Request::builder()
                    .method("OPTIONS")
                    .uri("/api/v1/etablissements")
                    .header(header::ORIGIN, "http://evil.example")
                    .header(header::ACCESS_CONTROL_REQUEST_METHOD, "GET")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert!(response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .is_none());
    }

    #[tokio::test]
    async fn test_root_redirects_to_docs() {
        let response = app(state_of(vec![]))
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert!(response.status().is_redirection());
        assert_eq!(response.headers().get(header::LOCATION).unwrap(), "/swagger-ui/");
    }

    #[tokio::test]
    async fn test_openapi_document_is_served() {
        let (status, body) = get(app(state_of(vec![])), "/swagger/v1/swagger.json").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["info"]["title"], "Sirene - V3");
        assert!(body["paths"]["/api/v1/etablissements/{siret}"].is_object());
    }

    #[tokio::test]
    async fn test_health_probes() {
        let (status, _) = get(app(state_of(vec![])), "/health").await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = get(app(state_of(vec![])), "/health/ready").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ready");

        let unavailable = state_with(InMemoryEtablissementRepository::unavailable());
        let (status, _) = get(app(unavailable), "/health/ready").await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_unknown_route_is_not_found() {
        let (status, _) = get(app(state_of(vec![])), "/api/v2/etablissements").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
