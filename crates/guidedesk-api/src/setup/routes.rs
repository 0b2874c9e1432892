//! Route configuration and setup

use crate::constants::{API_PREFIX, MULTIPART_OVERHEAD_BYTES};
use crate::handlers;
use crate::state::AppState;
use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    routing::{get, patch, post, put},
    Json, Router,
};
use guidedesk_core::Config;
use guidedesk_infra::request_id_middleware;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

/// Setup all application routes
pub fn setup_routes(state: Arc<AppState>) -> Result<Router<()>, anyhow::Error> {
    let cors = setup_cors(&state.config)?;
    let body_limit = state.config.max_upload_size_bytes + MULTIPART_OVERHEAD_BYTES;

    let app = public_routes()
        .merge(intake_routes())
        .merge(section_routes())
        .merge(upload_routes())
        .merge(utoipa_rapidoc::RapiDoc::new("/api/openapi.json").path("/api/docs"))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(RequestBodyLimitLayer::new(body_limit))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(axum::middleware::from_fn(request_id_middleware))
        .with_state(state);

    Ok(app)
}

/// Setup CORS configuration
fn setup_cors(config: &Config) -> Result<CorsLayer, anyhow::Error> {
    let methods = [
        Method::GET,
        Method::POST,
        Method::PUT,
        Method::PATCH,
        Method::DELETE,
        Method::OPTIONS,
    ];

    let cors = if config.cors_origins.iter().any(|o| o == "*") {
        tracing::warn!("CORS configured to allow all origins - not recommended for production");
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(methods)
            .allow_headers(Any)
    } else {
        let origins = config
            .cors_origins
            .iter()
            .map(|o| o.parse::<HeaderValue>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| anyhow::anyhow!("Invalid CORS origin: {}", e))?;

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(methods)
            .allow_headers(Any)
    };
    Ok(cors)
}

fn public_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(handlers::health::health_check))
        .route(
            "/api/openapi.json",
            get(|| async { Json(crate::api_doc::get_openapi_spec()) }),
        )
}

fn intake_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            &format!("{}/intakes", API_PREFIX),
            post(handlers::intakes::create_intake).get(handlers::intakes::list_intakes),
        )
        .route(
            &format!("{}/intakes/export.csv", API_PREFIX),
            get(handlers::intakes::export_intakes_csv),
        )
        .route(
            &format!("{}/intakes/stats", API_PREFIX),
            get(handlers::intakes::intake_stats),
        )
        .route(
            &format!("{}/intakes/{{intake_id}}", API_PREFIX),
            get(handlers::intakes::get_intake).delete(handlers::intakes::delete_intake),
        )
        .route(
            &format!("{}/intakes/{{intake_id}}/status", API_PREFIX),
            patch(handlers::intakes::update_status),
        )
        .route(
            &format!(
                "{}/intakes/{{intake_id}}/sections/{{section_code}}/flags",
                API_PREFIX
            ),
            patch(handlers::intakes::update_section_flags),
        )
        .route(
            &format!("{}/intakes/{{intake_id}}/complexity", API_PREFIX),
            patch(handlers::intakes::update_complexity),
        )
}

fn section_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            &format!("{}/intakes/{{intake_id}}/sections", API_PREFIX),
            get(handlers::sections::list_sections).post(handlers::sections::create_section),
        )
        .route(
            &format!("{}/intakes/{{intake_id}}/sections/bulk", API_PREFIX),
            post(handlers::sections::bulk_create_sections),
        )
        .route(
            &format!("{}/intakes/{{intake_id}}/sections/{{section_code}}", API_PREFIX),
            put(handlers::sections::upsert_section)
                .get(handlers::sections::get_section)
                .delete(handlers::sections::delete_section),
        )
}

fn upload_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            &format!("{}/intakes/{{intake_id}}/uploads", API_PREFIX),
            post(handlers::uploads::upload_file).get(handlers::uploads::list_uploads),
        )
        .route(
            &format!("{}/uploads/{{upload_id}}", API_PREFIX),
            get(handlers::uploads::download_upload).delete(handlers::uploads::delete_upload),
        )
}
