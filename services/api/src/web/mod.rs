pub mod protocol;
pub mod rest;
pub mod session;
pub mod state;
pub mod ws_handler;

// Re-export the main WebSocket handler to make it easily accessible
// to the binary that will build the web server router.
pub use ws_handler::ws_handler;

use axum::{
    http::{header::{ACCEPT, CONTENT_TYPE}, HeaderValue, Method},
    routing::{get, post},
    Router,
};
use rest::ApiDoc;
use state::AppState;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::error::ApiError;

/// Builds the complete application: REST routes, the wizard socket and the
/// Swagger UI.
pub fn build_router(app_state: Arc<AppState>) -> Result<Router, ApiError> {
    let origin = app_state
        .config
        .cors_origin
        .parse::<HeaderValue>()
        .map_err(|e| ApiError::Internal(format!("Invalid CORS origin: {}", e)))?;
    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE, ACCEPT]);

    let api_router = Router::new()
        .route("/health", get(rest::health_handler))
        .route("/catalog/origins", get(rest::origin_countries_handler))
        .route("/catalog/destinations", get(rest::destination_countries_handler))
        .route(
            "/catalog/routes/{origin}/{destination}",
            get(rest::route_support_handler),
        )
        .route(
            "/catalog/visa-types/{origin}/{destination}",
            get(rest::visa_types_handler),
        )
        .route("/catalog/visa-type/{id}", get(rest::visa_type_handler))
        .route(
            "/catalog/visa-type/{id}/requirements",
            post(rest::visa_type_requirements_handler),
        )
        .route(
            "/catalog/visa-type/{id}/checklist",
            post(rest::visa_type_checklist_handler),
        )
        .route("/catalog/traveler-types", get(rest::traveler_types_handler))
        .route("/catalog/steps", get(rest::timeline_steps_handler))
        .route("/catalog/guide", get(rest::guide_handler))
        .route("/timeline", post(rest::derive_timeline_handler))
        .route("/progress", post(rest::save_progress_handler))
        .route("/progress/{email}", get(rest::load_progress_handler))
        .route("/ws", get(ws_handler))
        .layer(cors)
        .with_state(app_state);

    // Merge the API router with the Swagger UI router for a complete application.
    Ok(Router::new()
        .merge(api_router)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi())))
}
