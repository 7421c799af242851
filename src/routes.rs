use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api_doc::ApiDoc;
use crate::handlers::{get_handler, health_handler, query_handler, write_handler};
use crate::state::AppState;

// Route path constants - single source of truth for all API paths

pub const HEALTH: &str = "/health";
pub const WRITE: &str = "/write";
pub const GET: &str = "/get";
pub const QUERY: &str = "/query";
pub const SWAGGER_UI: &str = "/swagger-ui";
pub const OPENAPI_JSON: &str = "/api-docs/openapi.json";

/// Build the full application router over `state`.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route(HEALTH, get(health_handler))
        .route(WRITE, post(write_handler))
        .route(GET, get(get_handler))
        .route(QUERY, post(query_handler))
        .merge(SwaggerUi::new(SWAGGER_UI).url(OPENAPI_JSON, ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
