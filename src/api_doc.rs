use utoipa::OpenApi;

use crate::error::{ErrorResponse, HealthResponse, UnhealthyResponse};
use crate::handlers;
use crate::models::{CoordinateRecord, Label, LabelQuery, MessageResponse};

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    info(
        title = "coordinate-service API",
        version = "0.1.0",
        description = "Latest known 3D positions of labelled objects, backed by Redis or InfluxDB"
    ),
    paths(
        handlers::health::health_handler,
        handlers::write::write_handler,
        handlers::get::get_handler,
        handlers::query::query_handler
    ),
    components(
        schemas(
            Label,
            CoordinateRecord,
            LabelQuery,
            MessageResponse,
            ErrorResponse,
            HealthResponse,
            UnhealthyResponse
        )
    ),
    tags(
        (name = "health", description = "Health check operations"),
        (name = "coordinates", description = "Coordinate write and lookup operations")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::test_support::*;
    use axum::http::StatusCode;

    #[test]
    fn test_openapi_lists_every_route() {
        let doc = ApiDoc::openapi();
        for path in [crate::routes::HEALTH, crate::routes::WRITE, crate::routes::GET, crate::routes::QUERY] {
            assert!(doc.paths.paths.contains_key(path), "missing path {}", path);
        }
    }

    #[tokio::test]
    async fn test_openapi_json_is_served() {
        let (app, _store) = setup_test_app();

        let response = send(&app, get_request(crate::routes::OPENAPI_JSON)).await;

        assert_eq!(response.status(), StatusCode::OK);
        let doc: serde_json::Value = read_json(response).await;
        assert_eq!(doc["info"]["title"], "coordinate-service API");
    }
}
