use crate::error::{ApiError, ErrorResponse};
use crate::extract::ValidJson;
use crate::handlers::get::fetch_latest;
use crate::models::{CoordinateRecord, LabelQuery, MessageResponse};
use crate::routes;
use crate::state::AppState;
use axum::{extract::State, http::StatusCode, Json};

/// POST /query handler - Retrieve the latest coordinate, label in a JSON body
#[utoipa::path(
    post,
    path = routes::QUERY,
    request_body = LabelQuery,
    responses(
        (status = 200, description = "Latest coordinate", body = CoordinateRecord),
        (status = 400, description = "Invalid body or unknown label", body = ErrorResponse),
        (status = 404, description = "No data for the label", body = MessageResponse),
        (status = 500, description = "Store error", body = MessageResponse)
    ),
    tag = "coordinates"
)]
pub async fn query_handler(
    State(state): State<AppState>,
    ValidJson(query): ValidJson<LabelQuery>,
) -> Result<(StatusCode, Json<CoordinateRecord>), ApiError> {
    fetch_latest(&state, query.label).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::test_support::*;
    use crate::models::Label;

    #[tokio::test]
    async fn test_query_endpoint_success() {
        let (app, _store) = setup_test_app();

        let write_response = send(
            &app,
            json_request("POST", "/write", r#"{"label":"WINDOW_FRAME","x":4,"y":5,"z":6}"#),
        )
        .await;
        assert_eq!(write_response.status(), StatusCode::CREATED);

        let response = send(&app, json_request("POST", "/query", r#"{"label":"WINDOW_FRAME"}"#)).await;

        assert_eq!(response.status(), StatusCode::OK);
        let record: CoordinateRecord = read_json(response).await;
        assert_eq!(
            record,
            CoordinateRecord { label: Label::WindowFrame, x: 4.0, y: 5.0, z: 6.0 }
        );
    }

    #[tokio::test]
    async fn test_query_endpoint_not_found() {
        let (app, _store) = setup_test_app();

        let response = send(&app, json_request("POST", "/query", r#"{"label":"GLOBAL_MESH"}"#)).await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body: MessageResponse = read_json(response).await;
        assert_eq!(body.message, crate::error::NOT_FOUND_MESSAGE);
    }

    #[tokio::test]
    async fn test_query_endpoint_invalid_body() {
        let (app, _store) = setup_test_app();

        let response = send(&app, json_request("POST", "/query", r#"{"name":"COUCH"}"#)).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: ErrorResponse = read_json(response).await;
        assert!(body.error.contains("label"));
    }
}
