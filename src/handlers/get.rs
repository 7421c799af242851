use crate::error::{ApiError, ErrorResponse};
use crate::extract::ValidQuery;
use crate::models::{CoordinateRecord, LabelQuery, Label, MessageResponse};
use crate::routes;
use crate::state::AppState;
use axum::{extract::State, http::StatusCode, Json};

/// GET /get?label= handler - Retrieve the latest coordinate of a label
#[utoipa::path(
    get,
    path = routes::GET,
    params(
        ("label" = Label, Query, description = "Semantic label to look up")
    ),
    responses(
        (status = 200, description = "Latest coordinate", body = CoordinateRecord),
        (status = 400, description = "Missing or unknown label", body = ErrorResponse),
        (status = 404, description = "No data for the label", body = MessageResponse),
        (status = 500, description = "Store error", body = MessageResponse)
    ),
    tag = "coordinates"
)]
pub async fn get_handler(
    State(state): State<AppState>,
    ValidQuery(query): ValidQuery<LabelQuery>,
) -> Result<(StatusCode, Json<CoordinateRecord>), ApiError> {
    fetch_latest(&state, query.label).await
}

/// Shared lookup behind both read routes
pub(crate) async fn fetch_latest(
    state: &AppState,
    label: Label,
) -> Result<(StatusCode, Json<CoordinateRecord>), ApiError> {
    match state.store.latest(label).await? {
        Some(record) => {
            tracing::info!("Retrieved coordinate for label: {}", label);
            Ok((StatusCode::OK, Json(record)))
        }
        None => Err(ApiError::NotFound(label)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::test_support::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_get_endpoint_success() {
        let (app, _store) = setup_test_app();

        let write_response = send(
            &app,
            json_request("POST", "/write", r#"{"label":"COUCH","x":1,"y":2,"z":3}"#),
        )
        .await;
        assert_eq!(write_response.status(), StatusCode::CREATED);

        let response = send(&app, get_request("/get?label=COUCH")).await;

        assert_eq!(response.status(), StatusCode::OK);
        let record: CoordinateRecord = read_json(response).await;
        assert_eq!(record, CoordinateRecord { label: Label::Couch, x: 1.0, y: 2.0, z: 3.0 });
    }

    #[tokio::test]
    async fn test_get_endpoint_not_found() {
        let (app, _store) = setup_test_app();

        let response = send(&app, get_request("/get?label=LAMP")).await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body: MessageResponse = read_json(response).await;
        assert_eq!(body.message, crate::error::NOT_FOUND_MESSAGE);
    }

    #[tokio::test]
    async fn test_get_endpoint_second_write_wins() {
        let (app, _store) = setup_test_app();

        for body in [
            r#"{"label":"TABLE","x":1,"y":1,"z":1}"#,
            r#"{"label":"TABLE","x":-7.5,"y":0.25,"z":100}"#,
        ] {
            let response = send(&app, json_request("POST", "/write", body)).await;
            assert_eq!(response.status(), StatusCode::CREATED);
        }

        let response = send(&app, get_request("/get?label=TABLE")).await;
        assert_eq!(response.status(), StatusCode::OK);
        let record: CoordinateRecord = read_json(response).await;
        assert_eq!((record.x, record.y, record.z), (-7.5, 0.25, 100.0));
    }

    #[tokio::test]
    async fn test_get_endpoint_round_trips_every_label() {
        let (app, _store) = setup_test_app();

        for (i, label) in Label::ALL.into_iter().enumerate() {
            let written = CoordinateRecord {
                label,
                x: i as f64 + 0.5,
                y: -(i as f64),
                z: 1e6 * i as f64,
            };
            let body = serde_json::to_string(&written).unwrap();
            let response = send(&app, json_request("POST", "/write", &body)).await;
            assert_eq!(response.status(), StatusCode::CREATED);

            let response = send(&app, get_request(&format!("/get?label={}", label))).await;
            assert_eq!(response.status(), StatusCode::OK);
            let read: CoordinateRecord = read_json(response).await;
            assert_eq!(read, written);
        }
    }

    #[tokio::test]
    async fn test_get_endpoint_unknown_label() {
        let (app, _store) = setup_test_app();

        let response = send(&app, get_request("/get?label=SOFA")).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: ErrorResponse = read_json(response).await;
        assert!(body.error.contains("Invalid request"));
    }

    #[tokio::test]
    async fn test_get_endpoint_missing_label() {
        let (app, _store) = setup_test_app();

        let response = send(&app, get_request("/get")).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_get_endpoint_store_failure() {
        let app = app_with_store(Arc::new(FailingStore));

        let response = send(&app, get_request("/get?label=COUCH")).await;

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body: MessageResponse = read_json(response).await;
        assert_eq!(body.message, crate::error::STORE_ERROR_MESSAGE);
    }
}
