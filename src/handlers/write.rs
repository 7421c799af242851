use crate::error::{ApiError, ErrorResponse};
use crate::extract::ValidJson;
use crate::models::{CoordinateRecord, MessageResponse};
use crate::routes;
use crate::state::AppState;
use axum::{extract::State, http::StatusCode, Json};

pub const WRITE_SUCCESS_MESSAGE: &str = "Coordinate recorded successfully.";

/// POST /write handler - Record the latest coordinate of a label
///
/// The body is validated before the store is touched: an unknown label or a
/// missing or non-numeric coordinate is answered with 400.
#[utoipa::path(
    post,
    path = routes::WRITE,
    request_body = CoordinateRecord,
    responses(
        (status = 201, description = "Coordinate recorded", body = MessageResponse),
        (status = 400, description = "Invalid body or unknown label", body = ErrorResponse),
        (status = 500, description = "Store error", body = MessageResponse)
    ),
    tag = "coordinates"
)]
pub async fn write_handler(
    State(state): State<AppState>,
    ValidJson(record): ValidJson<CoordinateRecord>,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    state.store.write(&record).await?;

    tracing::info!(
        "Recorded coordinate for {}: ({}, {}, {})",
        record.label,
        record.x,
        record.y,
        record.z
    );
    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::new(WRITE_SUCCESS_MESSAGE)),
    ))
}
