/// Live board event stream
///
/// `GET /v1/boards/:board_id/events/stream` holds the connection open and
/// writes one JSON object per line (`application/x-ndjson`) for every event
/// published on the board after the subscription was established. There is
/// no replay: a client that reconnects sees only what happens next.
///
/// The subscription guard is owned by the response body stream, so a client
/// disconnect drops it and unsubscribes the channel.

use crate::{
    app::{AppState, CurrentUser},
    error::{ApiError, ApiResult},
};
use axum::{
    body::Body,
    extract::{Path, State},
    http::header,
    response::Response,
    Extension,
};
use bytes::Bytes;
use futures::StreamExt;

/// `GET /v1/boards/:board_id/events/stream`
pub async fn stream_board_events(
    State(state): State<AppState>,
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
    Path(board_id): Path<i64>,
) -> ApiResult<Response> {
    let subscription = state.ops.subscribe_board_events(user_id, board_id).await?;
    tracing::debug!(board_id, %user_id, "Event stream opened");

    // One serialized event per line. The subscription moves into the stream
    // and is dropped (unsubscribing) when the client goes away.
    let body = Body::from_stream(subscription.map(|event| {
        serde_json::to_string(&event).map(|mut line| {
            line.push('\n');
            Bytes::from(line)
        })
    }));

    Response::builder()
        .header(header::CONTENT_TYPE, "application/x-ndjson")
        .header(header::CACHE_CONTROL, "no-cache")
        .body(body)
        .map_err(|e| ApiError::InternalError(format!("Failed to build stream response: {}", e)))
}
