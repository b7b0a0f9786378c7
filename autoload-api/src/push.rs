use std::sync::Arc;

use autoload_core::{PushEnvelope, Runtime, TriggerOutcome};
use axum::{body::Bytes, extract::State, http::StatusCode};

/// Receives and processes one push notification.
///
/// Only the bare status code crosses the wire; error detail goes to the log.
#[tracing::instrument(level = "info", skip(state, body))]
#[utoipa::path(
    tag = "push",
    post,
    path = "/",
    responses(
        (status = 200, description = "Notification handled, or skipped as a non-finalize event"),
        (status = 400, description = "Body not decodable as a push envelope"),
        (status = 500, description = "Load submission, wait, or job execution failed")
    )
)]
pub(crate) async fn push(State(state): State<Arc<Runtime>>, body: Bytes) -> StatusCode {
    let envelope: PushEnvelope = match serde_json::from_slice(&body) {
        Ok(envelope) => envelope,
        Err(err) => {
            tracing::error!(error = %err, "failed to decode push envelope");
            return StatusCode::BAD_REQUEST;
        }
    };

    match state.handle_notification(&envelope).await {
        Ok(TriggerOutcome::Loaded | TriggerOutcome::Skipped { .. }) => StatusCode::OK,
        Err(err) => {
            tracing::error!(error = %err, message_id = %envelope.message.id, "push handling failed");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}
