//! Response rendering for webhook results.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use kapost_receiver_core::ActionResult;

/// Wire form of an [`ActionResult`].
///
/// The status code comes from the result; the body is the success object or
/// `{"error": <message>}`.
#[derive(Debug)]
pub struct WebhookReply(pub ActionResult);

impl IntoResponse for WebhookReply {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self.0.body())).into_response()
    }
}

impl From<ActionResult> for WebhookReply {
    fn from(result: ActionResult) -> Self {
        Self(result)
    }
}
