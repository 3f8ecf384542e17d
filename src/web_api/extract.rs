use axum::{
    extract::{rejection::JsonRejection, FromRequest},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::message_response::MessageResponse;

/// `Json` whose rejections answer 400 with a `{message}` body instead of
/// axum's plain-text 415/422.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(BadJson))]
pub struct JsonBody<T>(pub T);

#[derive(Debug)]
pub struct BadJson(pub String);

impl From<JsonRejection> for BadJson {
    fn from(rejection: JsonRejection) -> Self {
        BadJson(rejection.body_text())
    }
}

impl IntoResponse for BadJson {
    fn into_response(self) -> Response {
        tracing::debug!(reason = %self.0, "malformed request body");
        (StatusCode::BAD_REQUEST, Json(MessageResponse::new(self.0))).into_response()
    }
}
