use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::{json, Value};

/// A status code with the JSON body the client sees
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    body: Value,
}

impl ApiError {
    pub fn new(status: StatusCode, body: Value) -> Self {
        Self { status, body }
    }

    /// `{ "error": message }`
    pub fn error(status: StatusCode, message: &str) -> Self {
        Self::new(status, json!({ "error": message }))
    }

    /// `{ "message": message }`
    pub fn message(status: StatusCode, message: &str) -> Self {
        Self::new(status, json!({ "message": message }))
    }

    pub fn bad_request(message: &str) -> Self {
        Self::error(StatusCode::BAD_REQUEST, message)
    }

    pub fn not_found(message: &str) -> Self {
        Self::error(StatusCode::NOT_FOUND, message)
    }

    /// Logs `cause` and answers 500 with `message` and the cause as `details`
    pub fn internal_with_details(key: &str, message: &str, cause: impl std::fmt::Display) -> Self {
        tracing::error!("❌ {}: {}", message, cause);
        let mut body = serde_json::Map::new();
        body.insert(key.to_string(), Value::from(message));
        body.insert("details".to_string(), Value::from(cause.to_string()));
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, Value::Object(body))
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}
