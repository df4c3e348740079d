use crate::error::AppError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::{json, Value};

pub fn ok(result: impl Serialize) -> Json<Value> {
    Json(json!({
        "ok": true,
        "result": result
    }))
}

pub fn err(code: &str, message: impl Into<String>) -> Json<Value> {
    Json(json!({
        "ok": false,
        "error": {
            "code": code,
            "message": message.into(),
        }
    }))
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::DuplicateEmail(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) | AppError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Db(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = if self.is_internal() {
            tracing::error!(code = self.code(), error = ?self, "request failed");
            "internal error; see server log".to_string()
        } else {
            tracing::debug!(code = self.code(), error = %self, "request rejected");
            self.to_string()
        };
        (status, err(self.code(), message)).into_response()
    }
}
