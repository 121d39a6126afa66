//! HTTP error responses for web adapter.
//!
//! Every error body is `{"detail": "<message>"}`.

use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use tracing::{debug, error};

use crate::domain::error::StockfolioError;

#[derive(Debug)]
pub struct WebError {
    pub status: StatusCode,
    pub message: String,
}

impl WebError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }
}

pub fn status_from_error(err: &StockfolioError) -> StatusCode {
    match err {
        StockfolioError::NotFound { .. } => StatusCode::NOT_FOUND,
        StockfolioError::InvalidInput { .. } | StockfolioError::Csv { .. } => {
            StatusCode::BAD_REQUEST
        }
        StockfolioError::Forbidden { .. } => StatusCode::FORBIDDEN,
        StockfolioError::PriceProvider { .. } => StatusCode::BAD_GATEWAY,
        StockfolioError::ConfigParse { .. }
        | StockfolioError::ConfigMissing { .. }
        | StockfolioError::ConfigInvalid { .. }
        | StockfolioError::Database { .. }
        | StockfolioError::DatabaseQuery { .. }
        | StockfolioError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl From<StockfolioError> for WebError {
    fn from(err: StockfolioError) -> Self {
        let status = status_from_error(&err);
        let message = match &err {
            StockfolioError::NotFound { entity, .. } => format!("{entity} not found"),
            StockfolioError::Forbidden { reason } => reason.clone(),
            StockfolioError::InvalidInput { reason } => reason.clone(),
            _ => err.to_string(),
        };
        Self::new(status, message)
    }
}

impl From<JsonRejection> for WebError {
    fn from(rejection: JsonRejection) -> Self {
        Self::new(rejection.status(), rejection.body_text())
    }
}

impl From<PathRejection> for WebError {
    fn from(rejection: PathRejection) -> Self {
        Self::new(rejection.status(), rejection.body_text())
    }
}

impl From<QueryRejection> for WebError {
    fn from(rejection: QueryRejection) -> Self {
        Self::new(rejection.status(), rejection.body_text())
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            error!(status = self.status.as_u16(), message = %self.message, "request failed");
        } else {
            debug!(status = self.status.as_u16(), message = %self.message, "request rejected");
        }
        (self.status, Json(json!({ "detail": self.message }))).into_response()
    }
}
