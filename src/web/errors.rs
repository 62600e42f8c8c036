use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

use crate::web::handlers::json_response;

/// Every failure path of the query API. Each variant carries the request
/// path so the payload can echo a `_links.self` entry.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Message {id:?} not found")]
    MessageNotFound { path: String, id: String },
    #[error("Nothing is here")]
    NothingHere { path: String },
    #[error("Method not allowed")]
    MethodNotAllowed { path: String },
    #[error("{detail}")]
    Internal { path: String, detail: String },
}

impl ApiError {
    pub fn internal(path: &str, err: impl std::fmt::Display) -> Self {
        ApiError::Internal {
            path: path.to_owned(),
            detail: err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self {
            ApiError::MessageNotFound { .. } | ApiError::NothingHere { .. } => {
                StatusCode::NOT_FOUND
            }
            ApiError::MethodNotAllowed { .. } => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let path = match &self {
            ApiError::MessageNotFound { path, .. }
            | ApiError::NothingHere { path }
            | ApiError::MethodNotAllowed { path }
            | ApiError::Internal { path, .. } => path.clone(),
        };

        json_response(
            status,
            &json!({
                "_links": { "self": { "href": path } },
                "error": self.to_string(),
            }),
        )
    }
}
