use std::sync::Arc;

use axum::body::Body;
use axum::extract::{Extension, Path};
use axum::http::{header, StatusCode, Uri};
use axum::response::Response;
use serde_json::{json, Value};
use tracing::debug;

use crate::store::MessageStore;
use crate::web::errors::ApiError;

const CONTENT_TYPE_JSON: &str = "application/json;charset=utf-8";

/// Pretty-printed JSON response with the content type every endpoint uses.
pub(crate) fn json_response(status: StatusCode, payload: &Value) -> Response {
    let body = serde_json::to_string_pretty(payload)
        .unwrap_or_else(|_| payload.to_string());
    Response::builder()
        .status(status)
        .header(header::CONTENT_TYPE, CONTENT_TYPE_JSON)
        .body(Body::from(body))
        .unwrap()
}

pub async fn get_root(uri: Uri) -> Response {
    json_response(
        StatusCode::OK,
        &json!({
            "_links": {
                "self": { "href": uri.path() },
                "messages": { "href": "/messages" },
            }
        }),
    )
}

pub async fn get_messages(
    uri: Uri,
    Extension(store): Extension<Arc<MessageStore>>,
) -> Result<Response, ApiError> {
    let listed = store
        .list()
        .map_err(|e| ApiError::internal(uri.path(), e))?;
    debug!(count = listed.len(), "listing messages");

    let summaries: Vec<Value> = listed
        .iter()
        .map(|(id, location)| {
            json!({
                "_links": { "self": { "href": format!("/messages/{id}") } },
                "message_id": id,
                "filename": location.display().to_string(),
            })
        })
        .collect();

    Ok(json_response(
        StatusCode::OK,
        &json!({
            "_links": { "self": { "href": uri.path() } },
            "_embedded": { "messages": summaries },
        }),
    ))
}

pub async fn get_message(
    uri: Uri,
    Path(id): Path<String>,
    Extension(store): Extension<Arc<MessageStore>>,
) -> Result<Response, ApiError> {
    let message = store
        .get(&id)
        .map_err(|e| ApiError::internal(uri.path(), e))?
        .ok_or_else(|| ApiError::MessageNotFound {
            path: uri.path().to_owned(),
            id: id.clone(),
        })?;

    let mut payload = serde_json::to_value(&message)
        .map_err(|e| ApiError::internal(uri.path(), e))?;
    if let Value::Object(fields) = &mut payload {
        fields.insert(
            "_links".to_owned(),
            json!({ "self": { "href": uri.path() } }),
        );
        fields.insert(
            "filename".to_owned(),
            json!(store.message_path(&id).display().to_string()),
        );
    }

    Ok(json_response(StatusCode::OK, &payload))
}

pub async fn clear_messages(
    uri: Uri,
    Extension(store): Extension<Arc<MessageStore>>,
) -> Result<StatusCode, ApiError> {
    store
        .clear()
        .map_err(|e| ApiError::internal(uri.path(), e))?;
    Ok(StatusCode::NO_CONTENT)
}

/// Fallback for verbs we don't serve on known routes.
pub async fn method_not_allowed(uri: Uri) -> ApiError {
    ApiError::MethodNotAllowed {
        path: uri.path().to_owned(),
    }
}

/// Router-wide fallback for paths we don't know at all.
pub async fn not_found(uri: Uri) -> ApiError {
    ApiError::NothingHere {
        path: uri.path().to_owned(),
    }
}
