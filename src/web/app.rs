//! Router assembly for the query API.

use std::sync::Arc;

use axum::body::Body;
use axum::extract::Extension;
use axum::http::Request;
use axum::routing::get;
use axum::Router;
use tower_http::trace::{
    DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer,
};
use tower_http::LatencyUnit;
use tracing::Level;

use crate::store::MessageStore;
use crate::web::handlers;

pub fn build_app(store: Arc<MessageStore>) -> Router {
    Router::new()
        .route("/", get(handlers::get_root))
        .route(
            "/messages",
            get(handlers::get_messages)
                .delete(handlers::clear_messages)
                .fallback(handlers::method_not_allowed),
        )
        .route("/messages/:id", get(handlers::get_message))
        .fallback(handlers::not_found)
        .layer(Extension(store))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<Body>| {
                    tracing::info_span!(
                        "http-request",
                        method = request.method().as_str(),
                        uri = request
                            .uri()
                            .path_and_query()
                            .map_or("", |pq| pq.as_str()),
                    )
                })
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(
                    DefaultOnResponse::new()
                        .level(Level::INFO)
                        .latency_unit(LatencyUnit::Micros),
                )
                .on_failure(
                    DefaultOnFailure::new()
                        .level(Level::ERROR)
                        .latency_unit(LatencyUnit::Micros),
                ),
        )
}
