// Web server — Axum JSON API in front of the search and delivery pipeline.
//
// Authentication is handled upstream: the sending student's account id
// arrives in the request body from a trusted front end.

use std::sync::Arc;

use anyhow::Result;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::db::Database;
use crate::error::FeedbackError;
use crate::pipeline::DeliveryPipeline;

pub mod handlers;

/// Shared application state threaded through all Axum handlers.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<dyn Database>,
    pub pipeline: Arc<DeliveryPipeline>,
}

/// Start the Axum web server and block until it exits.
pub async fn run_server(
    db: Arc<dyn Database>,
    pipeline: DeliveryPipeline,
    port: u16,
    bind: &str,
) -> Result<()> {
    let state = AppState {
        db,
        pipeline: Arc::new(pipeline),
    };

    let app = build_router(state);

    let addr = format!("{bind}:{port}");
    info!("Nameless API listening on http://{addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route(
            "/api/search/teacher/{name}",
            get(handlers::search::search_teacher),
        )
        .route(
            "/api/search/course/{name}",
            get(handlers::search::search_course),
        )
        .route("/api/teacher/{id}", get(handlers::teachers::get_teacher))
        .route("/api/messages", post(handlers::messages::send_message))
        .layer(
            CorsLayer::new()
                .allow_origin(tower_http::cors::Any)
                .allow_methods([
                    axum::http::Method::GET,
                    axum::http::Method::POST,
                    axum::http::Method::OPTIONS,
                ])
                .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check — always returns 200 OK.
async fn health() -> impl IntoResponse {
    (
        StatusCode::OK,
        axum::Json(serde_json::json!({ "status": "ok" })),
    )
}

/// Typed JSON error response helper.
pub fn api_error(status: StatusCode, message: &str) -> Response {
    (status, axum::Json(serde_json::json!({ "error": message }))).into_response()
}

/// Map a domain error to an HTTP response.
pub fn feedback_error(e: &FeedbackError) -> Response {
    let status = match e {
        FeedbackError::InvalidAccountIdentity(_)
        | FeedbackError::MissingCredential(_)
        | FeedbackError::EmptyMessage
        | FeedbackError::InvalidQuery(_) => StatusCode::BAD_REQUEST,
        FeedbackError::UnknownAccount(_) | FeedbackError::UnknownTeacher(_) => {
            StatusCode::NOT_FOUND
        }
        FeedbackError::DuplicateAccount(_) => StatusCode::CONFLICT,
        FeedbackError::ClassificationUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        FeedbackError::DeliveryTransportFailure(_) => StatusCode::BAD_GATEWAY,
        FeedbackError::Storage(inner) => {
            error!(error = %inner, "Storage error");
            return api_error(StatusCode::INTERNAL_SERVER_ERROR, "Database error");
        }
    };
    api_error(status, &e.to_string())
}
