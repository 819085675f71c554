// GET /api/teacher/{id} — single teacher by id.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::web::{api_error, AppState};

pub async fn get_teacher(State(state): State<AppState>, Path(id): Path<i64>) -> Response {
    match state.db.get_teacher(id).await {
        Ok(Some(teacher)) => Json(teacher).into_response(),
        Ok(None) => api_error(StatusCode::NOT_FOUND, "Teacher not found"),
        Err(e) => {
            tracing::error!(error = %e, teacher_id = id, "DB error fetching teacher");
            api_error(StatusCode::INTERNAL_SERVER_ERROR, "Database error")
        }
    }
}
