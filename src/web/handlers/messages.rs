// POST /api/messages — submit an anonymous message.
//
// Body: { "student_id": 1, "teacher_id": 2, "body": "..." }
//
// 200 { "status": "delivered", "message_id": .. }
// 200 { "status": "rejected", "message_id": .., "new_infraction_count": .. }
// 503 when the classifier is unavailable (the message is held, not sent)
// 502 when the mail transport fails

use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::db::models::NewMessage;
use crate::web::{feedback_error, AppState};

pub async fn send_message(
    State(state): State<AppState>,
    Json(message): Json<NewMessage>,
) -> Response {
    match state.pipeline.submit(message).await {
        Ok(result) => Json(result).into_response(),
        Err(e) => feedback_error(&e),
    }
}
