// Fuzzy name search endpoints.
//
// GET /api/search/teacher/{name} — teachers whose name matches the query
// GET /api/search/course/{name}  — courses whose name matches, with teachers
//
// Results are in storage order; an all-whitespace query returns everything.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::search::{search_courses, search_teachers};
use crate::web::{api_error, feedback_error, AppState};

/// GET /api/search/teacher/{name}
pub async fn search_teacher(State(state): State<AppState>, Path(name): Path<String>) -> Response {
    match search_teachers(state.db.as_ref(), &name).await {
        Ok(teachers) => Json(teachers).into_response(),
        Err(e) => {
            tracing::warn!(error = %e, "Teacher search failed");
            feedback_error(&e)
        }
    }
}

/// GET /api/search/course/{name}
pub async fn search_course(State(state): State<AppState>, Path(name): Path<String>) -> Response {
    let courses = match search_courses(state.db.as_ref(), &name).await {
        Ok(courses) => courses,
        Err(e) => {
            tracing::warn!(error = %e, "Course search failed");
            return feedback_error(&e);
        }
    };

    let mut out = Vec::with_capacity(courses.len());
    for course in courses {
        let teachers = match state.db.get_course_teachers(course.id).await {
            Ok(teachers) => teachers,
            Err(e) => {
                tracing::error!(error = %e, course_id = course.id, "Failed to load course teachers");
                return api_error(StatusCode::INTERNAL_SERVER_ERROR, "Database error");
            }
        };
        out.push(serde_json::json!({
            "id": course.id,
            "name": course.name,
            "label": course.label(),
            "semester": course.semester,
            "year": course.year,
            "course_num": course.course_num,
            "subject": course.subject,
            "teachers": teachers,
        }));
    }

    Json(out).into_response()
}
