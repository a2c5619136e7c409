use axum::http::StatusCode;
use serde::Deserialize;

use cursos_courses::CourseId;

use crate::app::errors;

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct CreateCourseRequest {
    #[serde(default, alias = "nome")]
    pub name: Option<String>,
    #[serde(default)]
    pub professor: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ChangeProfessorRequest {
    #[serde(default)]
    pub professor: Option<String>,
}

// -------------------------
// Boundary validation
// -------------------------

/// A present, non-blank text field.
pub fn required<'a>(
    field: &'static str,
    value: &'a Option<String>,
) -> Result<&'a str, axum::response::Response> {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(errors::json_error(
            StatusCode::BAD_REQUEST,
            "invalid_input",
            format!("{field} is required and must not be blank"),
        )),
    }
}

pub fn parse_course_id(raw: &str) -> Result<CourseId, axum::response::Response> {
    raw.parse().map_err(|_| {
        errors::json_error(
            StatusCode::BAD_REQUEST,
            "invalid_input",
            format!("invalid course id '{raw}'"),
        )
    })
}
