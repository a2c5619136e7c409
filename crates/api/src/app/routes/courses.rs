use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, patch, post},
    Json, Router,
};

use cursos_courses::{Course, CourseSnapshot};

use crate::app::{dto, errors};
use crate::app::services::AppServices;
use crate::config::EmptyListPolicy;

/// Course routes, mounted under both `/cursos` and `/api/v1/cursos`.
///
/// The Portuguese paths are aliases of the English ones.
pub fn router() -> Router {
    Router::new()
        .route("/", post(create_course).get(list_courses))
        .route("/:id", get(get_course).patch(change_professor))
        .route("/disable/:id", patch(disable_course))
        .route("/desabilitar-curso/:id", patch(disable_course))
        .route("/count/:id", get(enrolled_count))
        .route("/total-alunos/:id", get(enrolled_count))
        .route("/enroll/:id", post(enroll))
        .route("/matricular/:id", post(enroll))
        .route("/withdraw/:id", post(withdraw))
        .route("/desmatricular/:id", post(withdraw))
}

fn course_json(course: &Course) -> Json<CourseSnapshot> {
    Json(course.snapshot())
}

fn body_error(rejection: JsonRejection) -> axum::response::Response {
    errors::json_error(StatusCode::BAD_REQUEST, "invalid_input", rejection.body_text())
}

pub async fn create_course(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<dto::CreateCourseRequest>, JsonRejection>,
) -> axum::response::Response {
    let Json(body) = match body {
        Ok(b) => b,
        Err(e) => return body_error(e),
    };
    let name = match dto::required("name", &body.name) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let professor = match dto::required("professor", &body.professor) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.catalog.lifecycle.create_course(name, professor).await {
        Ok(course) => (StatusCode::CREATED, course_json(&course)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn list_courses(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    let courses = match services.catalog.lifecycle.get_all().await {
        Ok(c) => c,
        Err(e) => return errors::service_error_to_response(e),
    };

    if courses.is_empty() && services.empty_list == EmptyListPolicy::NotFound {
        return errors::json_error(StatusCode::NOT_FOUND, "not_found", "no courses registered");
    }

    let out: Vec<CourseSnapshot> = courses.iter().map(Course::snapshot).collect();
    (StatusCode::OK, Json(out)).into_response()
}

pub async fn get_course(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match dto::parse_course_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.catalog.lifecycle.get_by_id(id).await {
        Ok(course) => (StatusCode::OK, course_json(&course)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn change_professor(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    body: Result<Json<dto::ChangeProfessorRequest>, JsonRejection>,
) -> axum::response::Response {
    let id = match dto::parse_course_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let Json(body) = match body {
        Ok(b) => b,
        Err(e) => return body_error(e),
    };
    let professor = match dto::required("professor", &body.professor) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.catalog.lifecycle.change_professor(id, professor).await {
        Ok(course) => (StatusCode::OK, course_json(&course)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn disable_course(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match dto::parse_course_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.catalog.lifecycle.disable_course(id).await {
        Ok(course) => (StatusCode::OK, course_json(&course)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn enrolled_count(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match dto::parse_course_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.catalog.enrollment.get_enrolled_count(id).await {
        Ok(count) => (StatusCode::OK, Json(count)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn enroll(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match dto::parse_course_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.catalog.enrollment.enroll(id).await {
        Ok(()) => StatusCode::OK.into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn withdraw(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match dto::parse_course_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.catalog.enrollment.withdraw(id).await {
        Ok(()) => StatusCode::OK.into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}
