use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use cursos_infra::ServiceError;

pub fn service_error_to_response(err: ServiceError) -> axum::response::Response {
    match &err {
        ServiceError::NotFound(_) => json_error(StatusCode::NOT_FOUND, "not_found", err.to_string()),
        ServiceError::DuplicateCourse(_) => {
            json_error(StatusCode::CONFLICT, "duplicate_course", err.to_string())
        }
        ServiceError::AlreadyDisabled(_) => {
            json_error(StatusCode::CONFLICT, "already_disabled", err.to_string())
        }
        ServiceError::InvalidInput(_) => {
            json_error(StatusCode::BAD_REQUEST, "invalid_input", err.to_string())
        }
        ServiceError::InvalidOperation(_) => {
            json_error(StatusCode::CONFLICT, "invalid_operation", err.to_string())
        }
        ServiceError::StorageUnavailable(_) => {
            tracing::warn!(error = %err, "storage unavailable");
            json_error(StatusCode::SERVICE_UNAVAILABLE, "storage_unavailable", err.to_string())
        }
        ServiceError::Contention(_) => {
            tracing::warn!(error = %err, "write contention");
            json_error(StatusCode::CONFLICT, "conflict", err.to_string())
        }
    }
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use cursos_courses::CourseId;

    use super::*;

    #[test]
    fn statuses_follow_error_kind() {
        let id = CourseId::try_from(1).unwrap();
        let cases = [
            (ServiceError::NotFound(id), StatusCode::NOT_FOUND),
            (ServiceError::DuplicateCourse("x".into()), StatusCode::CONFLICT),
            (ServiceError::AlreadyDisabled(id), StatusCode::CONFLICT),
            (ServiceError::InvalidInput("x".into()), StatusCode::BAD_REQUEST),
            (ServiceError::InvalidOperation("x".into()), StatusCode::CONFLICT),
            (ServiceError::StorageUnavailable("x".into()), StatusCode::SERVICE_UNAVAILABLE),
            (ServiceError::Contention("x".into()), StatusCode::CONFLICT),
        ];
        for (err, status) in cases {
            assert_eq!(service_error_to_response(err).status(), status);
        }
    }
}
