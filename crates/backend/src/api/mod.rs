pub mod handlers;

use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

use crate::domain::a003_projection::error::ProjectionError;

/// Тело ошибки API
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    pub kind: &'static str,
    pub retryable: bool,
}

pub type ApiError = (StatusCode, Json<ErrorBody>);

/// Перевод ошибок движка проекций в HTTP-ответы
pub fn error_response(err: ProjectionError) -> ApiError {
    let (status, kind) = match &err {
        ProjectionError::Validation { .. } => (StatusCode::BAD_REQUEST, "validation"),
        ProjectionError::NotFound { .. } => (StatusCode::NOT_FOUND, "not_found"),
        ProjectionError::Conflict { .. } => (StatusCode::CONFLICT, "conflict"),
        ProjectionError::Dependency { .. } => (StatusCode::BAD_GATEWAY, "dependency"),
        ProjectionError::Storage(_) => (StatusCode::INTERNAL_SERVER_ERROR, "storage"),
    };
    if status == StatusCode::INTERNAL_SERVER_ERROR {
        tracing::error!("projection storage failure: {}", err);
    }
    let body = ErrorBody {
        error: err.to_string(),
        kind,
        retryable: err.is_retryable(),
    };
    (status, Json(body))
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::enums::ProjectionType;
    use uuid::Uuid;

    #[test]
    fn test_error_status_mapping() {
        let cases = [
            (
                ProjectionError::validation("velocity", "must be positive"),
                StatusCode::BAD_REQUEST,
            ),
            (
                ProjectionError::not_found("projection", Uuid::new_v4()),
                StatusCode::NOT_FOUND,
            ),
            (
                ProjectionError::Conflict {
                    association_ref: Uuid::new_v4(),
                    projection_type: ProjectionType::Real,
                },
                StatusCode::CONFLICT,
            ),
            (
                ProjectionError::Dependency {
                    service: "product_service",
                    message: "timeout".into(),
                },
                StatusCode::BAD_GATEWAY,
            ),
        ];
        for (err, expected) in cases {
            let (status, _) = error_response(err);
            assert_eq!(status, expected);
        }
    }

    #[test]
    fn test_only_dependency_errors_are_retryable() {
        let (_, body) = error_response(ProjectionError::Dependency {
            service: "product_service",
            message: "timeout".into(),
        });
        assert!(body.retryable);

        let (_, body) = error_response(ProjectionError::validation("floors", "negative"));
        assert!(!body.retryable);
    }
}
