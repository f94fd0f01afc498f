use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use crates::domain::value_objects::usage_limits::UsageLimitError;
use serde::Serialize;
use thiserror::Error;
use tracing::error;

use crate::usecases::permissions::PermissionError;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub code: u16,
    pub message: String,
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Unauthorized")]
    Unauthorized,

    #[error("Forbidden")]
    Forbidden,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Not implemented: {0}")]
    NotImplemented(String),

    #[error("Internal server error")]
    Internal(anyhow::Error),
}

impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        if let Some(usage_error) = error.downcast_ref::<UsageLimitError>() {
            return match usage_error {
                UsageLimitError::UnknownLimit(_) => AppError::NotFound(usage_error.to_string()),
                UsageLimitError::NotImplemented(_) => {
                    AppError::NotImplemented(usage_error.to_string())
                }
                UsageLimitError::LimitReached { .. } => AppError::Forbidden,
            };
        }

        if error.downcast_ref::<PermissionError>().is_some() {
            return AppError::Forbidden;
        }

        AppError::Internal(error)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, self.to_string()),
            AppError::Forbidden => (StatusCode::FORBIDDEN, self.to_string()),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotImplemented(msg) => (StatusCode::NOT_IMPLEMENTED, msg),
            AppError::Internal(error) => {
                error!("backend: internal error: {:#}", error);
                // Don't leak internal error detail to client
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = Json(ErrorResponse {
            code: status.as_u16(),
            message,
        });

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crates::domain::value_objects::{permissions::Permission, usage_limits::LimitName};

    fn status_of(error: anyhow::Error) -> StatusCode {
        AppError::from(error).into_response().status()
    }

    #[test]
    fn usage_errors_map_to_distinct_statuses() {
        assert_eq!(
            status_of(UsageLimitError::UnknownLimit("storage".into()).into()),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(UsageLimitError::NotImplemented(LimitName::Tasks).into()),
            StatusCode::NOT_IMPLEMENTED
        );
    }

    #[test]
    fn permission_denial_is_forbidden() {
        let error = PermissionError::Denied {
            permission: Permission::ManageBilling,
        };
        assert_eq!(status_of(error.into()), StatusCode::FORBIDDEN);
    }

    #[test]
    fn other_errors_are_opaque() {
        let response = AppError::from(anyhow::anyhow!("db password=hunter2")).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
