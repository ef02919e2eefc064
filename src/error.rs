use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Error taxonomy for every user-visible failure. Each variant maps to a
/// fixed HTTP status; internal failures are logged and reported generically.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Conflict(&'static str),
    #[error("{0}")]
    Unauthorized(&'static str),
    #[error("{0}")]
    Forbidden(&'static str),
    #[error("{0}")]
    NotFound(&'static str),
    #[error("{0}")]
    Validation(String),
    #[error("internal error")]
    Internal(anyhow::Error),
}

impl From<anyhow::Error> for ApiError {
    fn from(e: anyhow::Error) -> Self {
        Self::Internal(e)
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(e: sqlx::Error) -> Self {
        Self::Internal(e.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, detail) = match &self {
            Self::Conflict(msg) => (StatusCode::CONFLICT, (*msg).to_string()),
            Self::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, (*msg).to_string()),
            Self::Forbidden(msg) => (StatusCode::FORBIDDEN, (*msg).to_string()),
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, (*msg).to_string()),
            Self::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            Self::Internal(e) => {
                error!(error = %e, "internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };
        (status, Json(json!({ "detail": detail }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_match_taxonomy() {
        let cases = [
            (ApiError::Conflict("taken"), StatusCode::CONFLICT),
            (ApiError::Unauthorized("no"), StatusCode::UNAUTHORIZED),
            (ApiError::Forbidden("no"), StatusCode::FORBIDDEN),
            (ApiError::NotFound("gone"), StatusCode::NOT_FOUND),
            (
                ApiError::Validation("bad".into()),
                StatusCode::BAD_REQUEST,
            ),
            (
                ApiError::Internal(anyhow::anyhow!("boom")),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(err.into_response().status(), status);
        }
    }

    #[test]
    fn internal_hides_source_message() {
        let resp = ApiError::Internal(anyhow::anyhow!("secret db dsn")).into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
