use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

use crate::upstream::UpstreamError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    NotFound(String),
    /// Upstream call failed; `error` is the operation-level summary.
    #[error("{error}")]
    Upstream {
        error: &'static str,
        #[source]
        source: UpstreamError,
    },
    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
}

impl AppError {
    pub fn bad_request<T: Into<String>>(message: T) -> Self {
        Self::BadRequest(message.into())
    }

    /// Wrap an upstream failure. Not-found failures become a plain 404.
    pub fn upstream(error: &'static str, source: UpstreamError) -> Self {
        match source {
            UpstreamError::NotFound { resource } => Self::NotFound(format!("{resource} not found")),
            source => Self::Upstream { error, source },
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Upstream { .. } | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        let message = match &self {
            AppError::Upstream { source, .. } => Some(source.to_string()),
            _ => None,
        };

        let body = ErrorBody {
            error: self.to_string(),
            message,
        };

        (status, Json(body)).into_response()
    }
}
