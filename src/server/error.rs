use axum::{
    http::StatusCode,
    response::{ IntoResponse, Response },
    Json,
};
use thiserror::Error;

use crate::models::api::ErrorResponse;

#[derive(Debug, Error)]
pub enum ProxyError {
    /// `messages` missing or not an array.
    #[error("Invalid request body")]
    InvalidBody,

    #[error("{0} method not allowed")]
    MethodNotAllowed(String),

    /// Remote failure or input that could not be interpreted.
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl ProxyError {
    pub fn status(&self) -> StatusCode {
        match self {
            ProxyError::InvalidBody => StatusCode::BAD_REQUEST,
            ProxyError::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            ProxyError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            ProxyError::Internal(details) => ErrorResponse {
                error: "Internal server error".into(),
                details: Some(details),
            },
            other => ErrorResponse {
                error: other.to_string(),
                details: None,
            },
        };
        (status, Json(body)).into_response()
    }
}
