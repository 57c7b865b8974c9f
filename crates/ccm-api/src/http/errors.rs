//! Structured API error wrapper.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::http::constants::{CODE_INTERNAL, CODE_NOT_FOUND, CODE_UPGRADE_PERMISSIONS};
use crate::models::ProblemDetails;

/// Structured API error carrying a machine-readable code.
#[derive(Debug)]
pub struct ApiError {
    pub(crate) status: StatusCode,
    pub(crate) code: &'static str,
    title: &'static str,
    detail: Option<String>,
}

impl ApiError {
    const fn new(status: StatusCode, code: &'static str, title: &'static str) -> Self {
        Self {
            status,
            code,
            title,
            detail: None,
        }
    }

    pub(crate) fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    /// Internal server failure.
    pub(crate) fn internal(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            CODE_INTERNAL,
            "internal server error",
        )
        .with_detail(message)
    }

    /// Missing resource.
    pub(crate) fn not_found(detail: impl Into<String>) -> Self {
        Self::new(
            StatusCode::NOT_FOUND,
            CODE_NOT_FOUND,
            "resource not found",
        )
        .with_detail(detail)
    }

    /// Upgrade permission denial, carrying its dedicated error code.
    pub(crate) fn upgrade_permissions(detail: impl Into<String>) -> Self {
        Self::new(
            StatusCode::FORBIDDEN,
            CODE_UPGRADE_PERMISSIONS,
            "permission denied",
        )
        .with_detail(detail)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ProblemDetails {
            code: self.code.to_string(),
            title: self.title.to_string(),
            status: self.status.as_u16(),
            detail: self.detail,
        };
        (self.status, Json(body)).into_response()
    }
}
