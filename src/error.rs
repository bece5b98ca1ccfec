/*
 * Responsibility
 * - アプリ共通の AppError 定義
 * - IntoResponse 実装 (HTTP status / JSON error body)
 * - RepoError / auth error / extractor rejection を統一的に変換
 */
use std::any::Any;

use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::repos::RepoError;
use crate::services::auth::AuthError;

/// Every failure leaves the service in this shape.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: u16,
    pub message: String,
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(&'static str),
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error("{resource} not found")]
    NotFound { resource: &'static str },
    #[error("method not allowed")]
    MethodNotAllowed,
    #[error("request body too large")]
    PayloadTooLarge,
    #[error("unprocessable")]
    Unprocessable,
}

impl AppError {
    pub fn not_found(resource: &'static str) -> Self {
        Self::NotFound { resource }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Auth(err) if err.is_forbidden() => StatusCode::FORBIDDEN,
            AppError::Auth(_) => StatusCode::UNAUTHORIZED,
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            AppError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::Unprocessable => StatusCode::UNPROCESSABLE_ENTITY,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = ErrorResponse {
            success: false,
            error: status.as_u16(),
            message: self.to_string(),
        };

        (status, Json(body)).into_response()
    }
}

impl From<RepoError> for AppError {
    fn from(e: RepoError) -> Self {
        match e {
            RepoError::NotFound => AppError::not_found("drink"),
            RepoError::Conflict => {
                tracing::info!("drink title already exists");
                AppError::Unprocessable
            }
            other => {
                tracing::error!(error = ?other, "drink storage failure");
                AppError::Unprocessable
            }
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(e: JsonRejection) -> Self {
        tracing::debug!(error = %e, "rejected request body");
        // DefaultBodyLimit overflow surfaces as a buffering rejection with this status.
        if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
            return AppError::PayloadTooLarge;
        }
        AppError::Validation("request body must be a JSON drink")
    }
}

impl From<PathRejection> for AppError {
    // Non-numeric ids can never match a drink.
    fn from(_: PathRejection) -> Self {
        AppError::not_found("drink")
    }
}

pub async fn not_found_fallback() -> AppError {
    AppError::not_found("resource")
}

pub async fn method_not_allowed_fallback() -> AppError {
    AppError::MethodNotAllowed
}

/// Last line of defence for panics inside handlers (`CatchPanicLayer`).
pub fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = panic
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| panic.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic payload");
    tracing::error!(panic = detail, "handler panicked");

    AppError::Unprocessable.into_response()
}
