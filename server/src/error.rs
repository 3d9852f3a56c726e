use std::process::{ExitCode, Termination};

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use error_stack::Report;
use serde::Serialize;

use kernel::KernelError;

#[derive(Debug)]
pub struct StackTrace(Report<KernelError>);

impl From<Report<KernelError>> for StackTrace {
    fn from(e: Report<KernelError>) -> Self {
        StackTrace(e)
    }
}

impl Termination for StackTrace {
    fn report(self) -> ExitCode {
        self.0.report()
    }
}

#[derive(Debug, Serialize)]
pub struct Detail {
    detail: String,
}

impl Detail {
    pub fn new(detail: impl Into<String>) -> Self {
        Self {
            detail: detail.into(),
        }
    }
}

#[derive(Debug)]
pub struct ErrorStatus(Report<KernelError>);

impl ErrorStatus {
    pub fn context(&self) -> &KernelError {
        self.0.current_context()
    }
}

impl From<Report<KernelError>> for ErrorStatus {
    fn from(e: Report<KernelError>) -> Self {
        ErrorStatus(e)
    }
}

impl From<KernelError> for ErrorStatus {
    fn from(e: KernelError) -> Self {
        ErrorStatus(Report::new(e))
    }
}

fn status_of(error: &KernelError) -> StatusCode {
    match error {
        KernelError::Unauthenticated => StatusCode::UNAUTHORIZED,
        KernelError::Forbidden => StatusCode::FORBIDDEN,
        KernelError::NotFound => StatusCode::NOT_FOUND,
        KernelError::InventoryExhausted
        | KernelError::AlreadyReturned
        | KernelError::InvalidFilter
        | KernelError::InvalidArgument => StatusCode::BAD_REQUEST,
        KernelError::Concurrency => StatusCode::CONFLICT,
        KernelError::Timeout => StatusCode::REQUEST_TIMEOUT,
        KernelError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ErrorStatus {
    fn into_response(self) -> Response {
        let error = self.context();
        let status = status_of(error);
        if status.is_server_error() {
            tracing::error!("{:?}", self.0);
        } else {
            tracing::debug!("{:?}", self.0);
        }
        (status, Json(Detail::new(error.to_string()))).into_response()
    }
}
