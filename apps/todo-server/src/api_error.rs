//! Conversion of library errors into HTTP responses

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use todo_core::TodoError;
use tracing::{debug, error};

pub const NOT_FOUND_MESSAGE: &str = "Todo not found";
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal Server Error";

/// A `TodoError` on its way out of a handler
#[derive(Debug)]
pub struct ApiError(pub TodoError);

impl From<TodoError> for ApiError {
    fn from(error: TodoError) -> Self {
        Self(error)
    }
}

impl ApiError {
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            TodoError::NotFound { .. } => StatusCode::NOT_FOUND,
            e if e.is_client_error() => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self.0 {
            TodoError::Validation { message } => {
                debug!(%message, "Rejected request");
                message
            }
            TodoError::NotFound { id } => {
                debug!(%id, "Todo not found");
                NOT_FOUND_MESSAGE.to_string()
            }
            other => {
                error!(error = %other, "Request failed");
                INTERNAL_ERROR_MESSAGE.to_string()
            }
        };
        (status, body).into_response()
    }
}
