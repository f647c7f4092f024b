use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use pollbot_core::errors::{ApplicationError, InterfaceError};
use uuid::Uuid;

/// Interface error rendered as a plain-text HTTP response.
#[derive(Debug)]
pub struct ApiError(pub InterfaceError);

impl ApiError {
    pub fn new(error: ApplicationError, correlation_id: &str) -> Self {
        Self(error.into_interface(correlation_id))
    }

    pub fn status(&self) -> StatusCode {
        match &self.0 {
            InterfaceError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            InterfaceError::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            InterfaceError::NotFound { .. } => StatusCode::NOT_FOUND,
            InterfaceError::ServiceUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), self.0.user_message()).into_response()
    }
}

pub fn new_correlation_id() -> String {
    Uuid::new_v4().simple().to_string()
}
