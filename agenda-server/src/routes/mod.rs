pub mod calendar;
pub mod health;

use axum::{
    Router,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use agenda_core::AgendaError;
use tracing::error;

use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .merge(calendar::router())
        .merge(health::router())
        .with_state(state)
}

/// Convert errors to plain-text HTTP responses.
///
/// Calendar clients consume these endpoints, so bodies are text rather than JSON.
pub struct AppError(anyhow::Error);

impl AppError {
    fn status(&self) -> StatusCode {
        match self.0.downcast_ref::<AgendaError>() {
            Some(AgendaError::EventNotFound(_)) => StatusCode::NOT_FOUND,
            Some(AgendaError::InvalidTimestamp { .. }) => StatusCode::UNPROCESSABLE_ENTITY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self.0, "Request failed");
        }
        let body = match status {
            StatusCode::NOT_FOUND => "Event not found".to_string(),
            _ => self.0.to_string(),
        };
        (status, body).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}
