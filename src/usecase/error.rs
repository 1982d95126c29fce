use axum::{http::StatusCode, response::IntoResponse};
use thiserror::Error;

use crate::repository::errors::RepositoryError;

#[derive(Debug, Error)]
pub enum UsecaseError {
    #[error("{0} not found")]
    NotFound(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Unavailable(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    InvalidState(String),

    #[error("{0}")]
    Internal(String),
}

impl From<RepositoryError> for UsecaseError {
    fn from(e: RepositoryError) -> Self {
        match e {
            RepositoryError::NotFound => UsecaseError::NotFound("Resource".to_string()),
            RepositoryError::Conflict => UsecaseError::Conflict(
                "This car is already booked in the selected period.".to_string(),
            ),
            RepositoryError::DatabaseError(msg) => UsecaseError::Internal(msg),
        }
    }
}

impl From<anyhow::Error> for UsecaseError {
    fn from(e: anyhow::Error) -> Self {
        UsecaseError::Internal(e.to_string())
    }
}

impl IntoResponse for UsecaseError {
    fn into_response(self) -> axum::response::Response {
        let status = match &self {
            UsecaseError::NotFound(_) => StatusCode::NOT_FOUND,
            UsecaseError::Forbidden(_) => StatusCode::FORBIDDEN,
            UsecaseError::Validation(_) => StatusCode::BAD_REQUEST,
            UsecaseError::Unavailable(_) => StatusCode::CONFLICT,
            UsecaseError::Conflict(_) => StatusCode::CONFLICT,
            UsecaseError::InvalidState(_) => StatusCode::CONFLICT,
            UsecaseError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        match &self {
            UsecaseError::Internal(_) => {
                tracing::error!(error = %self, "internal error");
            }
            UsecaseError::NotFound(_) => {
                tracing::warn!(error = %self, "resource not found");
            }
            UsecaseError::Forbidden(_) => {
                tracing::warn!(error = %self, "forbidden");
            }
            _ => {
                tracing::debug!(error = %self);
            }
        }

        // Internal details stay in the logs; the client gets a generic body.
        let body = match &self {
            UsecaseError::Internal(_) => "Internal server error".to_string(),
            _ => self.to_string(),
        };

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repository_conflict_maps_to_conflict() {
        let err: UsecaseError = RepositoryError::Conflict.into();
        assert!(matches!(err, UsecaseError::Conflict(_)));
    }

    #[test]
    fn test_repository_not_found_maps_to_not_found() {
        let err: UsecaseError = RepositoryError::NotFound.into();
        assert!(matches!(err, UsecaseError::NotFound(_)));
    }

    #[test]
    fn test_not_found_message() {
        let err = UsecaseError::NotFound("Booking".to_string());
        assert_eq!(err.to_string(), "Booking not found");
    }
}
