use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use giftdraw_core::{DrawError, DrawServiceError, ParticipantServiceError, RepoError};
use log::error;
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    InsufficientParticipants(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match self {
            AppError::Validation(_)
            | AppError::MalformedPayload(_)
            | AppError::InsufficientParticipants(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let message = match &self {
            AppError::InternalError(details) => {
                error!("event=request module=http status=error error={details}");
                "Internal error".to_string()
            }
            other => other.to_string(),
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

impl From<RepoError> for AppError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(_) => AppError::NotFound(value.to_string()),
            RepoError::Validation(_) => AppError::Validation(value.to_string()),
            other => AppError::InternalError(other.to_string()),
        }
    }
}

impl From<ParticipantServiceError> for AppError {
    fn from(value: ParticipantServiceError) -> Self {
        match value {
            ParticipantServiceError::Validation(_) => AppError::Validation(value.to_string()),
            ParticipantServiceError::ParticipantNotFound(_)
            | ParticipantServiceError::ItemNotFound { .. }
            | ParticipantServiceError::BuyerNotFound(_) => AppError::NotFound(value.to_string()),
            ParticipantServiceError::Repo(err) => err.into(),
        }
    }
}

impl From<DrawServiceError> for AppError {
    fn from(value: DrawServiceError) -> Self {
        match value {
            DrawServiceError::Draw(DrawError::InsufficientParticipants { .. }) => {
                AppError::InsufficientParticipants(value.to_string())
            }
            DrawServiceError::Draw(DrawError::DuplicateParticipant(_)) => {
                AppError::InternalError(value.to_string())
            }
            DrawServiceError::Repo(err) => err.into(),
        }
    }
}
