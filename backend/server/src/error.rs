use axum::{
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use spots::{models::ParseEnumError, submission::DraftError, SubmitError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    #[error("Not found")]
    NotFound,

    #[error("{0}")]
    Submit(#[from] SubmitError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match self {
            AppError::MalformedPayload { .. } => StatusCode::BAD_REQUEST,
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::Submit { .. } => StatusCode::BAD_GATEWAY,
        };

        (status, self.to_string()).into_response()
    }
}

impl From<MultipartError> for AppError {
    fn from(e: MultipartError) -> Self {
        AppError::MalformedPayload(e.body_text())
    }
}

impl From<DraftError> for AppError {
    fn from(e: DraftError) -> Self {
        AppError::MalformedPayload(e.to_string())
    }
}

impl From<ParseEnumError> for AppError {
    fn from(e: ParseEnumError) -> Self {
        AppError::MalformedPayload(e.to_string())
    }
}
