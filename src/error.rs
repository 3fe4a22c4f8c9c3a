use axum::{
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use tracing::error;

/// Failures surfaced by the marketplace handlers.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("id is already registered")]
    DuplicateIdentity,
    #[error("no account with this id")]
    UnknownIdentity,
    #[error("password does not match")]
    BadCredential,
    #[error("only .png, .jpg and .jpeg images are accepted")]
    UnsupportedFileType,
    #[error("not found")]
    NotFound,
    #[error("{0}")]
    BadRequest(String),
    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::DuplicateIdentity => (
                StatusCode::CONFLICT,
                "That id is already taken. Please choose another one.",
            )
                .into_response(),
            AppError::UnknownIdentity | AppError::BadCredential => {
                Redirect::to("/fail").into_response()
            }
            AppError::UnsupportedFileType => (
                StatusCode::BAD_REQUEST,
                "Only PNG and JPG images can be uploaded.",
            )
                .into_response(),
            AppError::NotFound => (StatusCode::NOT_FOUND, "Not found").into_response(),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg).into_response(),
            AppError::Storage(e) => {
                error!(error = ?e, "storage failure");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Something went wrong. Please try again later.",
                )
                    .into_response()
            }
        }
    }
}
