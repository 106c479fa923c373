use axum::{
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use tokio::io;

use crate::response::ErrorEnvelope;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Unable to parse form")]
    MalformedForm,
    #[error("No file was sent")]
    EmptyUpload,
    #[error("File extension only accept png, jpg, jpeg, and gif at row number {row}")]
    DisallowedExtension { row: u64 },
    #[error("Missing title at row number {row}")]
    MissingTitle { row: u64 },
    #[error("Invalid title at row number {row}")]
    InvalidTitle { row: u64 },
    #[error("Unable to read upload directory")]
    UnreadableDirectory(#[source] io::Error),

    #[error("Error opening file")]
    Spool(#[source] io::Error),
    #[error("Error saving file")]
    Save(#[source] io::Error),
    #[error("Error copying file")]
    Copy(#[source] io::Error),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Spool(_) | Self::Save(_) | Self::Copy(_) => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let code = self.status();

        match code {
            StatusCode::INTERNAL_SERVER_ERROR => tracing::error!("{self:?}"),
            _ => tracing::debug!("rejected request: {self}"),
        }

        (code, Json(ErrorEnvelope::new(&self))).into_response()
    }
}

impl From<MultipartError> for AppError {
    fn from(value: MultipartError) -> Self {
        tracing::debug!("multipart error: {value}");
        Self::MalformedForm
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_numbers_show_up_in_messages() {
        let err = AppError::DisallowedExtension { row: 1 };
        assert_eq!(
            err.to_string(),
            "File extension only accept png, jpg, jpeg, and gif at row number 1"
        );
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn filesystem_failures_are_internal() {
        let err = AppError::Save(io::Error::new(io::ErrorKind::PermissionDenied, "nope"));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.to_string(), "Error saving file");

        let err = AppError::UnreadableDirectory(io::ErrorKind::NotFound.into());
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }
}
