use std::fmt::Display;

use axum::{
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

pub const SUCCESS_MESSAGE: &str = "success";
pub const ERROR_PREFIX: &str = "error : ";

/// Body of every 200 response: a fixed message plus the public paths involved.
#[derive(Debug, Serialize, Deserialize)]
pub struct SuccessEnvelope {
    pub message: String,
    pub data: Vec<String>,
}

impl SuccessEnvelope {
    pub fn new(data: Vec<String>) -> Self {
        Self {
            message: SUCCESS_MESSAGE.to_string(),
            data,
        }
    }
}

impl IntoResponse for SuccessEnvelope {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    pub message: String,
}

impl ErrorEnvelope {
    pub fn new(err: &impl Display) -> Self {
        Self {
            message: format!("{ERROR_PREFIX}{err}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::{
        body::to_bytes,
        http::{header::CONTENT_TYPE, StatusCode},
    };

    use super::*;
    use crate::errors::AppError;

    #[tokio::test]
    async fn success_envelope_shape() {
        let res = SuccessEnvelope::new(vec!["/uploads/a.png".into()]).into_response();
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(res.headers()[CONTENT_TYPE], "application/json");

        let body = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        assert_eq!(
            &body[..],
            br#"{"message":"success","data":["/uploads/a.png"]}"#
        );
    }

    #[tokio::test]
    async fn error_envelope_is_prefixed() {
        let res = AppError::EmptyUpload.into_response();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        assert_eq!(res.headers()[CONTENT_TYPE], "application/json");

        let body = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], br#"{"message":"error : No file was sent"}"#);
    }
}
