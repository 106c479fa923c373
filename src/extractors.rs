use axum::async_trait;
use axum::extract::{FromRequest, Request};

use crate::errors::AppError;

/// `axum::extract::Multipart` whose rejection renders as our error envelope.
pub struct Multipart(pub axum::extract::Multipart);

#[async_trait]
impl<S> FromRequest<S> for Multipart
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match axum::extract::Multipart::from_request(req, state).await {
            Ok(value) => Ok(Self(value)),
            Err(rejection) => {
                tracing::debug!("multipart rejection: {rejection}");
                Err(AppError::MalformedForm)
            }
        }
    }
}
