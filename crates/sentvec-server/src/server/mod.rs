pub mod data_models;
pub mod infer;
mod init;
pub mod routes;
mod state;
pub mod utils;

#[cfg(test)]
pub(crate) mod test_utils;

pub use init::{init_router, router_with_encoder, RouterArgs};

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Invalid input: {0}")]
    InvalidInput(#[from] JsonRejection),

    #[error("Inference error: {0:#}")]
    Inference(anyhow::Error),

    #[error("Encoder returned {actual} embeddings for {expected} sentences")]
    ShapeMismatch { expected: usize, actual: usize },

    #[error("Encoder is not available")]
    EncoderUnavailable,
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        tracing::warn!("{}", self);

        match self {
            ServerError::InvalidInput(rejection) => {
                (rejection.status(), rejection.body_text()).into_response()
            }
            ServerError::Inference(_) | ServerError::ShapeMismatch { .. } => {
                (StatusCode::INTERNAL_SERVER_ERROR, self.to_string()).into_response()
            }
            ServerError::EncoderUnavailable => {
                (StatusCode::SERVICE_UNAVAILABLE, self.to_string()).into_response()
            }
        }
    }
}
